// ipsift - platform/fs.rs
//
// Filesystem helpers: lossy input reading, output path resolution and
// record writing.

use crate::util::constants;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Read the full content of a file as a string.
///
/// For files with invalid UTF-8, uses lossy conversion.
pub fn read_file_lossy(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Lower-cased extension of `path` including the dot (`".csv"`), or an
/// empty string when there is none.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

/// Append `.txt` unless `name` already ends with it (any case).
pub fn with_output_extension(name: &str) -> String {
    if name.to_lowercase().ends_with(constants::OUTPUT_EXTENSION) {
        name.to_string()
    } else {
        format!("{name}{}", constants::OUTPUT_EXTENSION)
    }
}

/// Resolve an output file name against the current working directory.
///
/// Absolute names are kept as given.
pub fn safe_output_path(name: &str) -> PathBuf {
    let name = with_output_extension(name);
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(name),
        Err(e) => {
            tracing::warn!(error = %e, "Could not read current directory; using relative path");
            PathBuf::from(name)
        }
    }
}

/// Write one record per line, each terminated by `\n`, UTF-8 encoded.
pub fn write_records(path: &Path, records: &[String]) -> io::Result<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    for record in records {
        writer.write_all(record.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    tracing::debug!(path = %path.display(), records = records.len(), "Records written");
    Ok(())
}
