// ipsift - app/pipeline.rs
//
// Run orchestration: read the input once, pick an extraction path, collect
// records into a per-run `RecordSet`, and write the sorted result.
//
// Path selection (first match wins):
//   1. Protocol link list (first lines mention a link scheme).
//   2. `.txt` file: mixed-content extraction line by line.
//   3. Anything else: tabular source (CSV, pipe table, or inferred table).
//
// Only I/O failures are fatal. Unparseable lines are skipped and counted.

use crate::core::dedup::RecordSet;
use crate::core::model::{ExtractMode, InferredTable};
use crate::core::tabular::{self, RowSource};
use crate::core::template::{self, TemplateSpec};
use crate::core::{mixed, protocol, table};
use crate::platform::fs;
use crate::util::error::{IpSiftError, Result, SourceError};
use crate::util::logging;
use std::path::{Path, PathBuf};

/// Which extraction path a run took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    ProtocolLinks,
    Text,
    Tabular,
}

impl SourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::ProtocolLinks => "protocol links",
            SourceKind::Text => "text",
            SourceKind::Tabular => "table",
        }
    }
}

/// Quick-mode settings for one run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunOptions {
    pub mode: ExtractMode,
    /// Port paired with bare addresses; `None` drops portless records in
    /// modes that need a port.
    pub default_port: Option<String>,
}

/// What a quick-mode run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Deduplicated records in byte-wise order.
    pub records: Vec<String>,
    pub kind: SourceKind,
    pub mode: ExtractMode,
    /// Input lines or rows that yielded no record.
    pub skipped: usize,
}

// =============================================================================
// Quick mode
// =============================================================================

fn extract_links(lines: &[&str], mode: ExtractMode, set: &mut RecordSet) -> usize {
    let mut skipped = 0;
    for line in lines.iter().map(|l| l.trim()).filter(|l| !l.is_empty()) {
        match protocol::parse_protocol_link(line).and_then(|link| link.render(mode)) {
            Some(record) => {
                set.insert(record);
            }
            None => {
                tracing::trace!(line = logging::preview(line), "No record from link line");
                skipped += 1;
            }
        }
    }
    skipped
}

fn extract_text(content: &str, options: &RunOptions, set: &mut RecordSet) -> usize {
    let mut skipped = 0;
    for line in table::raw_lines(content) {
        match mixed::extract_mixed(line, options.mode, options.default_port.as_deref()) {
            Some(record) => {
                set.insert(record);
            }
            None => {
                tracing::trace!(line = logging::preview(line), "No record from text line");
                skipped += 1;
            }
        }
    }
    skipped
}

/// Load a tabular source. Content that does not read as a multi-column
/// CSV or pipe table with a real header row goes through table inference;
/// when that finds nothing either, the tabular result stands.
fn load_row_source(content: &str) -> std::result::Result<RowSource, SourceError> {
    match tabular::load_tabular(content) {
        Ok(source) if source.column_count() > 1 && !tabular::has_data_header(&source) => {
            Ok(source)
        }
        other => {
            let lines = table::raw_lines(content);
            match table::infer_table(&lines) {
                Some(t) => {
                    tracing::debug!("No usable header row; using inferred table");
                    Ok(RowSource::from(&t))
                }
                None => other,
            }
        }
    }
}

/// Run quick-mode extraction over already-read content.
///
/// `extension` is the lower-cased input extension including the dot.
pub fn extract_content(
    content: &str,
    extension: &str,
    options: &RunOptions,
) -> std::result::Result<RunOutcome, SourceError> {
    let lines: Vec<&str> = content.lines().collect();
    let mut set = RecordSet::new();

    let (kind, skipped) = if protocol::is_protocol_link_file(&lines) {
        (
            SourceKind::ProtocolLinks,
            extract_links(&lines, options.mode, &mut set),
        )
    } else if extension == ".txt" {
        (SourceKind::Text, extract_text(content, options, &mut set))
    } else {
        let source = load_row_source(content)?;
        let skipped = tabular::extract_rows(
            &source,
            options.mode,
            options.default_port.as_deref(),
            &mut set,
        );
        (SourceKind::Tabular, skipped)
    };

    tracing::info!(
        kind = kind.label(),
        mode = %options.mode,
        records = set.len(),
        skipped,
        "Extraction complete"
    );

    Ok(RunOutcome {
        records: set.into_sorted(),
        kind,
        mode: options.mode,
        skipped,
    })
}

fn read_input(path: &Path) -> Result<String> {
    fs::read_file_lossy(path).map_err(|source| IpSiftError::Io {
        path: path.to_path_buf(),
        operation: "read",
        source,
    })
}

/// Quick-mode extraction over a file.
pub fn run_quick(path: &Path, options: &RunOptions) -> Result<RunOutcome> {
    let content = read_input(path)?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "Input read");
    Ok(extract_content(&content, &fs::extension_of(path), options)?)
}

/// Extraction for a file handed over without options (drag and drop):
/// protocol link lists keep their remarks, everything else becomes
/// `host port` with no default port.
pub fn run_dropped(path: &Path) -> Result<RunOutcome> {
    let content = read_input(path)?;
    let lines: Vec<&str> = content.lines().collect();
    let mode = if protocol::is_protocol_link_file(&lines) {
        ExtractMode::IpPortRemark
    } else {
        ExtractMode::IpSpacePort
    };
    let options = RunOptions {
        mode,
        default_port: None,
    };
    Ok(extract_content(&content, &fs::extension_of(path), &options)?)
}

// =============================================================================
// Custom template mode
// =============================================================================

/// Build the row source custom mode works on: the CSV reader for `.csv`
/// (inferred when it has no header row), otherwise the table inferred from
/// the lines.
pub fn custom_source(content: &str, extension: &str) -> std::result::Result<RowSource, SourceError> {
    if extension == ".csv" {
        return load_row_source(content);
    }
    let lines = table::raw_lines(content);
    table::infer_table(&lines)
        .map(|t| RowSource::from(&t))
        .ok_or(SourceError::NoColumns)
}

/// Custom template extraction over a file.
pub fn run_custom(path: &Path, spec: &TemplateSpec) -> Result<Vec<String>> {
    let content = read_input(path)?;
    let source = custom_source(&content, &fs::extension_of(path))?;
    let records = template::apply_template(&source, spec)?;
    tracing::info!(records = records.len(), "Template applied");
    Ok(records)
}

// =============================================================================
// Inspection and output
// =============================================================================

/// Infer the table shape of a file without extracting anything.
///
/// `Ok(None)` means no consistent delimiter exists.
pub fn inspect(path: &Path) -> Result<Option<InferredTable>> {
    let content = read_input(path)?;
    let lines = table::raw_lines(&content);
    Ok(table::infer_table(&lines))
}

/// Write records to `name` (`.txt` appended when missing) under the current
/// directory. Returns the path written.
pub fn write_output(records: &[String], name: &str) -> Result<PathBuf> {
    let path = fs::safe_output_path(name);
    fs::write_records(&path, records).map_err(|source| IpSiftError::Io {
        path: path.clone(),
        operation: "write",
        source,
    })?;
    tracing::info!(path = %path.display(), records = records.len(), "Output written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(mode: ExtractMode, port: Option<&str>) -> RunOptions {
        RunOptions {
            mode,
            default_port: port.map(str::to_string),
        }
    }

    #[test]
    fn test_link_file_detected_before_extension() {
        let content = "vless://a@h.example:443#N1\ntrojan://b@1.1.1.1:8443#N2\nnot a link\n";
        let out = extract_content(content, ".csv", &options(ExtractMode::IpPortRemark, None)).unwrap();
        assert_eq!(out.kind, SourceKind::ProtocolLinks);
        assert_eq!(out.records, vec!["1.1.1.1:8443#N2", "h.example:443#N1"]);
        assert_eq!(out.skipped, 1);
    }

    #[test]
    fn test_text_file_uses_mixed_extraction() {
        let content = "----- group -----\nnode 10.0.0.1:22\nhost 10.0.0.2 only\nnoise\nnode 10.0.0.1:22\n";
        let out = extract_content(content, ".txt", &options(ExtractMode::IpSpacePort, None)).unwrap();
        assert_eq!(out.kind, SourceKind::Text);
        assert_eq!(out.records, vec!["10.0.0.1 22"]);
        assert_eq!(out.skipped, 2);

        let out = extract_content(content, ".txt", &options(ExtractMode::IpSpacePort, Some("443"))).unwrap();
        assert_eq!(out.records, vec!["10.0.0.1 22", "10.0.0.2 443"]);
    }

    #[test]
    fn test_csv_source_with_port_column() {
        let content = "Address,Port,Region\n1.1.1.1,53,US\n8.8.8.8,,US\n";
        let out = extract_content(content, ".csv", &options(ExtractMode::IpPortRemark, Some("443"))).unwrap();
        assert_eq!(out.kind, SourceKind::Tabular);
        assert_eq!(out.records, vec!["1.1.1.1:53", "8.8.8.8:443"]);
    }

    #[test]
    fn test_headerless_content_falls_back_to_inferred_table() {
        let content = "1.2.3.4#80\n5.6.7.8#443\n";
        let out = extract_content(content, ".dat", &options(ExtractMode::IpSpacePort, None)).unwrap();
        assert_eq!(out.records, vec!["1.2.3.4 80", "5.6.7.8 443"]);

        let src = custom_source(content, ".dat").unwrap();
        assert_eq!(src.headers, vec!["column 1 (IP_ONLY)", "column 2 (PORT)"]);
        assert_eq!(src.rows.len(), 2);
    }

    #[test]
    fn test_headerless_comma_rows_keep_first_row() {
        let content = "1.2.3.4,80\n5.6.7.8,443\n";
        let out = extract_content(content, ".dat", &options(ExtractMode::IpSpacePort, None)).unwrap();
        assert_eq!(out.kind, SourceKind::Tabular);
        assert_eq!(out.records, vec!["1.2.3.4 80", "5.6.7.8 443"]);

        let src = custom_source(content, ".csv").unwrap();
        assert_eq!(src.headers, vec!["column 1 (IP_ONLY)", "column 2 (PORT)"]);
        assert_eq!(src.rows.len(), 2);
    }

    #[test]
    fn test_custom_source_without_structure() {
        assert!(matches!(
            custom_source("alpha\nbeta\n", ".txt"),
            Err(SourceError::NoColumns)
        ));
    }

    #[test]
    fn test_missing_input_is_io_error() {
        let err = run_quick(Path::new("/definitely/not/here.txt"), &RunOptions::default()).unwrap_err();
        assert!(matches!(err, IpSiftError::Io { operation: "read", .. }));
    }

    #[test]
    fn test_dropped_file_picks_mode_from_content() {
        let dir = tempfile::tempdir().unwrap();
        let links = dir.path().join("links.txt");
        std::fs::write(&links, "trojan://pw@1.2.3.4:443#HK\n").unwrap();
        let out = run_dropped(&links).unwrap();
        assert_eq!(out.mode, ExtractMode::IpPortRemark);
        assert_eq!(out.records, vec!["1.2.3.4:443#HK"]);

        let text = dir.path().join("hosts.txt");
        std::fs::write(&text, "a 1.1.1.1\nb 2.2.2.2:22\n").unwrap();
        let out = run_dropped(&text).unwrap();
        assert_eq!(out.mode, ExtractMode::IpSpacePort);
        assert_eq!(out.records, vec!["2.2.2.2 22"]);
    }

    #[test]
    fn test_run_custom_on_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nodes.csv");
        std::fs::write(&path, "ip,port,name\nhttps://2.2.2.2/x,443,b\n1.1.1.1,80,a\n").unwrap();
        let spec = TemplateSpec {
            columns: vec![1, 2, 3],
            ..TemplateSpec::default()
        };
        assert_eq!(
            run_custom(&path, &spec).unwrap(),
            vec!["1.1.1.1:80#a", "2.2.2.2:443#b"]
        );
    }
}
