// ipsift - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// Expected outcomes (no delimiter found, a line matching no pattern, a
// component that cannot be percent-decoded) are NOT errors and never appear
// here; they are modelled as `Option`/enum results in the core layer.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all ipsift operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum IpSiftError {
    /// A tabular source could not be read into rows.
    Source(SourceError),

    /// Custom template configuration is unusable.
    Template(TemplateError),

    /// I/O error with path context. Fatal for the run.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for IpSiftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source(e) => write!(f, "Source error: {e}"),
            Self::Template(e) => write!(f, "Template error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for IpSiftError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Source(e) => Some(e),
            Self::Template(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Source errors
// ---------------------------------------------------------------------------

/// Errors related to reading tabular (row/column) sources.
#[derive(Debug)]
pub enum SourceError {
    /// The CSV reader rejected the content.
    Csv { source: csv::Error },

    /// The content has no header row and no inferable column structure.
    NoColumns,
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv { source } => write!(f, "CSV parse failed: {source}"),
            Self::NoColumns => write!(
                f,
                "No column structure found (no header row and no consistent delimiter)"
            ),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Csv { source } => Some(source),
            Self::NoColumns => None,
        }
    }
}

impl From<SourceError> for IpSiftError {
    fn from(e: SourceError) -> Self {
        Self::Source(e)
    }
}

// ---------------------------------------------------------------------------
// Template errors
// ---------------------------------------------------------------------------

/// Errors related to custom template mode.
#[derive(Debug, PartialEq, Eq)]
pub enum TemplateError {
    /// None of the requested column indices refer to an existing column.
    NoColumnsSelected { requested: Vec<usize>, available: usize },

    /// The sort column is not one of the selected columns.
    SortColumnOutOfRange { index: usize, selected: usize },

    /// The format template is empty after trimming.
    EmptyFormat,
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoColumnsSelected {
                requested,
                available,
            } => write!(
                f,
                "None of the requested columns {requested:?} exist (source has {available} columns)"
            ),
            Self::SortColumnOutOfRange { index, selected } => write!(
                f,
                "Sort column {index} is out of range; {selected} columns are selected"
            ),
            Self::EmptyFormat => write!(f, "Format template is empty"),
        }
    }
}

impl std::error::Error for TemplateError {}

impl From<TemplateError> for IpSiftError {
    fn from(e: TemplateError) -> Self {
        Self::Template(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for ipsift results.
pub type Result<T> = std::result::Result<T, IpSiftError>;
