// ipsift - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// platform dependencies.
//
// These types are the shared vocabulary across all layers.

use std::cmp::Ordering;
use std::fmt;

// =============================================================================
// Column type tags
// =============================================================================

/// Semantic classification of an inferred table column.
///
/// Tags are stored once per column (a side-table next to the rows), never
/// per cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// Values look exactly like `ddd.ddd.ddd.ddd:ddd`.
    IpPort,
    /// Values look exactly like `ddd.ddd.ddd.ddd`.
    IpOnly,
    /// Values embed an address somewhere inside other text.
    Mixed,
    /// Values are integers in the valid port range.
    Port,
    /// Anything else.
    Text,
}

impl ColumnType {
    /// Tag label used in headers and `inspect` output.
    pub fn label(&self) -> &'static str {
        match self {
            ColumnType::IpPort => "IP_PORT",
            ColumnType::IpOnly => "IP_ONLY",
            ColumnType::Mixed => "MIXED",
            ColumnType::Port => "PORT",
            ColumnType::Text => "TEXT",
        }
    }

    /// True for the tags that carry an address.
    pub fn holds_address(&self) -> bool {
        matches!(
            self,
            ColumnType::IpPort | ColumnType::IpOnly | ColumnType::Mixed
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Delimiter inference
// =============================================================================

/// Outcome of testing one separator against the whole line corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimiterCandidate {
    /// The separator being tested.
    pub delimiter: &'static str,

    /// False as soon as two lines containing the separator split into a
    /// different number of non-empty fields.
    pub consistent: bool,

    /// Field count of the first line containing the separator.
    pub field_count: Option<usize>,

    /// Number of lines containing the separator (counted until the candidate
    /// was disqualified).
    pub occurrences: usize,
}

impl DelimiterCandidate {
    /// Score used to rank eligible candidates, or `None` when the candidate
    /// is not eligible (inconsistent, never seen, or a single field).
    pub fn score(&self) -> Option<usize> {
        match self.field_count {
            Some(count) if self.consistent && count > 1 => Some(self.occurrences * count),
            _ => None,
        }
    }
}

/// A table inferred from raw lines.
///
/// Every row has exactly `column_count()` fields; short rows are padded on
/// the right with empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferredTable {
    /// The winning separator.
    pub delimiter: &'static str,

    /// Field count of the winning separator before address:port sub-splitting.
    pub field_count: usize,

    /// Fixed-width rows.
    pub rows: Vec<Vec<String>>,

    /// One tag per column.
    pub columns: Vec<ColumnType>,
}

impl InferredTable {
    /// Number of columns (uniform across rows).
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Iterate the values of a column, top to bottom.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |row| row.get(index).map(String::as_str).unwrap_or(""))
    }

    /// Human-readable header for a column, e.g. `column 1 (IP_ONLY)`.
    pub fn header(&self, index: usize) -> String {
        let tag = self
            .columns
            .get(index)
            .copied()
            .unwrap_or(ColumnType::Text);
        format!("column {} ({tag})", index + 1)
    }
}

// =============================================================================
// Extraction mode
// =============================================================================

/// Output shape of extracted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExtractMode {
    /// `host:port#remark` (remark only when the source has one).
    IpPortRemark,
    /// `host port`.
    #[default]
    IpSpacePort,
    /// `host`.
    IpOnly,
}

impl ExtractMode {
    /// Returns all variants.
    pub fn all() -> &'static [ExtractMode] {
        &[
            ExtractMode::IpPortRemark,
            ExtractMode::IpSpacePort,
            ExtractMode::IpOnly,
        ]
    }

    /// The name accepted on the command line and in config.toml.
    pub fn name(&self) -> &'static str {
        match self {
            ExtractMode::IpPortRemark => "ipportremark",
            ExtractMode::IpSpacePort => "ipspace",
            ExtractMode::IpOnly => "iponly",
        }
    }

    /// Parse a mode name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        let lowered = name.trim().to_lowercase();
        Self::all().iter().copied().find(|m| m.name() == lowered)
    }

    /// Whether a record in this mode must carry a port.
    pub fn requires_port(&self) -> bool {
        !matches!(self, ExtractMode::IpOnly)
    }

    /// Default output file stem for this mode.
    pub fn output_stem(&self) -> &'static str {
        use crate::util::constants;
        match self {
            ExtractMode::IpPortRemark => constants::OUTPUT_STEM_IP_PORT_REMARK,
            ExtractMode::IpSpacePort => constants::OUTPUT_STEM_IP_SPACE_PORT,
            ExtractMode::IpOnly => constants::OUTPUT_STEM_IP_ONLY,
        }
    }

    /// Render a host/port/remark triple in this mode.
    ///
    /// Returns `None` when the mode requires a port and none is given, or
    /// when the host is empty: a record is never empty and never lacks the
    /// data its shape promises.
    pub fn render(&self, host: &str, port: Option<&str>, remark: Option<&str>) -> Option<String> {
        if host.is_empty() {
            return None;
        }
        match (self, port) {
            (ExtractMode::IpOnly, _) => Some(host.to_string()),
            (ExtractMode::IpSpacePort, Some(port)) => Some(format!("{host} {port}")),
            (ExtractMode::IpPortRemark, Some(port)) => match remark {
                Some(remark) if !remark.is_empty() => Some(format!("{host}:{port}#{remark}")),
                _ => Some(format!("{host}:{port}")),
            },
            (_, None) => None,
        }
    }
}

impl fmt::Display for ExtractMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Percent-decoding outcome
// =============================================================================

/// Result of percent-decoding a link component.
///
/// Decoding never drops a record: when the escape sequences do not form
/// valid UTF-8 the raw text is retained as `Verbatim`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// Decoding succeeded (also used when there was nothing to decode).
    Decoded(String),
    /// Decoding failed; the value is the raw, still-encoded text.
    Verbatim(String),
}

impl Decoded {
    pub fn as_str(&self) -> &str {
        match self {
            Decoded::Decoded(s) | Decoded::Verbatim(s) => s,
        }
    }

    pub fn is_verbatim(&self) -> bool {
        matches!(self, Decoded::Verbatim(_))
    }
}

// =============================================================================
// Protocol links
// =============================================================================

/// URI scheme of a recognised proxy link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Vless,
    Trojan,
    Vmess,
    Shadowsocks,
}

impl Scheme {
    pub fn label(&self) -> &'static str {
        match self {
            Scheme::Vless => "vless",
            Scheme::Trojan => "trojan",
            Scheme::Vmess => "vmess",
            Scheme::Shadowsocks => "ss",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "vless" => Some(Scheme::Vless),
            "trojan" => Some(Scheme::Trojan),
            "vmess" => Some(Scheme::Vmess),
            "ss" => Some(Scheme::Shadowsocks),
            _ => None,
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single recognised proxy link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolLink {
    pub scheme: Scheme,

    /// Server host, percent-decoded. `None` for `ss://` links whose opaque
    /// part does not reveal an endpoint.
    pub host: Option<Decoded>,

    /// Server port digits. Present whenever `host` is.
    pub port: Option<String>,

    /// Human-readable remark from the `#fragment`, percent-decoded.
    pub remark: Option<Decoded>,
}

impl ProtocolLink {
    /// Render the link as an extracted record in the given mode.
    ///
    /// Links without an endpoint produce no record in any mode.
    pub fn render(&self, mode: ExtractMode) -> Option<String> {
        let host = self.host.as_ref()?;
        let port = self.port.as_deref()?;
        mode.render(
            host.as_str(),
            Some(port),
            self.remark.as_ref().map(Decoded::as_str),
        )
    }
}

// =============================================================================
// Mixed-content extraction
// =============================================================================

/// What a mixed-content matcher found in a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    /// An address paired with a port (`a:p` or `a , p`).
    AddressPort { address: String, port: String },
    /// A bare address.
    Address(String),
}

impl Extracted {
    pub fn address(&self) -> &str {
        match self {
            Extracted::AddressPort { address, .. } | Extracted::Address(address) => address,
        }
    }

    pub fn port(&self) -> Option<&str> {
        match self {
            Extracted::AddressPort { port, .. } => Some(port),
            Extracted::Address(_) => None,
        }
    }
}

// =============================================================================
// Sort keys
// =============================================================================

/// Typed sort key taken from a selected column in custom mode.
///
/// Integers compare numerically and text lexicographically. Comparing an
/// integer with text is a comparison failure (`partial_cmp` returns `None`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
    Integer(i64),
    Text(String),
}

impl SortKey {
    /// Build a key from a cell value: all-digit values (with an optional
    /// leading minus) become integers.
    pub fn from_value(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed.parse::<i64>() {
            Ok(n) if !trimmed.starts_with('+') => SortKey::Integer(n),
            _ => SortKey::Text(trimmed.to_string()),
        }
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (SortKey::Integer(a), SortKey::Integer(b)) => Some(a.cmp(b)),
            (SortKey::Text(a), SortKey::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}
