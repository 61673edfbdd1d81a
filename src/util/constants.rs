// ipsift - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "ipsift";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "ipsift";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Input handling
// =============================================================================

/// Lines starting with this marker separate groups of records (for example
/// per-sheet headings in merged exports). They never take part in inference
/// or extraction.
pub const GROUP_SEPARATOR_PREFIX: &str = "-----";

/// Candidate field separators, in priority order. When two candidates reach
/// the same score the earlier one wins.
pub const DELIMITER_CANDIDATES: &[&str] = &[",", "#", "|", ":", "-", "\t", " "];

// =============================================================================
// Classification
// =============================================================================

/// Number of non-empty values sampled per column for type classification.
pub const CLASSIFY_SAMPLE_SIZE: usize = 10;

/// Lowest valid TCP/UDP port.
pub const PORT_MIN: u32 = 1;

/// Highest valid TCP/UDP port.
pub const PORT_MAX: u32 = 65_535;

/// Header keywords that mark a column as holding addresses.
pub const ADDRESS_HEADER_KEYWORDS: &[&str] = &["ip", "地址", "host", "input"];

/// Header keywords that mark a column as holding ports.
pub const PORT_HEADER_KEYWORDS: &[&str] = &["port", "端口"];

// =============================================================================
// Protocol links
// =============================================================================

/// Number of leading lines sampled to decide whether a file is a protocol
/// link list.
pub const PROTOCOL_DETECTION_LINES: usize = 5;

/// Link prefixes that mark a protocol link list (matched case-insensitively).
pub const PROTOCOL_PREFIXES: &[&str] = &["vless://", "trojan://", "ss://", "vmess://"];

// =============================================================================
// Extraction defaults
// =============================================================================

/// Port paired with bare addresses when the user asks for a default port
/// without naming one.
pub const DEFAULT_PORT: u16 = 443;

/// Number of records shown in the post-run preview.
pub const PREVIEW_RECORDS: usize = 10;

/// Number of sample values shown per column by `inspect`.
pub const INSPECT_SAMPLES_PER_COLUMN: usize = 2;

// =============================================================================
// Custom template mode
// =============================================================================

/// Highest placeholder index recognised in a format template (`[1]`..`[9]`).
pub const MAX_TEMPLATE_PLACEHOLDER: usize = 9;

/// Preset templates offered for 1..=5 selected columns.
pub const PRESET_TEMPLATES: &[&str] = &[
    "[1]",
    "[1]:[2]",
    "[1]:[2]#[3]",
    "[1]:[2]#[3]|[4]",
    "[1]:[2]#[3]|[4]|[5]",
];

// =============================================================================
// Output
// =============================================================================

/// Extension enforced on every output file name.
pub const OUTPUT_EXTENSION: &str = ".txt";

/// Default output stem for `ip:port#remark` output.
pub const OUTPUT_STEM_IP_PORT_REMARK: &str = "ip_port_remark_results";

/// Default output stem for `ip port` output.
pub const OUTPUT_STEM_IP_SPACE_PORT: &str = "ip_port_results";

/// Default output stem for address-only output.
pub const OUTPUT_STEM_IP_ONLY: &str = "ip_results";

/// Default output stem for custom template output.
pub const OUTPUT_STEM_CUSTOM: &str = "custom_results";

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Maximum length of an input line included in debug output.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
