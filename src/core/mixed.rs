// ipsift - core/mixed.rs
//
// Mixed-content extraction: pull an address (and port, when present) out of
// free text using an ordered list of matchers. The first matcher that finds
// something wins; later matchers are never consulted.

use crate::core::model::{ExtractMode, Extracted};
use regex::Regex;
use std::sync::OnceLock;

/// A matcher inspects text and reports what it found, if anything.
type Matcher = fn(&str) -> Option<Extracted>;

/// Matchers in priority order.
const MATCHERS: &[(&str, Matcher)] = &[
    ("address:port", match_address_colon_port),
    ("address,port", match_address_comma_port),
    ("address", match_address),
];

struct Patterns {
    colon: Regex,
    comma: Regex,
    bare: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        fn re(pat: &str) -> Regex {
            Regex::new(pat).expect("mixed: invalid regex")
        }
        Patterns {
            colon: re(r"(\d+\.\d+\.\d+\.\d+):(\d+)"),
            comma: re(r"(\d+\.\d+\.\d+\.\d+)\s*,\s*(\d+)"),
            bare: re(r"\d+\.\d+\.\d+\.\d+"),
        }
    })
}

fn address_port(re: &Regex, text: &str) -> Option<Extracted> {
    let caps = re.captures(text)?;
    Some(Extracted::AddressPort {
        address: caps.get(1)?.as_str().to_string(),
        port: caps.get(2)?.as_str().to_string(),
    })
}

fn match_address_colon_port(text: &str) -> Option<Extracted> {
    address_port(&patterns().colon, text)
}

fn match_address_comma_port(text: &str) -> Option<Extracted> {
    address_port(&patterns().comma, text)
}

fn match_address(text: &str) -> Option<Extracted> {
    patterns()
        .bare
        .find(text)
        .map(|m| Extracted::Address(m.as_str().to_string()))
}

/// Run the matchers over `text` in priority order.
pub fn find_address(text: &str) -> Option<Extracted> {
    MATCHERS.iter().find_map(|(name, matcher)| {
        let found = matcher(text);
        if found.is_some() {
            tracing::trace!(matcher = name, "Mixed-content matcher hit");
        }
        found
    })
}

/// Render what a matcher found in the requested mode.
///
/// When the mode needs a port and the text had none, the default port is
/// used if one was supplied. Without a default port the record is dropped:
/// a portless record would misrepresent the source.
pub fn render_extracted(
    extracted: &Extracted,
    mode: ExtractMode,
    default_port: Option<&str>,
) -> Option<String> {
    let port = extracted.port().or(default_port);
    if mode.requires_port() && port.is_none() {
        tracing::trace!(
            address = extracted.address(),
            "No port and no default port; record dropped"
        );
        return None;
    }
    mode.render(extracted.address(), port, None)
}

/// Extract one record from a line of free text.
pub fn extract_mixed(line: &str, mode: ExtractMode, default_port: Option<&str>) -> Option<String> {
    let extracted = find_address(line)?;
    render_extracted(&extracted, mode, default_port)
}
