// ipsift - core/classify.rs
//
// Column type classification and the address/port shape predicates shared by
// the tokenizer, the table extractor and the mixed-content extractor.

use crate::core::model::ColumnType;
use crate::util::constants;
use regex::Regex;
use std::sync::OnceLock;

/// Compiled shape patterns, built once per process.
struct Shapes {
    ip_port: Regex,
    ip: Regex,
    embedded_ip: Regex,
}

fn shapes() -> &'static Shapes {
    static SHAPES: OnceLock<Shapes> = OnceLock::new();
    SHAPES.get_or_init(|| {
        // Patterns are literals covered by the unit tests below.
        fn re(pat: &str) -> Regex {
            Regex::new(pat).expect("classify: invalid regex")
        }
        Shapes {
            ip_port: re(r"^(\d+\.\d+\.\d+\.\d+):(\d+)$"),
            ip: re(r"^\d+\.\d+\.\d+\.\d+$"),
            embedded_ip: re(r"\d+\.\d+\.\d+\.\d+"),
        }
    })
}

/// True when `value` is exactly `address:port`.
pub fn is_ip_port(value: &str) -> bool {
    shapes().ip_port.is_match(value)
}

/// Split an exact `address:port` value into its two halves.
pub fn split_ip_port(value: &str) -> Option<(&str, &str)> {
    let caps = shapes().ip_port.captures(value)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

/// True when `value` is exactly an address.
pub fn is_ip(value: &str) -> bool {
    shapes().ip.is_match(value)
}

/// True when an address appears anywhere inside `value`.
pub fn contains_ip(value: &str) -> bool {
    shapes().embedded_ip.is_match(value)
}

/// True when `value` is all ASCII digits and within the valid port range.
pub fn is_port(value: &str) -> bool {
    !value.is_empty()
        && value.bytes().all(|b| b.is_ascii_digit())
        && value
            .parse::<u32>()
            .map(|n| (constants::PORT_MIN..=constants::PORT_MAX).contains(&n))
            .unwrap_or(false)
}

/// Classify a column from its values.
///
/// Only the first `CLASSIFY_SAMPLE_SIZE` non-empty (trimmed) values are
/// inspected. Tags are tried in priority order and the first one any sample
/// supports wins: IP_PORT, IP_ONLY, MIXED. PORT needs every sample to be a
/// valid port. Everything else is TEXT, including a column with no samples.
pub fn classify_column<'a, I>(values: I) -> ColumnType
where
    I: IntoIterator<Item = &'a str>,
{
    let samples: Vec<&str> = values
        .into_iter()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .take(constants::CLASSIFY_SAMPLE_SIZE)
        .collect();

    if samples.is_empty() {
        return ColumnType::Text;
    }
    if samples.iter().any(|v| is_ip_port(v)) {
        return ColumnType::IpPort;
    }
    if samples.iter().any(|v| is_ip(v)) {
        return ColumnType::IpOnly;
    }
    if samples.iter().any(|v| contains_ip(v)) {
        return ColumnType::Mixed;
    }
    if samples.iter().all(|v| is_port(v)) {
        return ColumnType::Port;
    }
    ColumnType::Text
}
