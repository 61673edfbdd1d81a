// ipsift - core/protocol.rs
//
// Proxy link recognition: `vless://`, `trojan://`, `vmess://` and `ss://`
// links reduced to host, port and remark.

use crate::core::model::{Decoded, ProtocolLink, Scheme};
use crate::util::constants;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use regex::Regex;
use std::sync::OnceLock;

fn credential_link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(vless|trojan|vmess)://[^@]+@([^:]+):(\d+)[^#]*(?:#(.*))?")
            .expect("protocol: invalid regex")
    })
}

/// Decide whether `lines` come from a protocol link list.
///
/// Only the first `PROTOCOL_DETECTION_LINES` lines are sampled (blank ones
/// included, as a reader would see them); the check is case-insensitive.
pub fn is_protocol_link_file<S: AsRef<str>>(lines: &[S]) -> bool {
    lines
        .iter()
        .take(constants::PROTOCOL_DETECTION_LINES)
        .map(|l| l.as_ref().trim().to_lowercase())
        .any(|l| constants::PROTOCOL_PREFIXES.iter().any(|p| l.contains(p)))
}

/// Percent-decode a link component.
///
/// Escapes that do not decode to valid UTF-8 leave the raw text in place as
/// [`Decoded::Verbatim`].
pub fn percent_decode(raw: &str) -> Decoded {
    match urlencoding::decode(raw) {
        Ok(cow) => Decoded::Decoded(cow.into_owned()),
        Err(e) => {
            tracing::trace!(raw, error = %e, "Percent-decoding failed; keeping raw text");
            Decoded::Verbatim(raw.to_string())
        }
    }
}

/// Parse a single line as a proxy link.
///
/// Lines that match no link pattern return `None`; they are skipped by the
/// caller without being reported.
pub fn parse_protocol_link(line: &str) -> Option<ProtocolLink> {
    let line = line.trim();

    if let Some(caps) = credential_link_re().captures(line) {
        let scheme = Scheme::from_label(caps.get(1)?.as_str())?;
        return Some(ProtocolLink {
            scheme,
            host: Some(percent_decode(caps.get(2)?.as_str())),
            port: Some(caps.get(3)?.as_str().to_string()),
            remark: caps
                .get(4)
                .map(|m| m.as_str())
                .filter(|r| !r.is_empty())
                .map(percent_decode),
        });
    }

    if let Some(body) = line.strip_prefix("vmess://") {
        return parse_vmess_json(body);
    }

    if let Some(body) = line.strip_prefix("ss://") {
        return parse_shadowsocks(body);
    }

    None
}

/// Decode base64 in any of the alphabets found in the wild.
fn decode_base64(input: &str) -> Option<Vec<u8>> {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(&cleaned)
        .or_else(|_| STANDARD_NO_PAD.decode(&cleaned))
        .or_else(|_| URL_SAFE.decode(&cleaned))
        .or_else(|_| URL_SAFE_NO_PAD.decode(&cleaned))
        .ok()
}

/// `vmess://<base64 JSON>` with `add`, `port` and `ps` keys.
fn parse_vmess_json(body: &str) -> Option<ProtocolLink> {
    let (encoded, _) = body.split_once('#').unwrap_or((body, ""));
    let bytes = decode_base64(encoded)?;
    let json: serde_json::Value = serde_json::from_slice(&bytes).ok()?;

    let host = json["add"].as_str().filter(|h| !h.is_empty())?;
    let port = match &json["port"] {
        serde_json::Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            s.clone()
        }
        serde_json::Value::Number(n) => n.as_u64()?.to_string(),
        _ => return None,
    };
    let remark = json["ps"]
        .as_str()
        .filter(|r| !r.is_empty())
        .map(|r| Decoded::Decoded(r.to_string()));

    Some(ProtocolLink {
        scheme: Scheme::Vmess,
        host: Some(Decoded::Decoded(host.to_string())),
        port: Some(port),
        remark,
    })
}

/// Split `host:port`, dropping any trailing `/path` or `?query`.
fn split_endpoint(server: &str) -> Option<(&str, &str)> {
    let end = server.find(|c: char| c == '/' || c == '?').unwrap_or(server.len());
    let (host, port) = server[..end].rsplit_once(':')?;
    let valid = !host.is_empty() && !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit());
    valid.then_some((host, port))
}

/// `ss://<opaque>#<remark>`.
///
/// The endpoint is recovered when the opaque part is SIP002
/// (`userinfo@host:port`) or legacy base64 of `method:password@host:port`.
/// Without an endpoint the remark is still required for the line to count
/// as a link.
fn parse_shadowsocks(body: &str) -> Option<ProtocolLink> {
    let (opaque, remark) = match body.split_once('#') {
        Some((opaque, remark)) => (opaque, Some(remark).filter(|r| !r.is_empty())),
        None => (body, None),
    };
    if opaque.is_empty() {
        return None;
    }

    let endpoint = match opaque.rsplit_once('@') {
        Some((_, server)) => split_endpoint(server).map(|(h, p)| (h.to_string(), p.to_string())),
        None => {
            // '/' is also a base64 symbol, so only strip a plugin suffix when
            // the whole opaque part does not decode.
            let end = opaque.find(|c: char| c == '/' || c == '?').unwrap_or(opaque.len());
            decode_base64(opaque)
                .or_else(|| decode_base64(&opaque[..end]))
                .and_then(|bytes| String::from_utf8(bytes).ok())
                .and_then(|plain| {
                    let (_, server) = plain.rsplit_once('@')?;
                    split_endpoint(server).map(|(h, p)| (h.to_string(), p.to_string()))
                })
        }
    };

    if endpoint.is_none() && remark.is_none() {
        return None;
    }

    let (host, port) = match endpoint {
        Some((host, port)) => (Some(percent_decode(&host)), Some(port)),
        None => (None, None),
    };

    Some(ProtocolLink {
        scheme: Scheme::Shadowsocks,
        host,
        port,
        remark: remark.map(percent_decode),
    })
}
