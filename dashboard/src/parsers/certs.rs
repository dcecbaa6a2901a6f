//! `certs:report` and `letsencrypt:list`

use chrono::NaiveDateTime;

use crate::models::certificate::{SslCertificate, SslStatus};
use crate::parsers::{marker_value, parse_flag, split_list};

const LIST_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// openssl prints `Mar 14 12:00:00 2026 GMT`
const OPENSSL_DATE_FORMAT: &str = "%b %d %H:%M:%S %Y";

/// Parse an expiry timestamp in either host format
pub fn parse_expiry(text: &str) -> Option<NaiveDateTime> {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let normalized = normalized.trim_end_matches(" GMT").trim();
    if normalized.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(normalized, OPENSSL_DATE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(normalized, LIST_DATE_FORMAT))
        .ok()
}

pub fn parse_ssl_status(output: &str) -> SslStatus {
    let field = |marker: &str| marker_value(output, marker).unwrap_or_default();
    let expires_at_raw = field("Ssl expires at:");

    SslStatus {
        enabled: parse_flag(&field("Ssl enabled:")),
        hostnames: split_list(&field("Ssl hostnames:")),
        expires_at: parse_expiry(&expires_at_raw),
        expires_at_raw,
        issuer: field("Ssl issuer:"),
        verified: field("Ssl verified:"),
    }
}

/// Rows of `letsencrypt:list`:
/// `blog  2026-01-20 05:25:37  39d, 8h, 3m, 2s  9d, 8h, 3m, 2s`.
///
/// Rows without a parseable date are skipped; an unparseable remaining
/// time yields 0 days.
pub fn parse_letsencrypt_list(output: &str) -> Vec<SslCertificate> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("---") && !line.contains("App name"))
        .filter_map(parse_letsencrypt_row)
        .collect()
}

fn parse_letsencrypt_row(line: &str) -> Option<SslCertificate> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 4 {
        return None;
    }

    let expiry_date = parts[1..3].join(" ");
    let expires_at = NaiveDateTime::parse_from_str(&expiry_date, LIST_DATE_FORMAT).ok()?;

    let remaining = parts[3..].join(" ");
    let days = remaining
        .split_once("d,")
        .and_then(|(days, _)| days.trim().parse::<i64>().ok())
        .unwrap_or(0);

    Some(SslCertificate::new(parts[0], expiry_date, Some(expires_at), days))
}
