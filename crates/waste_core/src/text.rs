//! Shared text and host normalization helpers.

use std::net::IpAddr;

/// Truncate `value` to at most `max_chars` characters.
pub fn truncate_chars(value: &str, max_chars: usize) -> &str {
    match value.char_indices().nth(max_chars) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}

/// Strip a trailing `:port` from a host, keeping bracketed IPv6 literals intact.
pub fn host_without_port(host: &str) -> &str {
    if let Some(rest) = host.strip_prefix('[') {
        return match rest.find(']') {
            Some(end) => &host[..end + 2],
            None => host,
        };
    }
    match host.rsplit_once(':') {
        Some((name, port)) if !name.contains(':') && port.bytes().all(|b| b.is_ascii_digit()) => {
            name
        }
        _ => host,
    }
}

/// Return `true` when `host` is localhost or a loopback IP literal.
///
/// Supports bracketed IPv6 hosts (for example `[::1]`).
///
/// # Returns
/// `true` when `host` resolves to loopback identity (`localhost`, `127.0.0.0/8`,
/// or `::1`), otherwise `false`.
pub fn is_loopback_host(host: &str) -> bool {
    if host.eq_ignore_ascii_case("localhost") {
        return true;
    }
    let normalized_host = host
        .strip_prefix('[')
        .and_then(|value| value.strip_suffix(']'))
        .unwrap_or(host);
    normalized_host
        .parse::<IpAddr>()
        .map(|ip| ip.is_loopback())
        .unwrap_or(false)
}

/// Authority (`host[:port]`) of an absolute URL such as a `Referer`.
///
/// Default ports are omitted, matching how browsers send `Host`.
///
/// # Returns
/// `None` when the value does not parse as a URL or carries no host
/// (relative references, `file:` URLs, `data:` URLs).
pub fn url_host(value: &str) -> Option<String> {
    let url = url::Url::parse(value).ok()?;
    let host = url.host_str().filter(|host| !host.is_empty())?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}
