//! Header extraction shared by the read and write handlers.

use axum::http::header::{self, AsHeaderName};
use axum::http::HeaderMap;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use waste_core::delivery::RequestSignals;
use waste_core::text::{host_without_port, is_loopback_host};
use waste_core::Config;

pub(crate) const X_UUID: &str = "x-uuid";
pub(crate) const X_SYNTAX: &str = "x-syntax";
const SEC_FETCH_DEST: &str = "sec-fetch-dest";

pub(crate) fn header_str<K: AsHeaderName>(headers: &HeaderMap, key: K) -> Option<&str> {
    headers.get(key).and_then(|value| value.to_str().ok())
}

pub(crate) fn request_signals(headers: &HeaderMap) -> RequestSignals<'_> {
    RequestSignals {
        accept: header_str(headers, header::ACCEPT),
        user_agent: header_str(headers, header::USER_AGENT),
        sec_fetch_dest: header_str(headers, SEC_FETCH_DEST),
        referer: header_str(headers, header::REFERER),
        host: header_str(headers, header::HOST),
    }
}

/// Requested syntax hint, if a non-empty one was sent.
pub(crate) fn requested_syntax(headers: &HeaderMap) -> Option<String> {
    header_str(headers, X_SYNTAX)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Owner token from `X-UUID`, else the Basic auth password. Lower-cased.
pub(crate) fn owner_token(headers: &HeaderMap) -> String {
    if let Some(token) = header_str(headers, X_UUID).filter(|value| !value.is_empty()) {
        return token.to_lowercase();
    }
    header_str(headers, header::AUTHORIZATION)
        .and_then(basic_auth_password)
        .map(|password| password.to_lowercase())
        .unwrap_or_default()
}

fn basic_auth_password(value: &str) -> Option<String> {
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let credentials = String::from_utf8(decoded).ok()?;
    let (_, password) = credentials.split_once(':')?;
    Some(password.to_string())
}

pub(crate) fn content_length(headers: &HeaderMap) -> Option<u64> {
    header_str(headers, header::CONTENT_LENGTH).and_then(|value| value.trim().parse().ok())
}

/// `filename` (or RFC 5987 `filename*`) parameter of `Content-Disposition`.
pub(crate) fn disposition_filename(headers: &HeaderMap) -> Option<String> {
    header_str(headers, header::CONTENT_DISPOSITION).and_then(parse_disposition_filename)
}

fn parse_disposition_filename(value: &str) -> Option<String> {
    let (_, mut rest) = value.split_once(';')?;
    let mut filename = None;
    loop {
        rest = rest.trim_start_matches([' ', '\t', ';']);
        if rest.is_empty() {
            return filename;
        }
        let (key, after) = rest.split_once('=')?;
        let key = key.trim();
        let after = after.trim_start();
        let (param, remaining) = match after.strip_prefix('"') {
            Some(quoted) => parse_quoted(quoted)?,
            None => match after.find(';') {
                Some(end) => (after[..end].trim().to_string(), &after[end..]),
                None => (after.trim().to_string(), ""),
            },
        };
        if key.eq_ignore_ascii_case("filename*") {
            if let Some(decoded) = decode_ext_value(&param) {
                return Some(decoded);
            }
        } else if key.eq_ignore_ascii_case("filename") {
            filename = Some(param);
        }
        rest = remaining;
    }
}

fn parse_quoted(input: &str) -> Option<(String, &str)> {
    let mut out = String::new();
    let mut chars = input.char_indices();
    while let Some((idx, ch)) = chars.next() {
        match ch {
            '\\' => out.push(chars.next()?.1),
            '"' => return Some((out, &input[idx + 1..])),
            _ => out.push(ch),
        }
    }
    None
}

fn decode_ext_value(value: &str) -> Option<String> {
    let mut parts = value.splitn(3, '\'');
    let charset = parts.next()?;
    let _language = parts.next()?;
    let encoded = parts.next()?;
    if !charset.eq_ignore_ascii_case("utf-8") && !charset.eq_ignore_ascii_case("us-ascii") {
        return None;
    }

    let bytes = encoded.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut idx = 0;
    while idx < bytes.len() {
        if bytes[idx] == b'%' {
            let hex = encoded.get(idx + 1..idx + 3)?;
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            idx += 3;
        } else {
            decoded.push(bytes[idx]);
            idx += 1;
        }
    }
    String::from_utf8(decoded).ok()
}

/// Absolute URL of a paste as seen by the requesting client.
///
/// Hosts with a port or loopback hosts get `http`; punycode hosts are replaced
/// by the canonical host.
pub(crate) fn paste_url(headers: &HeaderMap, config: &Config, id: &str) -> String {
    let mut host = header_str(headers, header::HOST)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(config.canonical_host.as_str());
    let scheme = if host.contains(':') || is_loopback_host(host_without_port(host)) {
        "http"
    } else {
        "https"
    };
    if host.contains("xn--") && !config.canonical_host.is_empty() {
        host = config.canonical_host.as_str();
    }
    format!("{}://{}/{}", scheme, host, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn token_prefers_header_then_basic_auth() {
        assert_eq!(owner_token(&headers(&[("x-uuid", "ABC-def")])), "abc-def");
        // ":Secret" in base64.
        assert_eq!(
            owner_token(&headers(&[("authorization", "Basic OlNlY3JldA==")])),
            "secret"
        );
        assert_eq!(
            owner_token(&headers(&[
                ("x-uuid", "header"),
                ("authorization", "Basic OlNlY3JldA==")
            ])),
            "header"
        );
        assert_eq!(owner_token(&headers(&[("authorization", "Bearer xyz")])), "");
        assert_eq!(owner_token(&HeaderMap::new()), "");
    }

    #[test]
    fn disposition_filename_variants() {
        let cases = [
            ("attachment; filename=\"notes.txt\"", Some("notes.txt")),
            ("attachment; filename=plain.md", Some("plain.md")),
            ("inline; filename=\"a \\\"q\\\" b\"; size=3", Some("a \"q\" b")),
            (
                "attachment; filename=\"fallback\"; filename*=UTF-8''caf%C3%A9.txt",
                Some("café.txt"),
            ),
            ("attachment", None),
            ("attachment; filename=\"unterminated", None),
        ];
        for (value, expected) in cases {
            assert_eq!(
                parse_disposition_filename(value).as_deref(),
                expected,
                "value: {value}"
            );
        }
    }

    #[test]
    fn declared_length_parses_or_is_absent() {
        assert_eq!(content_length(&headers(&[("content-length", "42")])), Some(42));
        assert_eq!(content_length(&headers(&[("content-length", "nope")])), None);
        assert_eq!(content_length(&HeaderMap::new()), None);
    }

    #[test]
    fn paste_url_scheme_and_host() {
        let config = Config::default();
        assert_eq!(
            paste_url(&headers(&[("host", "waste.st")]), &config, "abc"),
            "https://waste.st/abc"
        );
        assert_eq!(
            paste_url(&headers(&[("host", "127.0.0.1:8666")]), &config, "abc"),
            "http://127.0.0.1:8666/abc"
        );
        assert_eq!(
            paste_url(&headers(&[("host", "localhost")]), &config, "abc"),
            "http://localhost/abc"
        );
        assert_eq!(
            paste_url(&headers(&[("host", "xn--108h.st")]), &config, "abc"),
            format!("https://{}/abc", config.canonical_host)
        );
    }

    #[test]
    fn blank_syntax_header_is_ignored() {
        assert_eq!(requested_syntax(&headers(&[("x-syntax", " ")])), None);
        assert_eq!(
            requested_syntax(&headers(&[("x-syntax", "rust")])),
            Some("rust".to_string())
        );
    }
}
