//! Content-type sniffing from leading bytes.
//!
//! Follows the WHATWG MIME sniffing table: the first matching signature wins,
//! otherwise the sample is classified as text or opaque binary.

/// Bytes inspected when sniffing.
pub const SNIFF_LEN: usize = 512;

/// Fallback type for unrecognized binary content.
pub const OCTET_STREAM: &str = "application/octet-stream";

const TEXT_UTF8: &str = "text/plain; charset=utf-8";
const HTML_UTF8: &str = "text/html; charset=utf-8";

/// HTML openers, matched case-insensitively after leading whitespace and
/// followed by a space or `>`.
const HTML_TAGS: &[&[u8]] = &[
    b"<!DOCTYPE HTML",
    b"<HTML",
    b"<HEAD",
    b"<SCRIPT",
    b"<IFRAME",
    b"<H1",
    b"<DIV",
    b"<FONT",
    b"<TABLE",
    b"<A",
    b"<STYLE",
    b"<TITLE",
    b"<B",
    b"<BODY",
    b"<BR",
    b"<P",
    b"<!--",
];

/// Exact leading-byte signatures, in precedence order.
const EXACT_PREFIXES: &[(&[u8], &str)] = &[
    (b"%PDF-", "application/pdf"),
    (b"%!PS-Adobe-", "application/postscript"),
    (b"\xFE\xFF", "text/plain; charset=utf-16be"),
    (b"\xFF\xFE", "text/plain; charset=utf-16le"),
    (b"\xEF\xBB\xBF", TEXT_UTF8),
    (b"\x00\x00\x01\x00", "image/x-icon"),
    (b"\x00\x00\x02\x00", "image/x-icon"),
    (b"BM", "image/bmp"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
];

const MEDIA_PREFIXES: &[(&[u8], &str)] = &[
    (b"\x89PNG\x0D\x0A\x1A\x0A", "image/png"),
    (b"\xFF\xD8\xFF", "image/jpeg"),
];

const AV_PREFIXES: &[(&[u8], &str)] = &[
    (b"ID3", "audio/mpeg"),
    (b"OggS\x00", "application/ogg"),
    (b"MThd\x00\x00\x00\x06", "audio/midi"),
];

const TRAILING_PREFIXES: &[(&[u8], &str)] = &[
    (b"\x1A\x45\xDF\xA3", "video/webm"),
    (b"\x00\x01\x00\x00", "font/ttf"),
    (b"OTTO", "font/otf"),
    (b"ttcf", "font/collection"),
    (b"wOFF", "font/woff"),
    (b"wOF2", "font/woff2"),
    (b"\x1F\x8B\x08", "application/x-gzip"),
    (b"PK\x03\x04", "application/zip"),
    (b"Rar!\x1A\x07\x00", "application/x-rar-compressed"),
    (b"Rar!\x1A\x07\x01\x00", "application/x-rar-compressed"),
    (b"\x00\x61\x73\x6D", "application/wasm"),
];

fn is_sniff_whitespace(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | b'\x0C' | b'\r' | b' ')
}

fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

fn matches_html_tag(data: &[u8], tag: &[u8]) -> bool {
    if data.len() < tag.len() + 1 {
        return false;
    }
    let body_matches = tag.iter().zip(data).all(|(&want, &have)| {
        if want.is_ascii_uppercase() {
            have & 0xDF == want
        } else {
            have == want
        }
    });
    body_matches && matches!(data[tag.len()], b' ' | b'>')
}

fn first_prefix(data: &[u8], table: &[(&[u8], &'static str)]) -> Option<&'static str> {
    table
        .iter()
        .find(|(prefix, _)| data.starts_with(prefix))
        .map(|(_, content_type)| *content_type)
}

/// `RIFF....<form>` and `FORM....<form>` containers.
fn is_chunk_container(data: &[u8], magic: &[u8; 4], form: &[u8]) -> bool {
    data.len() >= 8 + form.len() && data.starts_with(magic) && data[8..].starts_with(form)
}

fn is_mp4(data: &[u8]) -> bool {
    if data.len() < 12 {
        return false;
    }
    let box_size = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if data.len() < box_size || box_size % 4 != 0 || &data[4..8] != b"ftyp" {
        return false;
    }
    (8..box_size)
        .step_by(4)
        // Offset 12 holds the minor version, not a brand.
        .filter(|&offset| offset != 12)
        .any(|offset| data.get(offset..offset + 3) == Some(b"mp4".as_slice()))
}

/// Sniff the content type of `data`.
///
/// # Returns
/// A MIME type, with a charset parameter for text types. Unrecognized binary
/// content yields [`OCTET_STREAM`].
pub fn sniff_content_type(data: &[u8]) -> &'static str {
    let data = &data[..data.len().min(SNIFF_LEN)];
    let first_non_ws = data
        .iter()
        .position(|&b| !is_sniff_whitespace(b))
        .unwrap_or(data.len());
    let trimmed = &data[first_non_ws..];

    if HTML_TAGS.iter().any(|tag| matches_html_tag(trimmed, tag)) {
        return HTML_UTF8;
    }
    if trimmed.starts_with(b"<?xml") {
        return "text/xml; charset=utf-8";
    }
    if let Some(content_type) = first_prefix(data, EXACT_PREFIXES) {
        return content_type;
    }
    if is_chunk_container(data, b"RIFF", b"WEBPVP") {
        return "image/webp";
    }
    if let Some(content_type) = first_prefix(data, MEDIA_PREFIXES) {
        return content_type;
    }
    if is_chunk_container(data, b"FORM", b"AIFF") {
        return "audio/aiff";
    }
    if let Some(content_type) = first_prefix(data, AV_PREFIXES) {
        return content_type;
    }
    if is_chunk_container(data, b"RIFF", b"AVI ") {
        return "video/avi";
    }
    if is_chunk_container(data, b"RIFF", b"WAVE") {
        return "audio/wave";
    }
    if is_mp4(data) {
        return "video/mp4";
    }
    if let Some(content_type) = first_prefix(data, TRAILING_PREFIXES) {
        return content_type;
    }
    if !trimmed.iter().any(|&b| is_binary_byte(b)) {
        return TEXT_UTF8;
    }
    OCTET_STREAM
}

/// Media type without parameters, e.g. `text/plain` for `text/plain; charset=utf-8`.
pub fn media_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
}

/// Top-level type, e.g. `image` for `image/png`.
pub fn top_level_type(content_type: &str) -> &str {
    let media = media_type(content_type);
    media.split('/').next().unwrap_or(media)
}
