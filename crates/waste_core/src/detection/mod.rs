//! Content inspection: MIME sniffing and syntax hints.

/// Syntax hints from leading markers and shebangs.
pub mod magic;
/// MIME type sniffing.
pub mod sniff;
#[cfg(test)]
mod tests;

pub use magic::{detect_syntax, ANSI_SYNTAX};
pub use sniff::{media_type, sniff_content_type, top_level_type, OCTET_STREAM};
