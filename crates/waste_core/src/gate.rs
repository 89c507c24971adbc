//! Content safety gate applied to every write before persistence.

use crate::detection::{detect_syntax, media_type, sniff_content_type};
use crate::error::AppError;
use std::io::Read;

/// Sniffed types rejected outright.
pub const REJECTED_ARCHIVE_TYPES: &[&str] = &[
    "application/zip",
    "application/x-rar-compressed",
    "application/x-gzip",
];

/// Native executable signatures rejected outright.
pub const REJECTED_EXECUTABLE_PREFIXES: &[&[u8]] = &[
    b"\x7FELF",
    b"MZ\x90\x00",
    b"MZ\x00\x00",
    b"\xFE\xED\xFA\xCE",
    b"\xFE\xED\xFA\xCF",
    b"\xCE\xFA\xED\xFE",
    b"\xCF\xFA\xED\xFE",
];

/// Hint value that asks for marker detection.
pub const AUTO_SYNTAX: &str = "auto";

/// Size and content checks for incoming paste bodies.
#[derive(Debug, Clone, Copy)]
pub struct ContentGate {
    max_size: usize,
}

impl ContentGate {
    pub fn new(max_size: usize) -> Self {
        Self { max_size }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Reject a declared body length above the limit before reading anything.
    ///
    /// # Errors
    /// Returns [`AppError::TooLarge`] when `declared` exceeds the limit.
    pub fn check_declared_length(&self, declared: Option<u64>) -> Result<(), AppError> {
        match declared {
            Some(len) if len > self.max_size as u64 => Err(self.too_large()),
            _ => Ok(()),
        }
    }

    /// Reject a body whose actual length exceeds the limit.
    ///
    /// # Errors
    /// Returns [`AppError::TooLarge`] when `len` exceeds the limit.
    pub fn check_size(&self, len: usize) -> Result<(), AppError> {
        if len > self.max_size {
            return Err(self.too_large());
        }
        Ok(())
    }

    /// Read at most `max + 1` bytes from `reader`.
    ///
    /// The extra byte distinguishes a body of exactly the limit from one that
    /// keeps going, whatever length was declared.
    ///
    /// # Errors
    /// Returns [`AppError::TooLarge`] when more than `max` bytes are available,
    /// or an I/O error from `reader`.
    pub fn read_capped<R: Read>(&self, reader: R) -> Result<Vec<u8>, AppError> {
        let mut body = Vec::new();
        reader
            .take(self.max_size as u64 + 1)
            .read_to_end(&mut body)?;
        self.check_size(body.len())?;
        Ok(body)
    }

    /// Incremental accumulator bound to this gate's limit.
    pub fn capped_body(&self) -> CappedBody {
        CappedBody::new(self.max_size)
    }

    /// Reject archives and native executables.
    ///
    /// # Errors
    /// Returns [`AppError::InvalidContent`] naming the rejected format.
    pub fn check_content(&self, body: &[u8]) -> Result<(), AppError> {
        let sniffed = media_type(sniff_content_type(body));
        if REJECTED_ARCHIVE_TYPES.contains(&sniffed) {
            return Err(AppError::InvalidContent(sniffed.to_string()));
        }
        if REJECTED_EXECUTABLE_PREFIXES
            .iter()
            .any(|prefix| body.starts_with(prefix))
        {
            return Err(AppError::InvalidContent("executable".to_string()));
        }
        Ok(())
    }

    /// Full validation of a complete body: size, then content.
    ///
    /// # Errors
    /// Returns [`AppError::TooLarge`] or [`AppError::InvalidContent`].
    pub fn inspect(&self, body: &[u8]) -> Result<(), AppError> {
        self.check_size(body.len())?;
        self.check_content(body)
    }

    fn too_large(&self) -> AppError {
        AppError::TooLarge {
            limit: self.max_size,
        }
    }
}

/// Resolve the stored syntax hint for a body.
///
/// An absent, empty or `auto` request runs marker detection; anything else is
/// kept as given. Detection that finds nothing leaves the hint empty.
pub fn resolve_syntax(requested: Option<&str>, body: &[u8]) -> String {
    match requested.map(str::trim) {
        Some(hint) if !hint.is_empty() && !hint.eq_ignore_ascii_case(AUTO_SYNTAX) => {
            hint.to_string()
        }
        _ => detect_syntax(body).unwrap_or_default().to_string(),
    }
}

/// Chunk accumulator that refuses to grow past a byte ceiling.
#[derive(Debug)]
pub struct CappedBody {
    max: usize,
    buf: Vec<u8>,
}

impl CappedBody {
    pub fn new(max: usize) -> Self {
        Self {
            max,
            buf: Vec::new(),
        }
    }

    /// Append a chunk.
    ///
    /// # Errors
    /// Returns [`AppError::TooLarge`] as soon as the total exceeds the ceiling;
    /// the chunk is not retained.
    pub fn push(&mut self, chunk: &[u8]) -> Result<(), AppError> {
        if self.buf.len() + chunk.len() > self.max {
            return Err(AppError::TooLarge { limit: self.max });
        }
        self.buf.extend_from_slice(chunk);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}
