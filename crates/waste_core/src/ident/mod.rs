//! Random, collision-avoiding paste identifiers.
//!
//! Ids are random bytes rendered with a lowercase Crockford base-32 alphabet
//! (no padding). The alphabet is part of every published link, so it must never
//! change.

use crate::error::AppError;
use data_encoding::{Encoding, Specification};
use rand::rngs::OsRng;
use rand::RngCore;
use std::sync::OnceLock;

/// Lowercase Crockford base-32 alphabet (no `i`, `l`, `o`, `u`).
pub const ID_ALPHABET: &str = "0123456789abcdefghjkmnpqrstvwxyz";

/// Failed probes tolerated before the raw id length grows by one byte.
pub const PROBES_PER_LENGTH: usize = 32;

fn encoding() -> &'static Encoding {
    static ENCODING: OnceLock<Encoding> = OnceLock::new();
    ENCODING.get_or_init(|| {
        let mut spec = Specification::new();
        spec.symbols.push_str(ID_ALPHABET);
        spec.encoding()
            .expect("a 32-symbol alphabet is a valid base32 specification")
    })
}

/// Encode raw id bytes with [`ID_ALPHABET`].
pub fn encode_id(raw: &[u8]) -> String {
    encoding().encode(raw)
}

/// Allocates ids that were free in the store when probed.
///
/// Starts at `min_len` raw bytes and retries with fresh random bytes while the
/// probe reports the id as taken. Every [`PROBES_PER_LENGTH`] failures the
/// length grows by one byte, so short ids stay in use until they get crowded.
#[derive(Debug, Clone, Copy)]
pub struct IdAllocator {
    min_len: usize,
}

impl IdAllocator {
    /// Create an allocator with the given minimum raw length (at least 1 byte).
    pub fn new(min_len: usize) -> Self {
        Self {
            min_len: min_len.max(1),
        }
    }

    /// Minimum raw id length in bytes.
    pub fn min_len(&self) -> usize {
        self.min_len
    }

    /// Allocate an id using the operating system's random source.
    ///
    /// # Arguments
    /// - `is_taken`: Store probe returning `true` when an id already exists.
    ///
    /// # Errors
    /// Returns [`AppError::RandomSource`] when entropy cannot be obtained, or the
    /// probe's error.
    pub fn allocate<F>(&self, is_taken: F) -> Result<String, AppError>
    where
        F: FnMut(&str) -> Result<bool, AppError>,
    {
        self.allocate_with(&mut OsRng, is_taken)
    }

    /// Allocate an id drawing bytes from `rng`.
    ///
    /// # Errors
    /// Returns [`AppError::RandomSource`] when `rng` fails, or the probe's error.
    pub fn allocate_with<R, F>(&self, rng: &mut R, mut is_taken: F) -> Result<String, AppError>
    where
        R: RngCore + ?Sized,
        F: FnMut(&str) -> Result<bool, AppError>,
    {
        let mut len = self.min_len;
        let mut attempts = 0usize;
        loop {
            let mut raw = vec![0u8; len];
            rng.try_fill_bytes(&mut raw).map_err(|err| {
                tracing::error!("Random source failed during id allocation: {}", err);
                AppError::from(err)
            })?;
            let id = encode_id(&raw);
            if !is_taken(&id)? {
                if attempts >= PROBES_PER_LENGTH {
                    tracing::debug!(attempts, len, "Allocated id after collisions");
                }
                return Ok(id);
            }
            attempts += 1;
            if attempts % PROBES_PER_LENGTH == 0 {
                len += 1;
            }
        }
    }
}
