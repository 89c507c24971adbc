//! Shared constants used across waste crates.

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8666;

/// Default maximum paste size accepted on write.
pub const DEFAULT_MAX_PASTE_SIZE: usize = 32 * 1024 * 1024;

/// Default minimum identifier size in raw bytes, before encoding.
pub const DEFAULT_ID_SIZE_MIN: usize = 3;

/// Default base retention in days.
pub const DEFAULT_EXPIRY_DAYS: u64 = 256;

/// Default number of content bytes that shave one day off the retention.
pub const DEFAULT_EXPIRY_SIZE_BIAS: usize = 128 * 1024;

/// Default delay between expiry sweeps.
pub const DEFAULT_EXPIRY_INTERVAL_SECS: u64 = 3 * 60 * 60;

/// Host substituted for punycode request hosts when building paste URLs.
pub const DEFAULT_CANONICAL_HOST: &str = "🗑️.st";

/// Referer hosts allowed to link raw content directly.
pub const DEFAULT_TRUSTED_HOSTS: &[&str] = &["waste.st", "xn--108h.st", "localhost:8666"];

/// Maximum display name length, in characters.
pub const MAX_NAME_CHARS: usize = 256;

/// Bodies at or above this size are never passed to the highlighter.
pub const RENDER_SIZE_LIMIT: usize = 1024 * 1024;

/// Media above this size is linked instead of embedded as base64.
pub const INLINE_EMBED_LIMIT: usize = 256 * 1024;

/// Seeded paste that cross-origin raw requests are redirected to.
pub const LANDING_ID: &str = "bin";

/// Seeded manual page served to plain clients on `/`.
pub const MANUAL_ID: &str = "waste.1";

/// Seconds in one day of retention.
pub const SECS_PER_DAY: i64 = 24 * 60 * 60;

/// File name for the redb database within the configured DB directory.
pub const REDB_FILE_NAME: &str = "data.redb";
