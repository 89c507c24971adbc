//! Size-adjusted retention and the expiry sweep.

use crate::config::Config;
use crate::constants::SECS_PER_DAY;
use crate::db::Database;
use crate::error::AppError;
use crate::models::paste::Paste;

/// Retention rules applied by [`sweep`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryPolicy {
    pub base_retention_secs: i64,
    /// Content bytes per day of retention lost; `0` disables the reduction.
    pub size_bias: usize,
    /// Size assumed for empty pastes when applying the bias.
    pub max_size: usize,
}

impl ExpiryPolicy {
    pub fn from_config(config: &Config) -> Self {
        let days = i64::try_from(config.expiry_days).unwrap_or(i64::MAX / SECS_PER_DAY);
        Self {
            base_retention_secs: days.saturating_mul(SECS_PER_DAY),
            size_bias: config.expiry_size_bias,
            max_size: config.max_paste_size,
        }
    }

    /// Retention in seconds for a body of `len` bytes.
    ///
    /// May be negative for very large bodies, which makes the paste eligible on
    /// the next sweep.
    pub fn retention_secs(&self, len: usize) -> i64 {
        if self.size_bias == 0 {
            return self.base_retention_secs;
        }
        let effective_len = if len == 0 { self.max_size } else { len };
        let bias_days = i64::try_from(effective_len / self.size_bias).unwrap_or(i64::MAX);
        self.base_retention_secs
            .saturating_sub(bias_days.saturating_mul(SECS_PER_DAY))
    }

    /// Whether `paste` should be removed at `now` (Unix seconds).
    pub fn is_expired(&self, paste: &Paste, now: i64) -> bool {
        if paste.is_permanent() {
            return false;
        }
        paste
            .created_at
            .saturating_add(self.retention_secs(paste.content.len()))
            <= now
    }
}

/// Counters from one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub scanned: usize,
    pub permanent: usize,
    pub undecodable: usize,
    pub expired: usize,
}

/// Delete every paste whose retention elapsed by `now`.
///
/// The whole table is scanned from one snapshot first; the collected ids are
/// then removed in a single batch that re-checks each row. A failure at any
/// point leaves the store untouched.
///
/// # Errors
/// Returns an error when the scan or the batch commit fails.
pub fn sweep(db: &Database, policy: &ExpiryPolicy, now: i64) -> Result<SweepReport, AppError> {
    let mut report = SweepReport::default();
    let mut expired_ids = Vec::new();

    db.pastes.scan(|id, raw| {
        report.scanned += 1;
        let paste = match Paste::decode(id, raw) {
            Ok(paste) => paste,
            Err(err) => {
                tracing::warn!(id = %id, "Skipping undecodable paste during expiry: {}", err);
                report.undecodable += 1;
                return Ok(());
            }
        };
        if paste.is_permanent() {
            report.permanent += 1;
        } else if policy.is_expired(&paste, now) {
            expired_ids.push(paste.id);
        }
        Ok(())
    })?;

    // A paste rewritten after the snapshot has a fresh timestamp and survives.
    report.expired = db.pastes.delete_batch_if(&expired_ids, |id, raw| {
        Paste::decode(id, raw).is_ok_and(|paste| policy.is_expired(&paste, now))
    })?;
    Ok(report)
}
