//! Core of the waste paste service: storage, record model, identifiers, write
//! authority, content safety, expiry and delivery decisions.

/// Configuration loading and defaults.
pub mod config;
/// Shared defaults and limits.
pub mod constants;
/// Database access layer.
pub mod db;
/// Read-side delivery selection.
pub mod delivery;
/// MIME sniffing and syntax hints.
pub mod detection;
/// Application error types (storage/domain).
pub mod error;
/// Size-adjusted retention and the expiry sweep.
pub mod expiry;
/// Size and content checks for writes.
pub mod gate;
/// Identifier encoding and allocation.
pub mod ident;
/// Data models for persistence.
pub mod models;
/// Ownership-gated writes.
pub mod mutation;
/// Text and host helpers.
pub mod text;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use constants::{DEFAULT_PORT, LANDING_ID, MANUAL_ID};
pub use db::Database;
pub use error::AppError;
pub use models::paste::Paste;
