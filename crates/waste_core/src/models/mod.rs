//! Persisted data models.

/// Paste record and its serialized form.
pub mod paste;
