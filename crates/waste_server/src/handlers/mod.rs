//! HTTP request handlers.

/// Paste mutation endpoints.
pub mod paste;
mod conditional;
pub(crate) mod request;
/// Page and raw read endpoints.
pub mod view;
