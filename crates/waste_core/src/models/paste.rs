//! Paste record model and its persisted JSON encoding.

use crate::constants::MAX_NAME_CHARS;
use crate::text::truncate_chars;
use serde::{Deserialize, Serialize};

/// A stored blob plus the metadata needed to serve and expire it.
///
/// The serialized form is a flat object with the keys `UUID`, `Name`, `Text`,
/// `Syntax` and `TS`. The id is the store key and is never written into the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paste {
    #[serde(skip)]
    pub id: String,
    /// Opaque owner credential, lower-cased. Empty means nobody may mutate the paste.
    #[serde(rename = "UUID", default)]
    pub owner_token: String,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Text", default, with = "base64_bytes")]
    pub content: Vec<u8>,
    /// Rendering hint: a language tag, `plain`, `ansi`, or empty for auto-detect.
    #[serde(rename = "Syntax", default)]
    pub syntax: String,
    /// Unix seconds; `0` marks a permanent paste.
    #[serde(rename = "TS", default)]
    pub created_at: i64,
}

impl Paste {
    /// Build a new paste stamped with `created_at`.
    ///
    /// The owner token is lower-cased and the name truncated to
    /// [`MAX_NAME_CHARS`] characters.
    pub fn new(
        id: impl Into<String>,
        owner_token: &str,
        name: &str,
        content: Vec<u8>,
        syntax: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            owner_token: owner_token.to_lowercase(),
            name: truncate_chars(name, MAX_NAME_CHARS).to_string(),
            content,
            syntax: syntax.into(),
            created_at,
        }
    }

    /// Build an unowned, permanent paste for administrative seeding.
    pub fn seeded(id: &str, name: &str, content: Vec<u8>, syntax: &str) -> Self {
        Self::new(id, "", name, content, syntax, 0)
    }

    /// Whether the expiry sweep must leave this paste alone.
    pub fn is_permanent(&self) -> bool {
        self.created_at == 0
    }

    /// Whether `token` proves ownership of this paste.
    ///
    /// Unowned pastes are never mutable, whatever token is presented.
    pub fn is_owned_by(&self, token: &str) -> bool {
        !self.owner_token.is_empty() && self.owner_token.to_lowercase() == token.to_lowercase()
    }

    /// Serialize the record value (without the id).
    ///
    /// # Errors
    /// Returns an error when JSON encoding fails.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Deserialize a record value stored under `id`.
    ///
    /// # Errors
    /// Returns an error when `bytes` is not a valid record.
    pub fn decode(id: &str, bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let mut paste: Paste = serde_json::from_slice(bytes)?;
        paste.id = id.to_string();
        Ok(paste)
    }

    /// Content as text, replacing invalid UTF-8.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}

/// Byte strings are stored as standard base64, with `null` meaning empty.
mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(encoded) => STANDARD
                .decode(encoded.as_bytes())
                .map_err(serde::de::Error::custom),
            None => Ok(Vec::new()),
        }
    }
}
