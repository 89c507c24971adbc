//! Ownership-gated create, update, rename and delete.
//!
//! Writes run in two phases so that everything decidable from the request head
//! (declared size, target, ownership, deletes) is settled before the body is
//! read. [`PasteMutator::begin`] returns either a finished outcome or a
//! [`PendingWrite`] that [`PasteMutator::finish`] completes once the capped
//! body is available.

use crate::config::Config;
use crate::constants::MAX_NAME_CHARS;
use crate::db::Database;
use crate::error::AppError;
use crate::gate::{resolve_syntax, ContentGate};
use crate::ident::IdAllocator;
use crate::models::paste::Paste;
use crate::text::truncate_chars;

/// Mutating request verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMethod {
    Post,
    Put,
    Delete,
}

/// Request head of a write, as extracted by the transport layer.
#[derive(Debug, Clone)]
pub struct WriteRequest {
    pub method: WriteMethod,
    /// Path segment naming the paste; empty for the root.
    pub target: String,
    /// Presented owner token; empty when none was sent.
    pub token: String,
    /// Display name from the request, if any.
    pub name: String,
    pub declared_len: Option<u64>,
    pub syntax: Option<String>,
}

impl WriteRequest {
    pub fn new(method: WriteMethod, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            token: String::new(),
            name: String::new(),
            declared_len: None,
            syntax: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_declared_len(mut self, len: Option<u64>) -> Self {
        self.declared_len = len;
        self
    }

    pub fn with_syntax(mut self, syntax: Option<String>) -> Self {
        self.syntax = syntax;
        self
    }
}

/// Result of a completed mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Created(Paste),
    Updated(Paste),
    Renamed(Paste),
    Deleted(Paste),
}

impl WriteOutcome {
    pub fn paste(&self) -> &Paste {
        match self {
            Self::Created(paste)
            | Self::Updated(paste)
            | Self::Renamed(paste)
            | Self::Deleted(paste) => paste,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Fresh,
    Existing(String),
}

/// A write that passed every head check and now needs its body.
#[derive(Debug, Clone)]
pub struct PendingWrite {
    target: Target,
    token: String,
    name: String,
    syntax: Option<String>,
}

impl PendingWrite {
    /// Id of the paste being replaced, or `None` when a new id will be allocated.
    pub fn existing_id(&self) -> Option<&str> {
        match &self.target {
            Target::Fresh => None,
            Target::Existing(id) => Some(id.as_str()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Outcome of [`PasteMutator::begin`].
#[derive(Debug)]
pub enum WriteStep {
    Done(WriteOutcome),
    NeedBody(PendingWrite),
}

/// Applies write requests to the paste store.
pub struct PasteMutator<'a> {
    db: &'a Database,
    gate: ContentGate,
    allocator: IdAllocator,
}

fn ensure_owner(paste: &Paste, token: &str) -> Result<(), AppError> {
    if paste.is_owned_by(token) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

impl<'a> PasteMutator<'a> {
    pub fn new(db: &'a Database, gate: ContentGate, allocator: IdAllocator) -> Self {
        Self {
            db,
            gate,
            allocator,
        }
    }

    pub fn from_config(db: &'a Database, config: &Config) -> Self {
        Self::new(
            db,
            ContentGate::new(config.max_paste_size),
            IdAllocator::new(config.id_size_min),
        )
    }

    pub fn gate(&self) -> &ContentGate {
        &self.gate
    }

    /// Settle everything that does not need the body.
    ///
    /// # Returns
    /// [`WriteStep::Done`] for deletes, otherwise [`WriteStep::NeedBody`].
    ///
    /// # Errors
    /// - [`AppError::TooLarge`] when the declared length exceeds the limit.
    /// - [`AppError::Locked`] for a delete of the root.
    /// - [`AppError::NotFound`] for an unknown id, except on PUT.
    /// - [`AppError::Forbidden`] when the token does not own the paste.
    pub fn begin(&self, request: WriteRequest) -> Result<WriteStep, AppError> {
        self.gate.check_declared_length(request.declared_len)?;

        let raw_target = request.target.trim_matches('/');
        let id = raw_target.to_lowercase();
        let mut name = truncate_chars(request.name.trim(), MAX_NAME_CHARS).to_string();

        if id.is_empty() {
            if request.method == WriteMethod::Delete {
                return Err(AppError::Locked("the root paste cannot be deleted".to_string()));
            }
            return Ok(WriteStep::NeedBody(PendingWrite {
                target: Target::Fresh,
                token: request.token,
                name,
                syntax: request.syntax,
            }));
        }

        let Some(existing) = self.db.pastes.get(&id)? else {
            if request.method != WriteMethod::Put {
                return Err(AppError::NotFound);
            }
            if name.is_empty() {
                name = truncate_chars(raw_target, MAX_NAME_CHARS).to_string();
            }
            return Ok(WriteStep::NeedBody(PendingWrite {
                target: Target::Fresh,
                token: request.token,
                name,
                syntax: request.syntax,
            }));
        };

        ensure_owner(&existing, &request.token)?;

        if request.method == WriteMethod::Delete {
            let deleted = self
                .db
                .pastes
                .delete_if(&id, |current| ensure_owner(current, &request.token))?
                .ok_or(AppError::NotFound)?;
            return Ok(WriteStep::Done(WriteOutcome::Deleted(deleted)));
        }

        Ok(WriteStep::NeedBody(PendingWrite {
            target: Target::Existing(id),
            token: request.token,
            name,
            syntax: request.syntax,
        }))
    }

    /// Validate the body and persist the pending write.
    ///
    /// # Errors
    /// - [`AppError::TooLarge`] or [`AppError::InvalidContent`] from the gate.
    /// - [`AppError::NotFound`] when the target vanished since [`Self::begin`].
    /// - [`AppError::Forbidden`] when ownership changed since [`Self::begin`].
    /// - [`AppError::RandomSource`] when no id can be allocated.
    pub fn finish(&self, pending: PendingWrite, body: Vec<u8>) -> Result<WriteOutcome, AppError> {
        self.gate.inspect(&body)?;

        let PendingWrite {
            target,
            token,
            name,
            syntax,
        } = pending;

        let id = match target {
            Target::Fresh => {
                let syntax = resolve_syntax(syntax.as_deref(), &body);
                return self
                    .create(&token, &name, body, syntax)
                    .map(WriteOutcome::Created);
            }
            Target::Existing(id) => id,
        };

        if body.is_empty() && !name.is_empty() {
            let renamed = self
                .db
                .pastes
                .update(&id, |paste| {
                    ensure_owner(paste, &token)?;
                    paste.name = name;
                    Ok(())
                })?
                .ok_or(AppError::NotFound)?;
            return Ok(WriteOutcome::Renamed(renamed));
        }

        let syntax = resolve_syntax(syntax.as_deref(), &body);
        let updated = self
            .db
            .pastes
            .update(&id, |paste| {
                ensure_owner(paste, &token)?;
                paste.content = body;
                paste.name = name;
                paste.syntax = syntax;
                paste.created_at = now_unix();
                Ok(())
            })?
            .ok_or(AppError::NotFound)?;
        Ok(WriteOutcome::Updated(updated))
    }

    /// Run both phases with an in-memory body.
    ///
    /// # Errors
    /// Any error from [`Self::begin`] or [`Self::finish`].
    pub fn apply(&self, request: WriteRequest, body: Vec<u8>) -> Result<WriteOutcome, AppError> {
        match self.begin(request)? {
            WriteStep::Done(outcome) => Ok(outcome),
            WriteStep::NeedBody(pending) => self.finish(pending, body),
        }
    }

    fn create(
        &self,
        token: &str,
        name: &str,
        body: Vec<u8>,
        syntax: String,
    ) -> Result<Paste, AppError> {
        let mut paste = Paste::new(String::new(), token, name, body, syntax, now_unix());
        loop {
            paste.id = self
                .allocator
                .allocate(|candidate| self.db.pastes.contains(candidate))?;
            if self.db.pastes.insert_new(&paste)? {
                return Ok(paste);
            }
            tracing::debug!(id = %paste.id, "Allocated id was taken before insert; retrying");
        }
    }
}
