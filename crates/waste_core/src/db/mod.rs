//! Database layer for paste records.

/// Paste storage helpers.
pub mod paste;
/// Table definitions.
pub mod tables;

use crate::constants::REDB_FILE_NAME;
use crate::error::AppError;
use std::path::Path;
use std::sync::Arc;

/// Database handle with access to the paste table.
///
/// Open once at startup and pass clones of the handle (via [`Database::share`])
/// to every component that needs storage.
pub struct Database {
    pub db: Arc<redb::Database>,
    pub pastes: paste::PasteDb,
}

impl Database {
    /// Open (or create) the database stored under the `path` directory.
    ///
    /// # Returns
    /// A fully initialized [`Database`].
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created, the file is held by
    /// another process, or table initialization fails.
    pub fn new(path: &str) -> Result<Self, AppError> {
        let dir = Path::new(path);
        std::fs::create_dir_all(dir)?;
        let file = dir.join(REDB_FILE_NAME);

        let db = redb::Database::create(&file).map_err(|err| match err {
            redb::DatabaseError::DatabaseAlreadyOpen => AppError::StorageMessage(format!(
                "Database {} is already open in another process.\n\
                 Stop the other instance or set DB_PATH to a different location.",
                file.display()
            )),
            other => other.into(),
        })?;
        tracing::debug!("Opened database at {}", file.display());

        Self::from_shared(Arc::new(db))
    }

    /// Build a database handle from an existing shared redb instance.
    ///
    /// # Errors
    /// Returns an error if the required tables cannot be opened.
    pub fn from_shared(db: Arc<redb::Database>) -> Result<Self, AppError> {
        Ok(Self {
            pastes: paste::PasteDb::new(db.clone())?,
            db,
        })
    }

    /// Clone this handle for another subsystem in the same process.
    ///
    /// # Errors
    /// Returns an error if table initialization fails.
    pub fn share(&self) -> Result<Self, AppError> {
        Self::from_shared(self.db.clone())
    }
}

#[cfg(test)]
mod tests;
