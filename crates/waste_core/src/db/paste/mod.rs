//! Paste storage operations backed by redb.

use crate::{db::tables::PASTES, error::AppError, models::paste::Paste};
use redb::{ReadableDatabase, ReadableTable};
use std::sync::Arc;

/// Accessor for the paste table.
///
/// Reads run on MVCC snapshots and never block; writers are serialized by redb,
/// so every method that mutates commits exactly one write transaction.
pub struct PasteDb {
    db: Arc<redb::Database>,
}

impl PasteDb {
    /// Create the paste table if it does not exist yet.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(PASTES)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Fetch the raw record value stored under `id`.
    ///
    /// # Returns
    /// `Ok(None)` when no record exists.
    ///
    /// # Errors
    /// Returns an error when storage access fails.
    pub fn get_raw(&self, id: &str) -> Result<Option<Vec<u8>>, AppError> {
        let read_txn = self.db.begin_read()?;
        let pastes = read_txn.open_table(PASTES)?;
        let value = pastes.get(id)?.map(|guard| guard.value().to_vec());
        Ok(value)
    }

    /// Fetch and decode a paste by id.
    ///
    /// # Returns
    /// `Ok(Some(paste))` when found, `Ok(None)` when missing.
    ///
    /// # Errors
    /// Returns an error when storage access or decoding fails.
    pub fn get(&self, id: &str) -> Result<Option<Paste>, AppError> {
        match self.get_raw(id)? {
            Some(bytes) => Ok(Some(Paste::decode(id, &bytes)?)),
            None => Ok(None),
        }
    }

    /// Fetch a paste, mapping a missing id to [`AppError::NotFound`].
    ///
    /// # Errors
    /// Returns [`AppError::NotFound`] or any storage error.
    pub fn require(&self, id: &str) -> Result<Paste, AppError> {
        self.get(id)?.ok_or(AppError::NotFound)
    }

    /// Whether a record exists under `id`.
    ///
    /// # Errors
    /// Returns an error when storage access fails.
    pub fn contains(&self, id: &str) -> Result<bool, AppError> {
        let read_txn = self.db.begin_read()?;
        let pastes = read_txn.open_table(PASTES)?;
        let exists = pastes.get(id)?.is_some();
        Ok(exists)
    }

    /// Insert or overwrite a paste.
    ///
    /// # Errors
    /// Returns an error when encoding or the write transaction fails.
    pub fn put(&self, paste: &Paste) -> Result<(), AppError> {
        let encoded = paste.encode()?;
        let write_txn = self.db.begin_write()?;
        {
            let mut pastes = write_txn.open_table(PASTES)?;
            pastes.insert(paste.id.as_str(), encoded.as_slice())?;
        }
        write_txn.commit()?;
        tracing::info!(id = %paste.id, size = paste.content.len(), "Saved paste");
        Ok(())
    }

    /// Insert a paste only if its id is still free.
    ///
    /// The existence check and the insert share one write transaction, so two
    /// creators racing for the same id cannot both succeed.
    ///
    /// # Returns
    /// `Ok(true)` when inserted, `Ok(false)` when the id was already taken.
    ///
    /// # Errors
    /// Returns an error when encoding or storage operations fail.
    pub fn insert_new(&self, paste: &Paste) -> Result<bool, AppError> {
        let encoded = paste.encode()?;
        let write_txn = self.db.begin_write()?;
        {
            let mut pastes = write_txn.open_table(PASTES)?;
            if pastes.get(paste.id.as_str())?.is_some() {
                return Ok(false);
            }
            pastes.insert(paste.id.as_str(), encoded.as_slice())?;
        }
        write_txn.commit()?;
        tracing::info!(id = %paste.id, size = paste.content.len(), "Created paste");
        Ok(true)
    }

    /// Read-modify-write one paste inside a single write transaction.
    ///
    /// `apply` sees the current record and may reject the change by returning an
    /// error, in which case nothing is written.
    ///
    /// # Returns
    /// `Ok(Some(paste))` with the stored result, `Ok(None)` when `id` is missing.
    ///
    /// # Errors
    /// Returns the error produced by `apply`, or any storage/encoding error.
    pub fn update<F>(&self, id: &str, apply: F) -> Result<Option<Paste>, AppError>
    where
        F: FnOnce(&mut Paste) -> Result<(), AppError>,
    {
        let write_txn = self.db.begin_write()?;
        let updated = {
            let mut pastes = write_txn.open_table(PASTES)?;
            let Some(old_guard) = pastes.get(id)? else {
                return Ok(None);
            };
            let mut paste = Paste::decode(id, old_guard.value())?;
            drop(old_guard);

            apply(&mut paste)?;

            let encoded = paste.encode()?;
            pastes.insert(id, encoded.as_slice())?;
            paste
        };
        write_txn.commit()?;
        tracing::info!(id = %id, size = updated.content.len(), "Updated paste");
        Ok(Some(updated))
    }

    /// Delete a paste by id.
    ///
    /// # Returns
    /// `true` when a row was deleted, otherwise `false`.
    ///
    /// # Errors
    /// Returns an error when storage access fails.
    pub fn delete(&self, id: &str) -> Result<bool, AppError> {
        let write_txn = self.db.begin_write()?;
        let deleted = {
            let mut pastes = write_txn.open_table(PASTES)?;
            let removed = pastes.remove(id)?.is_some();
            removed
        };
        write_txn.commit()?;
        if deleted {
            tracing::info!(id = %id, "Deleted paste");
        }
        Ok(deleted)
    }

    /// Delete a paste after `check` approves the current record.
    ///
    /// # Returns
    /// `Ok(Some(paste))` with the deleted record, `Ok(None)` when missing.
    ///
    /// # Errors
    /// Returns the error produced by `check`, or any storage/decoding error.
    pub fn delete_if<F>(&self, id: &str, check: F) -> Result<Option<Paste>, AppError>
    where
        F: FnOnce(&Paste) -> Result<(), AppError>,
    {
        let write_txn = self.db.begin_write()?;
        let deleted = {
            let mut pastes = write_txn.open_table(PASTES)?;
            let Some(old_guard) = pastes.get(id)? else {
                return Ok(None);
            };
            let paste = Paste::decode(id, old_guard.value())?;
            drop(old_guard);

            check(&paste)?;
            let _ = pastes.remove(id)?;
            paste
        };
        write_txn.commit()?;
        tracing::info!(id = %id, "Deleted paste");
        Ok(Some(deleted))
    }

    /// Delete every id in `ids` in one write transaction.
    ///
    /// Either all removals commit or none do. Ids that no longer exist are ignored.
    ///
    /// # Returns
    /// Number of rows actually removed.
    ///
    /// # Errors
    /// Returns an error when storage access or the commit fails.
    pub fn delete_batch(&self, ids: &[String]) -> Result<usize, AppError> {
        self.delete_batch_if(ids, |_, _| true)
    }

    /// Like [`Self::delete_batch`], but each row is re-read inside the write
    /// transaction and only removed while `still_matches` accepts its current
    /// value.
    ///
    /// # Errors
    /// Returns an error when storage access or the commit fails.
    pub fn delete_batch_if<F>(&self, ids: &[String], mut still_matches: F) -> Result<usize, AppError>
    where
        F: FnMut(&str, &[u8]) -> bool,
    {
        if ids.is_empty() {
            return Ok(0);
        }

        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut pastes = write_txn.open_table(PASTES)?;
            let mut removed = 0usize;
            for id in ids {
                let matches = match pastes.get(id.as_str())? {
                    Some(value) => still_matches(id, value.value()),
                    None => false,
                };
                if matches && pastes.remove(id.as_str())?.is_some() {
                    removed += 1;
                }
            }
            removed
        };
        write_txn.commit()?;
        Ok(removed)
    }

    /// Visit every `(id, raw value)` pair of one consistent read snapshot.
    ///
    /// Writes committed while the scan runs are not observed.
    ///
    /// # Errors
    /// Returns an error when storage access fails or `on_entry` fails.
    pub fn scan<F>(&self, mut on_entry: F) -> Result<(), AppError>
    where
        F: FnMut(&str, &[u8]) -> Result<(), AppError>,
    {
        let read_txn = self.db.begin_read()?;
        let pastes = read_txn.open_table(PASTES)?;
        for item in pastes.iter()? {
            let (key, value) = item?;
            on_entry(key.value(), value.value())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
