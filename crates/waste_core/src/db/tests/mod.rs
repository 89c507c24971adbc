//! Database integration tests.

use super::*;
use crate::models::paste::Paste;
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::TempDir;

fn setup_test_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("db");
    let db = Database::new(db_path.to_str().unwrap()).unwrap();
    (db, temp_dir)
}

fn sample(id: &str, created_at: i64) -> Paste {
    Paste::new(id, "owner", "sample", b"content".to_vec(), "", created_at)
}

mod basic_ops;
