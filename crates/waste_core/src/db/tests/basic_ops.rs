//! Database open/share tests.

use super::*;

#[test]
fn new_creates_directory_and_redb_file() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("nested").join("db");
    let _db = Database::new(db_path.to_str().unwrap()).expect("open");
    assert!(db_path.join(crate::constants::REDB_FILE_NAME).exists());
}

#[test]
fn reopen_preserves_records() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("db");
    {
        let db = Database::new(db_path.to_str().unwrap()).unwrap();
        db.pastes.put(&sample("keep", 10)).unwrap();
    }
    let reopened = Database::new(db_path.to_str().unwrap()).unwrap();
    let paste = reopened.pastes.get("keep").unwrap().expect("persisted");
    assert_eq!(paste.content, b"content");
    assert_eq!(paste.created_at, 10);
}

#[test]
fn shared_handles_observe_each_others_writes() {
    let (db, _temp) = setup_test_db();
    let shared = db.share().expect("share");

    db.pastes.put(&sample("visible", 1)).unwrap();
    assert!(shared.pastes.contains("visible").unwrap());
    assert!(Arc::ptr_eq(&db.db, &shared.db));
}
