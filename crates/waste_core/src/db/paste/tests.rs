use crate::error::AppError;
use crate::models::paste::Paste;
use crate::test_support::setup_temp_db;

fn owned(id: &str, token: &str, body: &[u8]) -> Paste {
    Paste::new(id, token, "name", body.to_vec(), "", 100)
}

#[test]
fn put_get_delete_roundtrip() {
    let (db, _temp) = setup_temp_db();
    db.pastes.put(&owned("abc", "t", b"hello")).unwrap();

    let paste = db.pastes.get("abc").unwrap().expect("stored");
    assert_eq!(paste.id, "abc");
    assert_eq!(paste.content, b"hello");

    assert!(db.pastes.delete("abc").unwrap());
    assert!(!db.pastes.delete("abc").unwrap());
    assert!(db.pastes.get("abc").unwrap().is_none());
}

#[test]
fn require_maps_missing_to_not_found() {
    let (db, _temp) = setup_temp_db();
    assert!(matches!(db.pastes.require("nope"), Err(AppError::NotFound)));
}

#[test]
fn raw_value_does_not_embed_the_id() {
    let (db, _temp) = setup_temp_db();
    db.pastes.put(&owned("k3y", "t", b"x")).unwrap();
    let raw = db.pastes.get_raw("k3y").unwrap().expect("raw");
    let text = String::from_utf8(raw).unwrap();
    assert!(!text.contains("k3y"));
    assert!(text.contains("\"TS\":100"));
}

#[test]
fn insert_new_refuses_to_overwrite() {
    let (db, _temp) = setup_temp_db();
    assert!(db.pastes.insert_new(&owned("dup", "first", b"1")).unwrap());
    assert!(!db.pastes.insert_new(&owned("dup", "second", b"2")).unwrap());
    let stored = db.pastes.get("dup").unwrap().unwrap();
    assert_eq!(stored.owner_token, "first");
    assert_eq!(stored.content, b"1");
}

#[test]
fn update_rejection_leaves_record_untouched() {
    let (db, _temp) = setup_temp_db();
    db.pastes.put(&owned("u", "t", b"before")).unwrap();

    let err = db
        .pastes
        .update("u", |paste| {
            paste.content = b"after".to_vec();
            Err(AppError::Forbidden)
        })
        .expect_err("rejected update");
    assert!(matches!(err, AppError::Forbidden));
    assert_eq!(db.pastes.get("u").unwrap().unwrap().content, b"before");

    let updated = db
        .pastes
        .update("u", |paste| {
            paste.name = "renamed".to_string();
            Ok(())
        })
        .unwrap()
        .expect("exists");
    assert_eq!(updated.name, "renamed");
    assert!(db.pastes.update("missing", |_| Ok(())).unwrap().is_none());
}

#[test]
fn delete_if_checks_before_removing() {
    let (db, _temp) = setup_temp_db();
    db.pastes.put(&owned("d", "t", b"x")).unwrap();

    let err = db
        .pastes
        .delete_if("d", |_| Err(AppError::Forbidden))
        .expect_err("check fails");
    assert!(matches!(err, AppError::Forbidden));
    assert!(db.pastes.contains("d").unwrap());

    let deleted = db.pastes.delete_if("d", |_| Ok(())).unwrap();
    assert_eq!(deleted.map(|paste| paste.id), Some("d".to_string()));
    assert!(db.pastes.delete_if("d", |_| Ok(())).unwrap().is_none());
}

#[test]
fn delete_batch_removes_all_listed_ids_and_skips_missing() {
    let (db, _temp) = setup_temp_db();
    for id in ["a", "b", "c"] {
        db.pastes.put(&owned(id, "t", b"x")).unwrap();
    }

    let removed = db
        .pastes
        .delete_batch(&["a".to_string(), "c".to_string(), "gone".to_string()])
        .unwrap();
    assert_eq!(removed, 2);
    assert!(db.pastes.contains("b").unwrap());
    assert!(!db.pastes.contains("a").unwrap());
    assert_eq!(db.pastes.delete_batch(&[]).unwrap(), 0);
}

#[test]
fn delete_batch_if_rechecks_current_values() {
    let (db, _temp) = setup_temp_db();
    db.pastes.put(&owned("stale", "t", b"old")).unwrap();
    db.pastes.put(&owned("kept", "t", b"rewritten")).unwrap();

    let removed = db
        .pastes
        .delete_batch_if(&["stale".to_string(), "kept".to_string()], |id, raw| {
            Paste::decode(id, raw).unwrap().content == b"old"
        })
        .unwrap();
    assert_eq!(removed, 1);
    assert!(!db.pastes.contains("stale").unwrap());
    assert!(db.pastes.contains("kept").unwrap());
}

#[test]
fn scan_visits_every_key_in_order() {
    let (db, _temp) = setup_temp_db();
    for id in ["b", "a", "c"] {
        db.pastes.put(&owned(id, "t", id.as_bytes())).unwrap();
    }

    let mut seen = Vec::new();
    db.pastes
        .scan(|id, raw| {
            let paste = Paste::decode(id, raw)?;
            seen.push((id.to_string(), paste.content));
            Ok(())
        })
        .unwrap();
    assert_eq!(
        seen,
        vec![
            ("a".to_string(), b"a".to_vec()),
            ("b".to_string(), b"b".to_vec()),
            ("c".to_string(), b"c".to_vec()),
        ]
    );
}
