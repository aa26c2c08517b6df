//! Round trips through a database file.

use nettime_db::{Database, ImportMark, InsertOptions, Row, SelectOptions};
use serde_json::{Value, json};
use tempfile::TempDir;

fn employees() -> Vec<Row> {
    let Value::Array(items) = json!([
        {"NIF": "11111111H", "NAME": "Ana", "ACTIVE": true},
        {"NIF": "22222222J", "NAME": "Luis", "ACTIVE": false},
    ]) else {
        panic!("array literal");
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::Object(row) => row,
            other => panic!("expected object, got {other}"),
        })
        .collect()
}

#[test]
fn import_employees_persists_rows_and_control_entry() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("staging.db");

    let hash = {
        let mut db = Database::open(&path).unwrap();
        db.import_employees(&employees(), None, None, &ImportMark::default())
            .unwrap()
    };
    assert_eq!(hash.len(), 16);

    let db = Database::open(&path).unwrap();
    assert_eq!(
        db.table_names().unwrap(),
        vec!["AR_DOWNCONF".to_string(), "AR_IMP_PERSONAL".to_string()]
    );

    let staged = db
        .select_from_table(
            "AR_IMP_PERSONAL",
            &SelectOptions {
                fields: vec!["NAME".into(), "ACTIVE".into()],
                where_clause: Some("ACTIVE = 1".into()),
                ..SelectOptions::default()
            },
        )
        .unwrap();
    assert_eq!(staged.len(), 1);
    assert_eq!(staged[0]["NAME"], "Ana");

    let control = db
        .query_rows("SELECT TABLE_NAME, LIPS, HASH FROM AR_DOWNCONF")
        .unwrap();
    assert_eq!(control.len(), 1);
    assert_eq!(control[0]["TABLE_NAME"], "AR_IMP_PERSONAL");
    assert_eq!(control[0]["LIPS"], "IMP_PERSONAL");
    assert_eq!(control[0]["HASH"], hash.as_str());
}

#[test]
fn get_employees_reads_default_table() {
    let dir = TempDir::new().unwrap();
    let mut db = Database::open(dir.path().join("hr.db")).unwrap();
    db.insert_rows("PERSONAS", &employees(), &InsertOptions::default())
        .unwrap();

    let rows = db.get_employees(None, &SelectOptions::default()).unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|row| row.contains_key("NIF")));
}
