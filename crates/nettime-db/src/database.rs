//! SQLite-backed database helper.

use std::path::Path;

use rusqlite::{Connection, params_from_iter};
use tracing::{debug, instrument};

use crate::error::{DbError, DbResult};
use crate::value::{Row, quote_ident, to_json, to_sql};

/// SQLite's default cap on bound parameters per statement.
const MAX_VARIABLES: usize = 999;

/// What to do when the target table of an insert already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IfExists {
    /// Insert into the existing table.
    #[default]
    Append,
    /// Drop the table and recreate it from the rows.
    Replace,
    /// Refuse to insert.
    Fail,
}

/// Options for [`Database::insert_rows`].
#[derive(Debug, Clone, Default)]
pub struct InsertOptions {
    pub if_exists: IfExists,
    /// Rows per `INSERT` statement; derived from the column count if unset.
    pub chunk_size: Option<usize>,
}

/// Options for [`Database::select_from_table`].
#[derive(Debug, Clone)]
pub struct SelectOptions {
    /// Columns to select; empty selects `*`.
    pub fields: Vec<String>,
    /// Maximum number of rows; `None` returns all.
    pub top: Option<u32>,
    /// Raw SQL condition. Only pass trusted text.
    pub where_clause: Option<String>,
    pub group_by: Vec<String>,
}

impl Default for SelectOptions {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            top: Some(5),
            where_clause: None,
            group_by: Vec::new(),
        }
    }
}

/// A single connection to a SQLite database.
///
/// Rows travel as JSON objects keyed by column name, so data read from the
/// netTime API can be stored without an intermediate schema.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "Opened database");
        Ok(Self { conn })
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Names of the user tables, sorted.
    pub fn table_names(&self) -> DbResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Whether a table exists. `schema.table` is looked up in that schema.
    pub fn has_table(&self, table: &str) -> DbResult<bool> {
        quote_ident(table)?;
        let (master, name) = match table.split_once('.') {
            Some((schema, name)) => (format!("{}.sqlite_master", quote_ident(schema)?), name),
            None => ("sqlite_master".to_string(), table),
        };

        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {master} WHERE type = 'table' AND name = ?1"),
            [name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Run a query and return every row.
    #[instrument(skip(self))]
    pub fn query_rows(&self, sql: &str) -> DbResult<Vec<Row>> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let rows = stmt
            .query_map([], |row| {
                let mut record = Row::new();
                for (index, name) in columns.iter().enumerate() {
                    record.insert(name.clone(), to_json(row.get_ref(index)?));
                }
                Ok(record)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        debug!(rows = rows.len(), "Query returned");
        Ok(rows)
    }

    /// Build and run `SELECT [fields] FROM table [WHERE ..] [GROUP BY ..] [LIMIT top]`.
    pub fn select_from_table(&self, table: &str, options: &SelectOptions) -> DbResult<Vec<Row>> {
        let fields = if options.fields.is_empty() || options.fields.iter().any(|f| f == "*") {
            "*".to_string()
        } else {
            options
                .fields
                .iter()
                .map(|f| quote_ident(f))
                .collect::<DbResult<Vec<_>>>()?
                .join(", ")
        };

        let mut sql = format!("SELECT {} FROM {}", fields, quote_ident(table)?);
        if let Some(condition) = &options.where_clause {
            sql.push_str(&format!(" WHERE {condition}"));
        }
        if !options.group_by.is_empty() {
            let group_by = options
                .group_by
                .iter()
                .map(|g| quote_ident(g))
                .collect::<DbResult<Vec<_>>>()?
                .join(", ");
            sql.push_str(&format!(" GROUP BY {group_by}"));
        }
        if let Some(top) = options.top {
            sql.push_str(&format!(" LIMIT {top}"));
        }

        self.query_rows(&sql)
    }

    /// Insert rows in one transaction, creating the table when missing.
    ///
    /// Columns are the union of the rows' keys in order of first
    /// appearance; a key missing from a row is inserted as `NULL`.
    /// Returns the number of inserted rows.
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub fn insert_rows(&mut self, table: &str, rows: &[Row], options: &InsertOptions) -> DbResult<usize> {
        let quoted_table = quote_ident(table)?;

        let mut columns: Vec<&str> = Vec::new();
        for row in rows {
            for key in row.keys() {
                if !columns.contains(&key.as_str()) {
                    columns.push(key);
                }
            }
        }
        if columns.is_empty() {
            if rows.is_empty() {
                return Ok(0);
            }
            return Err(DbError::NoColumns(table.to_string()));
        }

        let quoted_columns = columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<DbResult<Vec<_>>>()?
            .join(", ");

        let exists = self.has_table(table)?;
        if exists && options.if_exists == IfExists::Fail {
            return Err(DbError::TableExists(table.to_string()));
        }

        let chunk_size = options
            .chunk_size
            .unwrap_or(MAX_VARIABLES / columns.len())
            .max(1);
        let placeholders = format!("({})", vec!["?"; columns.len()].join(", "));

        let tx = self.conn.transaction()?;
        if exists && options.if_exists == IfExists::Replace {
            tx.execute(&format!("DROP TABLE {quoted_table}"), [])?;
        }
        tx.execute(
            &format!("CREATE TABLE IF NOT EXISTS {quoted_table} ({quoted_columns})"),
            [],
        )?;

        for chunk in rows.chunks(chunk_size) {
            let sql = format!(
                "INSERT INTO {quoted_table} ({quoted_columns}) VALUES {}",
                vec![placeholders.as_str(); chunk.len()].join(", ")
            );
            let values = chunk.iter().flat_map(|row| {
                columns
                    .iter()
                    .map(move |column| row.get(*column).map_or(rusqlite::types::Value::Null, to_sql))
            });
            tx.execute(&sql, params_from_iter(values))?;
        }
        tx.commit()?;

        debug!(table, "Rows inserted");
        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn rows(values: Value) -> Vec<Row> {
        serde_json::from_value(values).unwrap()
    }

    #[test]
    fn insert_creates_table_and_reads_back() {
        let mut db = Database::open_in_memory().unwrap();
        let inserted = db
            .insert_rows(
                "PERSONAS",
                &rows(json!([{"ID": 1, "NIF": "A"}, {"ID": 2, "NIF": "B"}])),
                &InsertOptions::default(),
            )
            .unwrap();

        assert_eq!(inserted, 2);
        assert_eq!(db.table_names().unwrap(), vec!["PERSONAS".to_string()]);
        let back = db.query_rows("SELECT ID, NIF FROM PERSONAS ORDER BY ID").unwrap();
        assert_eq!(serde_json::to_value(back).unwrap(), json!([{"ID": 1, "NIF": "A"}, {"ID": 2, "NIF": "B"}]));
    }

    #[test]
    fn missing_keys_are_null() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_rows("T", &rows(json!([{"a": 1}, {"b": "x"}])), &InsertOptions::default())
            .unwrap();

        let back = db.query_rows("SELECT a, b FROM T").unwrap();
        assert_eq!(back[0]["b"], Value::Null);
        assert_eq!(back[1]["a"], Value::Null);
    }

    #[test]
    fn small_chunks_insert_everything() {
        let mut db = Database::open_in_memory().unwrap();
        let data: Vec<Row> = (0..7).map(|i| rows(json!([{"n": i}])).remove(0)).collect();
        let options = InsertOptions {
            chunk_size: Some(3),
            ..InsertOptions::default()
        };
        db.insert_rows("numbers", &data, &options).unwrap();

        let count = db.query_rows("SELECT COUNT(*) AS c FROM numbers").unwrap();
        assert_eq!(count[0]["c"], 7);
    }

    #[test]
    fn fail_and_replace_policies() {
        let mut db = Database::open_in_memory().unwrap();
        let data = rows(json!([{"v": 1}]));
        db.insert_rows("t", &data, &InsertOptions::default()).unwrap();

        let fail = InsertOptions {
            if_exists: IfExists::Fail,
            ..InsertOptions::default()
        };
        assert!(matches!(db.insert_rows("t", &data, &fail), Err(DbError::TableExists(_))));

        let replace = InsertOptions {
            if_exists: IfExists::Replace,
            ..InsertOptions::default()
        };
        db.insert_rows("t", &rows(json!([{"w": 2}])), &replace).unwrap();
        let back = db.query_rows("SELECT * FROM t").unwrap();
        assert_eq!(serde_json::to_value(back).unwrap(), json!([{"w": 2}]));
    }

    #[test]
    fn policies_apply_to_schema_qualified_names() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_rows("main.t", &rows(json!([{"v": 1}])), &InsertOptions::default())
            .unwrap();
        assert!(db.has_table("main.t").unwrap());
        assert!(!db.has_table("temp.t").unwrap());

        let fail = InsertOptions {
            if_exists: IfExists::Fail,
            ..InsertOptions::default()
        };
        let err = db.insert_rows("main.t", &rows(json!([{"v": 2}])), &fail).unwrap_err();
        assert!(matches!(err, DbError::TableExists(_)));

        let replace = InsertOptions {
            if_exists: IfExists::Replace,
            ..InsertOptions::default()
        };
        db.insert_rows("main.t", &rows(json!([{"v": 3}])), &replace).unwrap();
        let back = db.query_rows("SELECT v FROM t").unwrap();
        assert_eq!(serde_json::to_value(back).unwrap(), json!([{"v": 3}]));
    }

    #[test]
    fn empty_insert_is_a_no_op() {
        let mut db = Database::open_in_memory().unwrap();
        assert_eq!(db.insert_rows("t", &[], &InsertOptions::default()).unwrap(), 0);
        assert!(db.table_names().unwrap().is_empty());
    }

    #[test]
    fn select_builds_limited_query() {
        let mut db = Database::open_in_memory().unwrap();
        let data: Vec<Row> = (0..10)
            .map(|i| rows(json!([{"id": i, "dept": i % 2}])).remove(0))
            .collect();
        db.insert_rows("staff", &data, &InsertOptions::default()).unwrap();

        let top = db.select_from_table("staff", &SelectOptions::default()).unwrap();
        assert_eq!(top.len(), 5);

        let grouped = db
            .select_from_table(
                "staff",
                &SelectOptions {
                    fields: vec!["dept".into()],
                    top: None,
                    where_clause: Some("id > 1".into()),
                    group_by: vec!["dept".into()],
                },
            )
            .unwrap();
        assert_eq!(grouped.len(), 2);
    }

    #[test]
    fn select_rejects_bad_identifiers() {
        let db = Database::open_in_memory().unwrap();
        let err = db
            .select_from_table("staff; DROP TABLE x", &SelectOptions::default())
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidIdentifier(_)));
    }
}
