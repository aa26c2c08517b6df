//! Import hand-off to the LIPS loader.
//!
//! LIPS picks up staged tables by watching a control table. Staging is a
//! plain insert followed by one control row naming the table.

use chrono::Local;
use serde_json::Value;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::database::{Database, InsertOptions, SelectOptions};
use crate::error::{DbError, DbResult};
use crate::value::Row;

/// Default employee table read by [`Database::get_employees`].
pub const EMPLOYEES_TABLE: &str = "PERSONAS";

/// Default staging table for [`Database::import_employees`].
pub const EMPLOYEES_IMPORT_TABLE: &str = "AR_IMP_PERSONAL";

/// LIPS process name for employee imports.
pub const EMPLOYEES_LIPS: &str = "IMP_PERSONAL";

/// Describes the control row written by [`Database::mark_importable`].
#[derive(Debug, Clone)]
pub struct ImportMark {
    /// Identifier of the import; random when unset.
    pub hash: Option<String>,
    pub source: String,
    pub control_table: String,
}

impl Default for ImportMark {
    fn default() -> Self {
        Self {
            hash: None,
            source: "spec-utils".to_string(),
            control_table: "AR_DOWNCONF".to_string(),
        }
    }
}

fn random_hash() -> String {
    let mut hex = Uuid::new_v4().simple().to_string();
    hex.truncate(16);
    hex
}

impl Database {
    /// Queue `table` for import by the LIPS process `lips_name`.
    ///
    /// Returns the hash written to the control row.
    #[instrument(skip(self, mark), fields(control_table = %mark.control_table))]
    pub fn mark_importable(&mut self, table: &str, lips_name: &str, mark: &ImportMark) -> DbResult<String> {
        let hash = mark.hash.clone().unwrap_or_else(random_hash);
        let now = Local::now().naive_local().format("%Y-%m-%d %H:%M:%S%.6f").to_string();

        let mut row = Row::new();
        row.insert("DATE_TIME".into(), Value::String(now));
        row.insert("TABLE_NAME".into(), Value::from(table));
        row.insert("PARTIAL".into(), Value::Bool(true));
        row.insert("SOURCE".into(), Value::from(mark.source.as_str()));
        row.insert("LIPS".into(), Value::from(lips_name));
        row.insert("HASH".into(), Value::from(hash.as_str()));
        row.insert("END_TIME".into(), Value::Null);

        self.insert_rows(&mark.control_table, &[row], &InsertOptions::default())?;
        info!(table, lips_name, hash = %hash, "Import queued");
        Ok(hash)
    }

    /// Read employees from `table` (default [`EMPLOYEES_TABLE`]).
    pub fn get_employees(&self, table: Option<&str>, options: &SelectOptions) -> DbResult<Vec<Row>> {
        self.select_from_table(table.unwrap_or(EMPLOYEES_TABLE), options)
    }

    /// Stage employee rows and queue them for import.
    ///
    /// Returns the hash of the control row. No control row is written
    /// unless rows were staged.
    ///
    /// # Errors
    ///
    /// [`DbError::NoRows`] when `employees` is empty.
    pub fn import_employees(
        &mut self,
        employees: &[Row],
        table: Option<&str>,
        lips_name: Option<&str>,
        mark: &ImportMark,
    ) -> DbResult<String> {
        let table = table.unwrap_or(EMPLOYEES_IMPORT_TABLE);
        if employees.is_empty() {
            return Err(DbError::NoRows(table.to_string()));
        }
        self.insert_rows(table, employees, &InsertOptions::default())?;
        self.mark_importable(table, lips_name.unwrap_or(EMPLOYEES_LIPS), mark)
    }
}
