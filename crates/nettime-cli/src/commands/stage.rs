//! Stage-employees command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{Value, json};

use nettime_core::Query;
use nettime_db::{Database, EMPLOYEES_IMPORT_TABLE, EMPLOYEES_LIPS, ImportMark, Row};
use nettime_http::ElementsOptions;

use crate::cli::ConnectionArgs;
use crate::output;

#[derive(Args, Debug)]
pub struct StageEmployeesArgs {
    /// SQLite database file; created when missing
    #[arg(long)]
    pub db: PathBuf,

    /// Staging table
    #[arg(long, default_value = EMPLOYEES_IMPORT_TABLE)]
    pub table: String,

    /// LIPS process that imports the table
    #[arg(long, default_value = EMPLOYEES_LIPS)]
    pub lips: String,

    /// Field to copy; repeat for several
    #[arg(long = "field", default_values = ["id", "nif"])]
    pub fields: Vec<String>,

    /// Maximum number of employees to fetch
    #[arg(long, default_value_t = 50)]
    pub page_size: u32,
}

pub async fn run(args: &ConnectionArgs, cmd: StageEmployeesArgs, pretty: bool) -> Result<()> {
    let options = ElementsOptions {
        page_size: cmd.page_size,
        ..ElementsOptions::default()
    };

    let mut client = super::connect(args).await?;
    let result = client.get_employees(Query::new(&cmd.fields), &options).await;
    super::close(client).await;

    let employees = employee_rows(result.context("Failed to fetch employees")?);
    if employees.is_empty() {
        output::progress("No employees to stage");
        return output::json(&json!({"staged": 0, "hash": null}), pretty);
    }

    let mut db = Database::open(&cmd.db)
        .with_context(|| format!("Failed to open {}", cmd.db.display()))?;
    let hash = db
        .import_employees(&employees, Some(cmd.table.as_str()), Some(cmd.lips.as_str()), &ImportMark::default())
        .context("Failed to stage employees")?;

    output::success(&format!("Staged {} employees in {}", employees.len(), cmd.table));
    output::json(&json!({"staged": employees.len(), "hash": hash}), pretty)
}

/// Rows of an elements response, which is either `{"items": [..]}` or a bare array.
fn employee_rows(response: Value) -> Vec<Row> {
    let items = match response {
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        Value::Array(items) => items,
        _ => Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(row) => Some(row),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_from_paged_response() {
        let rows = employee_rows(json!({"total": 2, "items": [{"id": 1}, {"id": 2}]}));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["id"], 2);
    }

    #[test]
    fn rows_from_bare_array_skip_non_objects() {
        let rows = employee_rows(json!([{"id": 1}, 3, null]));
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn unexpected_shape_yields_nothing() {
        assert!(employee_rows(json!("oops")).is_empty());
        assert!(employee_rows(json!({"total": 0})).is_empty());
    }
}
