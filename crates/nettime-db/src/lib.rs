//! nettime-db - relational staging for netTime imports.
//!
//! A thin SQLite layer: rows are JSON objects, tables are created on first
//! insert, and [`Database::mark_importable`] hands a staged table to the
//! LIPS loader through its control table.

mod database;
mod error;
mod import;
mod value;

pub use database::{Database, IfExists, InsertOptions, SelectOptions};
pub use error::{DbError, DbResult};
pub use import::{EMPLOYEES_IMPORT_TABLE, EMPLOYEES_LIPS, EMPLOYEES_TABLE, ImportMark};
pub use value::Row;
