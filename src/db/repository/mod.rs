//! Repository layer: table-scoped database operations.
//!
//! Each sub-module owns the SQL for one aggregate. Everything is
//! re-exported here so callers use `crate::db::*`.

mod appointment;
mod employee;
mod entity;
mod medicine;
mod patient;
mod prescription;
mod room;
mod user;
mod visit;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

use super::DatabaseError;

pub use appointment::*;
pub use employee::*;
pub use entity::*;
pub use medicine::*;
pub use patient::*;
pub use prescription::*;
pub use room::*;
pub use user::*;
pub use visit::*;

/// One column assignment for a partial update.
pub type ColumnChange = (&'static str, Value);

/// Storage format for timestamps: RFC 3339, second precision, `Z` suffix.
pub fn fmt_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| DatabaseError::InvalidDate {
            field: field.into(),
            value: value.into(),
        })
}

pub(crate) fn parse_optional_timestamp(
    field: &str,
    value: Option<String>,
) -> Result<Option<DateTime<Utc>>, DatabaseError> {
    value.map(|v| parse_timestamp(field, &v)).transpose()
}

pub(crate) fn parse_date(field: &str, value: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| DatabaseError::InvalidDate {
        field: field.into(),
        value: value.into(),
    })
}

/// JSON columns are advisory (translations); unparseable content reads as absent.
pub(crate) fn parse_json_column(value: Option<String>) -> Option<serde_json::Value> {
    value.and_then(|s| serde_json::from_str(&s).ok())
}

/// Write only the given columns of one row, stamping `updated_at`/`updated_by`.
///
/// `table` and column names come from code, never from request input.
/// Returns the number of rows touched (0 when the id does not exist).
pub fn update_columns(
    conn: &Connection,
    table: &'static str,
    id: i64,
    changes: &[ColumnChange],
    updated_by: Option<i64>,
) -> Result<usize, DatabaseError> {
    if changes.is_empty() {
        return Ok(0);
    }

    let mut assignments: Vec<String> = changes
        .iter()
        .enumerate()
        .map(|(i, (column, _))| format!("{column} = ?{}", i + 1))
        .collect();
    let mut values: Vec<Value> = changes.iter().map(|(_, v)| v.clone()).collect();

    assignments.push(format!("updated_at = ?{}", values.len() + 1));
    values.push(Value::Text(fmt_timestamp(&Utc::now())));
    assignments.push(format!("updated_by = ?{}", values.len() + 1));
    values.push(updated_by.map(Value::Integer).unwrap_or(Value::Null));
    values.push(Value::Integer(id));

    let sql = format!(
        "UPDATE {table} SET {} WHERE id = ?{}",
        assignments.join(", "),
        values.len()
    );

    let affected = conn
        .execute(&sql, params_from_iter(values))
        .map_err(DatabaseError::from_write)?;
    Ok(affected)
}

/// Text value for an optional column, NULL when absent.
pub fn optional_text(value: Option<String>) -> Value {
    value.map(Value::Text).unwrap_or(Value::Null)
}
