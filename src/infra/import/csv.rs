use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::types::Value as SqlValue;
use tracing::info;

use crate::infra::sqlite::schema::{
    create_table, ensure_parent_dir, open_connection, quote_ident, table_exists,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportResult {
    pub table: String,
    pub row_count: i64,
}

/// Integers and reals are stored as numbers so they order numerically;
/// everything else stays text.
fn typed_cell(raw: &str) -> SqlValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return SqlValue::Text(raw.to_string());
    }
    if let Ok(value) = trimmed.parse::<i64>() {
        return SqlValue::Integer(value);
    }
    if let Ok(value) = trimmed.parse::<f64>() {
        if value.is_finite() {
            return SqlValue::Real(value);
        }
    }
    SqlValue::Text(raw.to_string())
}

pub fn import_csv_to_sqlite(db_path: &Path, csv_path: &Path, table: &str) -> Result<ImportResult> {
    ensure_parent_dir(db_path)?;

    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open csv: {}", csv_path.display()))?;
    let headers = reader
        .headers()
        .with_context(|| format!("failed to read headers from csv: {}", csv_path.display()))?
        .clone();

    if headers.is_empty() {
        anyhow::bail!("csv header is required")
    }
    let columns: Vec<String> = headers.iter().map(str::to_string).collect();

    let mut conn = open_connection(db_path)?;
    if table_exists(&conn, table)? {
        anyhow::bail!("table already exists: {table}")
    }

    let tx = conn.transaction().context("failed to start transaction")?;
    create_table(&tx, table, &columns)?;

    let placeholders = std::iter::repeat_n("?", columns.len())
        .collect::<Vec<_>>()
        .join(", ");
    let mut insert_row = tx
        .prepare(&format!(
            "INSERT INTO {} VALUES ({placeholders})",
            quote_ident(table)
        ))
        .context("failed to prepare row insert")?;

    let mut row_count = 0_i64;
    for record in reader.records() {
        let record = record.context("failed to parse csv record")?;
        let values = (0..columns.len())
            .map(|col_idx| typed_cell(record.get(col_idx).unwrap_or("")))
            .collect::<Vec<_>>();
        insert_row
            .execute(rusqlite::params_from_iter(values))
            .context("failed to insert row")?;
        row_count += 1;
    }
    drop(insert_row);

    tx.commit().context("failed to commit import transaction")?;
    info!(table, row_count, source = %csv_path.display(), "imported csv");

    Ok(ImportResult {
        table: table.to_string(),
        row_count,
    })
}
