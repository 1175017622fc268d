use std::ops::Range;
use std::path::PathBuf;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::{Captures, Regex};
use rusqlite::types::Value as SqlValue;
use tracing::debug;

use crate::domain::entities::request::SortDirection;
use crate::domain::entities::value::Value;
use crate::infra::memory::record::Record;
use crate::infra::sqlite::schema::{open_connection, quote_ident, table_columns, table_exists};
use crate::usecase::ports::collection::{
    Collection, CollectionError, CollectionSource, Filter, OrderKey,
};

/// Column name suffix carrying the display label of the prefixed column,
/// e.g. `status_display` for `status`.
pub const DISPLAY_SUFFIX: &str = "_display";
/// Separator standing in for `.` in column names of joined views, e.g.
/// `author__name` for the path `author.name`.
pub const PATH_SEPARATOR: &str = "__";

const URL_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

impl From<SqlValue> for Value {
    fn from(value: SqlValue) -> Self {
        match value {
            SqlValue::Null => Value::Null,
            SqlValue::Integer(value) => Value::Integer(value),
            SqlValue::Real(value) => Value::Real(value),
            SqlValue::Text(value) => Value::Text(value),
            SqlValue::Blob(bytes) => Value::Text(String::from_utf8_lossy(&bytes).into_owned()),
        }
    }
}

fn collection_error(err: anyhow::Error) -> CollectionError {
    CollectionError::Message(format!("{err:#}"))
}

fn template_placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER
        .get_or_init(|| Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("static regex is valid"))
}

/// Fills `{column}` placeholders from the record's fields.
pub fn expand_url_template(template: &str, record: &Record) -> String {
    template_placeholder()
        .replace_all(template, |caps: &Captures<'_>| {
            let text = record.get(&caps[1]).map(Value::to_string).unwrap_or_default();
            utf8_percent_encode(&text, URL_SEGMENT).to_string()
        })
        .into_owned()
}

fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// A table or view in a SQLite database, queried fresh on every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteTable {
    db_path: PathBuf,
    table: String,
    url_template: Option<String>,
}

impl SqliteTable {
    pub fn new(db_path: impl Into<PathBuf>, table: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            table: table.into(),
            url_template: None,
        }
    }

    /// Gives every row a canonical URL such as `/people/{id}/`.
    pub fn with_url_template(mut self, template: impl Into<String>) -> Self {
        self.url_template = Some(template.into());
        self
    }

    fn open(&self) -> Result<SqliteCollection> {
        let conn = open_connection(&self.db_path)?;
        if !table_exists(&conn, &self.table)? {
            anyhow::bail!("table not found: {}", self.table)
        }
        let columns = table_columns(&conn, &self.table)?;

        Ok(SqliteCollection {
            db_path: self.db_path.clone(),
            table: self.table.clone(),
            columns,
            url_template: self.url_template.clone(),
            filters: Vec::new(),
            order: Vec::new(),
            offset: 0,
            limit: None,
        })
    }
}

impl CollectionSource for SqliteTable {
    type Collection = SqliteCollection;

    fn all(&self) -> Result<SqliteCollection, CollectionError> {
        self.open().map_err(collection_error)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Clause {
    sql: String,
    params: Vec<SqlValue>,
}

/// A query under construction. Nothing touches the database until
/// [`Collection::count`] or [`Collection::fetch`].
#[derive(Debug, Clone, PartialEq)]
pub struct SqliteCollection {
    db_path: PathBuf,
    table: String,
    columns: Vec<String>,
    url_template: Option<String>,
    filters: Vec<Clause>,
    order: Vec<(String, SortDirection)>,
    offset: usize,
    limit: Option<usize>,
}

impl SqliteCollection {
    fn column_for(&self, field: &str) -> Result<String> {
        let column = field.replace('.', PATH_SEPARATOR);
        if !self.columns.iter().any(|known| *known == column) {
            anyhow::bail!("unknown column {field} in {}", self.table)
        }
        Ok(column)
    }

    fn ensure_unsliced(&self, operation: &str) -> Result<()> {
        if self.offset > 0 || self.limit.is_some() {
            anyhow::bail!("cannot {operation} once a slice has been taken")
        }
        Ok(())
    }

    fn select_sql(&self, projection: &str) -> (String, Vec<SqlValue>) {
        let mut sql = format!("SELECT {projection} FROM {}", quote_ident(&self.table));
        let mut params = Vec::new();

        if !self.filters.is_empty() {
            let where_sql = self
                .filters
                .iter()
                .map(|clause| clause.sql.as_str())
                .collect::<Vec<_>>()
                .join(" AND ");
            sql.push_str(&format!(" WHERE {where_sql}"));
            for clause in &self.filters {
                params.extend(clause.params.iter().cloned());
            }
        }

        if !self.order.is_empty() {
            let order_sql = self
                .order
                .iter()
                .map(|(column, direction)| {
                    let direction = if direction.is_desc() { "DESC" } else { "ASC" };
                    format!("{} {direction}", quote_ident(column))
                })
                .collect::<Vec<_>>()
                .join(", ");
            sql.push_str(&format!(" ORDER BY {order_sql}"));
        }

        if self.limit.is_some() || self.offset > 0 {
            let limit = self
                .limit
                .map_or(-1, |limit| i64::try_from(limit).unwrap_or(i64::MAX));
            sql.push_str(" LIMIT ? OFFSET ?");
            params.push(SqlValue::Integer(limit));
            params.push(SqlValue::Integer(
                i64::try_from(self.offset).unwrap_or(i64::MAX),
            ));
        }

        (sql, params)
    }

    fn query_count(&self) -> Result<usize> {
        let (inner_sql, params) = self.select_sql("1");
        let sql = format!("SELECT COUNT(*) FROM ({inner_sql})");
        debug!(sql = %sql, params = params.len(), "sqlite.count");

        let conn = open_connection(&self.db_path)?;
        let count: i64 = conn
            .query_row(&sql, rusqlite::params_from_iter(params), |row| row.get(0))
            .with_context(|| format!("failed to count rows of {}", self.table))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    fn query_rows(&self) -> Result<Vec<Record>> {
        let (sql, params) = self.select_sql("*");
        debug!(sql = %sql, params = params.len(), "sqlite.fetch");

        let conn = open_connection(&self.db_path)?;
        let mut stmt = conn
            .prepare(&sql)
            .context("failed to prepare row query")?;
        let names: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut rows = stmt
            .query(rusqlite::params_from_iter(params))
            .context("failed to run row query")?;
        let mut records = Vec::new();
        while let Some(row) = rows.next().context("failed to read row")? {
            let mut record = Record::new();
            for (idx, name) in names.iter().enumerate() {
                let value: SqlValue = row
                    .get(idx)
                    .with_context(|| format!("failed to read column {name}"))?;
                self.store(&mut record, name, Value::from(value));
            }
            let url = self
                .url_template
                .as_deref()
                .map(|template| expand_url_template(template, &record));
            record.set_url(url);
            records.push(record);
        }

        Ok(records)
    }

    fn store(&self, record: &mut Record, name: &str, value: Value) {
        let labelled = name
            .strip_suffix(DISPLAY_SUFFIX)
            .filter(|column| self.columns.iter().any(|known| known == column));
        if let Some(column) = labelled {
            if !value.is_null() {
                record.set_label(column, value.to_string());
            }
        }

        if name.contains(PATH_SEPARATOR) {
            let segments: Vec<&str> = name.split(PATH_SEPARATOR).collect();
            record.set_path(&segments, value.clone());
        }
        record.set_field(name, value);
    }

    fn contains_clause(&self, fields: &[String], term: &str) -> Result<Clause> {
        if fields.is_empty() {
            return Ok(Clause {
                sql: "0".to_string(),
                params: Vec::new(),
            });
        }

        let pattern = like_pattern(term);
        let mut conditions = Vec::with_capacity(fields.len());
        let mut params = Vec::with_capacity(fields.len());
        for field in fields {
            let column = self.column_for(field)?;
            conditions.push(format!(
                "COALESCE(CAST({} AS TEXT), '') LIKE ? ESCAPE '\\'",
                quote_ident(&column)
            ));
            params.push(SqlValue::Text(pattern.clone()));
        }

        Ok(Clause {
            sql: format!("({})", conditions.join(" OR ")),
            params,
        })
    }
}

impl Collection for SqliteCollection {
    type Row = Record;

    fn count(&self) -> Result<usize, CollectionError> {
        self.query_count().map_err(collection_error)
    }

    fn filter(mut self, filter: &Filter) -> Result<Self, CollectionError> {
        self.ensure_unsliced("filter").map_err(collection_error)?;
        let clause = match filter {
            Filter::Contains { fields, term } => self.contains_clause(fields, term),
        }
        .map_err(collection_error)?;
        self.filters.push(clause);
        Ok(self)
    }

    fn order_by(mut self, keys: &[OrderKey]) -> Result<Self, CollectionError> {
        self.ensure_unsliced("reorder").map_err(collection_error)?;
        let mut order = Vec::with_capacity(keys.len());
        for key in keys {
            let column = self.column_for(&key.field).map_err(collection_error)?;
            order.push((column, key.direction));
        }
        self.order = order;
        Ok(self)
    }

    fn slice(mut self, range: Range<usize>) -> Result<Self, CollectionError> {
        let end = match self.limit {
            Some(limit) => range.end.min(limit),
            None => range.end,
        };
        let start = range.start.min(end);
        self.offset = self.offset.saturating_add(start);
        self.limit = Some(end - start);
        Ok(self)
    }

    fn fetch(self) -> Result<Vec<Record>, CollectionError> {
        self.query_rows().map_err(collection_error)
    }
}
