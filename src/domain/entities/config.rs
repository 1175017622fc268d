use std::fmt;

use serde::Deserialize;

use crate::error::DatatableError;

pub const DEFAULT_MAX_DISPLAY_LENGTH: usize = 100;

/// A rendered column: a direct field name or a dotted path through related
/// rows (`author.name`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct ColumnSpec(String);

impl ColumnSpec {
    pub fn new(name: impl Into<String>) -> Self {
        ColumnSpec(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_path(&self) -> bool {
        self.0.contains('.')
    }
}

impl fmt::Display for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ColumnSpec {
    fn from(value: &str) -> Self {
        ColumnSpec::new(value)
    }
}

impl From<String> for ColumnSpec {
    fn from(value: String) -> Self {
        ColumnSpec(value)
    }
}

/// Sortable field(s) behind one orderable column index.
///
/// `Fields` lets one display column order by several physical keys, in the
/// listed order, all taking the direction requested for the column.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OrderColumn {
    Field(String),
    Fields(Vec<String>),
}

impl OrderColumn {
    pub fn fields(&self) -> &[String] {
        match self {
            OrderColumn::Field(field) => std::slice::from_ref(field),
            OrderColumn::Fields(fields) => fields,
        }
    }
}

impl From<&str> for OrderColumn {
    fn from(value: &str) -> Self {
        OrderColumn::Field(value.to_string())
    }
}

impl<const N: usize> From<[&str; N]> for OrderColumn {
    fn from(value: [&str; N]) -> Self {
        OrderColumn::Fields(value.iter().map(|field| field.to_string()).collect())
    }
}

/// Immutable per-view configuration, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatatableConfig {
    pub columns: Vec<ColumnSpec>,
    pub order_columns: Vec<OrderColumn>,
    /// Server-side ceiling on rows per page, whatever the client asks for.
    pub max_display_length: usize,
    /// Fields matched by the global `search[value]` term. Empty disables
    /// searching.
    pub searchable_columns: Vec<String>,
}

impl Default for DatatableConfig {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            order_columns: Vec::new(),
            max_display_length: DEFAULT_MAX_DISPLAY_LENGTH,
            searchable_columns: Vec::new(),
        }
    }
}

impl DatatableConfig {
    pub fn new<C, O>(columns: C, order_columns: O) -> Self
    where
        C: IntoIterator,
        C::Item: Into<ColumnSpec>,
        O: IntoIterator,
        O::Item: Into<OrderColumn>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            order_columns: order_columns.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_max_display_length(mut self, max_display_length: usize) -> Self {
        self.max_display_length = max_display_length;
        self
    }

    pub fn with_searchable_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.searchable_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn from_toml_str(source: &str) -> Result<Self, DatatableError> {
        toml::from_str(source).map_err(|err| {
            DatatableError::Configuration(format!("invalid datatable config: {err}"))
        })
    }
}
