use std::ops::Range;

use thiserror::Error;

use crate::domain::entities::request::SortDirection;
use crate::usecase::ports::row::Row;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
    #[error("{0}")]
    Message(String),
}

/// One key of a multi-key ordering. `field` may be a dotted path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderKey {
    pub field: String,
    pub direction: SortDirection,
}

impl OrderKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Keeps records where any of `fields` contains `term`, ignoring case.
    Contains { fields: Vec<String>, term: String },
}

/// A lazily evaluated set of records, narrowed step by step before it is
/// fetched.
///
/// Every operation consumes the collection and returns a new view, so the
/// unfiltered collection is never mutated in place.
pub trait Collection: Sized {
    type Row: Row;

    fn count(&self) -> Result<usize, CollectionError>;
    fn filter(self, filter: &Filter) -> Result<Self, CollectionError>;
    /// Replaces any previous ordering with `keys`, earlier keys taking
    /// precedence.
    fn order_by(self, keys: &[OrderKey]) -> Result<Self, CollectionError>;
    /// Narrows to the half-open `range`, relative to the current view.
    fn slice(self, range: Range<usize>) -> Result<Self, CollectionError>;
    fn fetch(self) -> Result<Vec<Self::Row>, CollectionError>;
}

/// Provides the unfiltered collection a view starts every request from.
pub trait CollectionSource {
    type Collection: Collection;

    fn all(&self) -> Result<Self::Collection, CollectionError>;
}
