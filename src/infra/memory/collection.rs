use std::cmp::Ordering;
use std::ops::Range;

use crate::usecase::ports::collection::{
    Collection, CollectionError, CollectionSource, Filter, OrderKey,
};
use crate::usecase::ports::row::Row;

/// A collection held in memory. Ordering is a stable sort, so rows that tie
/// on every key keep their source order.
#[derive(Debug, Clone, PartialEq)]
pub struct VecCollection<R> {
    rows: Vec<R>,
}

impl<R: Row> VecCollection<R> {
    pub fn new(rows: Vec<R>) -> Self {
        Self { rows }
    }

    fn matches(row: &R, filter: &Filter) -> bool {
        match filter {
            Filter::Contains { fields, term } => {
                let needle = term.to_lowercase();
                fields
                    .iter()
                    .any(|field| row.path(field).to_string().to_lowercase().contains(&needle))
            }
        }
    }

    fn compare(left: &R, right: &R, keys: &[OrderKey]) -> Ordering {
        for key in keys {
            let ordering = left.path(&key.field).sort_cmp(&right.path(&key.field));
            let ordering = if key.direction.is_desc() {
                ordering.reverse()
            } else {
                ordering
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

impl<R: Row> Collection for VecCollection<R> {
    type Row = R;

    fn count(&self) -> Result<usize, CollectionError> {
        Ok(self.rows.len())
    }

    fn filter(mut self, filter: &Filter) -> Result<Self, CollectionError> {
        self.rows.retain(|row| Self::matches(row, filter));
        Ok(self)
    }

    fn order_by(mut self, keys: &[OrderKey]) -> Result<Self, CollectionError> {
        self.rows.sort_by(|left, right| Self::compare(left, right, keys));
        Ok(self)
    }

    fn slice(mut self, range: Range<usize>) -> Result<Self, CollectionError> {
        let end = range.end.min(self.rows.len());
        let start = range.start.min(end);
        self.rows.truncate(end);
        self.rows.drain(..start);
        Ok(self)
    }

    fn fetch(self) -> Result<Vec<R>, CollectionError> {
        Ok(self.rows)
    }
}

/// Serves a fresh copy of the same rows for every request.
#[derive(Debug, Clone, PartialEq)]
pub struct VecSource<R> {
    rows: Vec<R>,
}

impl<R: Row + Clone> VecSource<R> {
    pub fn new(rows: Vec<R>) -> Self {
        Self { rows }
    }
}

impl<R: Row + Clone> CollectionSource for VecSource<R> {
    type Collection = VecCollection<R>;

    fn all(&self) -> Result<VecCollection<R>, CollectionError> {
        Ok(VecCollection::new(self.rows.clone()))
    }
}
