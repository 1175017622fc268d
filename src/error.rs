use thiserror::Error;

use crate::usecase::ports::collection::CollectionError;

#[derive(Debug, Error)]
pub enum DatatableError {
    /// The view was wired without a usable collection source, or its
    /// configuration could not be read.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A sort level referenced an order column that does not exist.
    #[error("order column out of range: {index} (order columns: {len})")]
    OrderColumnOutOfRange { index: i64, len: usize },

    #[error(transparent)]
    Collection(#[from] CollectionError),

    #[error("failed to serialize response: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DatatableError>;
