//! Server-side processing for DataTables-style table widgets.
//!
//! A [`DatatableView`] turns the widget's paging, sorting and search
//! parameters into operations on a [`Collection`], then renders the surviving
//! rows into the JSON payload the widget expects.

pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod usecase;

pub use domain::entities::config::{ColumnSpec, DatatableConfig, OrderColumn};
pub use domain::entities::request::{DatatableRequest, SortDirection, SortSpec};
pub use domain::entities::response::DatatableResponse;
pub use domain::entities::value::Value;
pub use error::{DatatableError, Result};
pub use infra::http::json::{JsonResponder, JsonResponse};
pub use infra::memory::collection::{VecCollection, VecSource};
pub use infra::memory::record::Record;
pub use infra::sqlite::collection::{SqliteCollection, SqliteTable};
pub use usecase::ports::collection::{
    Collection, CollectionError, CollectionSource, Filter, OrderKey,
};
pub use usecase::ports::row::{Related, Row};
pub use usecase::services::datatable::{Datatable, DatatableView};
