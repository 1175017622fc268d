use std::ops::Range;

use tracing::{debug, debug_span};

use crate::domain::entities::config::{ColumnSpec, DatatableConfig, OrderColumn};
use crate::domain::entities::request::{
    DatatableRequest, DEFAULT_PAGE_LENGTH, UNLIMITED_PAGE_LENGTH,
};
use crate::domain::entities::response::DatatableResponse;
use crate::domain::entities::value::Value;
use crate::error::{DatatableError, Result};
use crate::usecase::ports::collection::{Collection, CollectionSource, Filter, OrderKey};
use crate::usecase::services::render;

/// Answers table widget requests: count, filter, order, page and render.
///
/// Each step is a provided method so a view can override just the part it
/// needs; only [`DatatableView::config`] and
/// [`DatatableView::initial_collection`] must be written.
pub trait DatatableView {
    type Collection: Collection;

    fn config(&self) -> &DatatableConfig;

    /// Runs before anything else for each request.
    fn initialize(&self, _request: &DatatableRequest) -> Result<()> {
        Ok(())
    }

    fn initial_collection(&self) -> Result<Self::Collection>;

    fn columns(&self) -> &[ColumnSpec] {
        &self.config().columns
    }

    fn order_columns(&self) -> &[OrderColumn] {
        &self.config().order_columns
    }

    /// Identity unless searchable columns are configured and the request
    /// carries a search term.
    fn filter_collection(
        &self,
        collection: Self::Collection,
        request: &DatatableRequest,
    ) -> Result<Self::Collection> {
        let searchable = &self.config().searchable_columns;
        let term = request.search.trim();
        if searchable.is_empty() || term.is_empty() {
            return Ok(collection);
        }

        debug!(term, fields = ?searchable, "filtering by search term");
        let filter = Filter::Contains {
            fields: searchable.clone(),
            term: term.to_string(),
        };
        Ok(collection.filter(&filter)?)
    }

    /// Translates the requested sort levels into collection order keys.
    ///
    /// Multi-field order columns expand in place with the level's direction.
    fn order_keys(&self, request: &DatatableRequest) -> Result<Vec<OrderKey>> {
        let order_columns = self.order_columns();
        let mut keys = Vec::new();
        for spec in &request.order {
            let entry = usize::try_from(spec.column_idx)
                .ok()
                .and_then(|idx| order_columns.get(idx))
                .ok_or(DatatableError::OrderColumnOutOfRange {
                    index: spec.column_idx,
                    len: order_columns.len(),
                })?;
            keys.extend(entry.fields().iter().map(|field| OrderKey {
                field: field.clone(),
                direction: spec.direction,
            }));
        }
        Ok(keys)
    }

    fn ordering(
        &self,
        collection: Self::Collection,
        request: &DatatableRequest,
    ) -> Result<Self::Collection> {
        let keys = self.order_keys(request)?;
        if keys.is_empty() {
            return Ok(collection);
        }

        debug!(?keys, "applying ordering");
        Ok(collection.order_by(&keys)?)
    }

    /// Rows to keep after ordering, or `None` when paging is disabled.
    fn page_window(&self, request: &DatatableRequest) -> Option<Range<usize>> {
        let max = i64::try_from(self.config().max_display_length).unwrap_or(i64::MAX);
        let limit = request.length.min(max);
        if limit == UNLIMITED_PAGE_LENGTH {
            return None;
        }

        let limit = if limit < 0 {
            DEFAULT_PAGE_LENGTH.min(max)
        } else {
            limit
        };
        let limit = usize::try_from(limit).unwrap_or(0);
        let start = usize::try_from(request.start).unwrap_or(0);
        Some(start..start.saturating_add(limit))
    }

    fn paging(
        &self,
        collection: Self::Collection,
        request: &DatatableRequest,
    ) -> Result<Self::Collection> {
        match self.page_window(request) {
            Some(window) => {
                debug!(start = window.start, end = window.end, "applying page window");
                Ok(collection.slice(window)?)
            }
            None => Ok(collection),
        }
    }

    fn prepare_results(&self, collection: Self::Collection) -> Result<Vec<Vec<Value>>> {
        let columns = self.columns();
        let rows = collection.fetch()?;
        Ok(rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|column| self.render_column(row, column))
                    .collect()
            })
            .collect())
    }

    fn render_column(
        &self,
        row: &<Self::Collection as Collection>::Row,
        column: &ColumnSpec,
    ) -> Value {
        render::render_column(row, column)
    }

    fn context_data(&self, request: &DatatableRequest) -> Result<DatatableResponse> {
        self.initialize(request)?;

        let collection = self.initial_collection()?;
        let total_records = collection.count()?;

        let collection = self.filter_collection(collection, request)?;
        let total_display_records = collection.count()?;

        let collection = self.ordering(collection, request)?;
        let collection = self.paging(collection, request)?;
        let rows = self.prepare_results(collection)?;

        Ok(DatatableResponse {
            draw: request.draw,
            total_records,
            total_display_records,
            rows,
        })
    }

    fn handle(&self, request: &DatatableRequest) -> Result<DatatableResponse> {
        let span = debug_span!("datatable", draw = request.draw);
        let _entered = span.enter();

        let response = self.context_data(request)?;
        debug!(
            total_records = response.total_records,
            total_display_records = response.total_display_records,
            rows = response.rows.len(),
            "datatable request served"
        );
        Ok(response)
    }
}

/// A view driven entirely by configuration and a collection source.
pub struct Datatable<S> {
    config: DatatableConfig,
    source: Option<S>,
}

impl<S: CollectionSource> Datatable<S> {
    /// A view without a source; requests fail with a configuration error
    /// until one is attached.
    pub fn new(config: DatatableConfig) -> Self {
        Self {
            config,
            source: None,
        }
    }

    pub fn with_source(config: DatatableConfig, source: S) -> Self {
        Self {
            config,
            source: Some(source),
        }
    }
}

impl<S: CollectionSource> DatatableView for Datatable<S> {
    type Collection = S::Collection;

    fn config(&self) -> &DatatableConfig {
        &self.config
    }

    fn initial_collection(&self) -> Result<Self::Collection> {
        let source = self.source.as_ref().ok_or_else(|| {
            DatatableError::Configuration(
                "need to provide a collection source or implement initial_collection".to_string(),
            )
        })?;
        Ok(source.all()?)
    }
}
