use serde::Serialize;

use crate::domain::entities::value::Value;

/// The payload returned to the table widget for one draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatatableResponse {
    pub draw: i64,
    #[serde(rename = "iTotalRecords")]
    pub total_records: usize,
    #[serde(rename = "iTotalDisplayRecords")]
    pub total_display_records: usize,
    #[serde(rename = "data")]
    pub rows: Vec<Vec<Value>>,
}
