use serde::Serialize;
use tracing::error;

use crate::domain::entities::request::DatatableRequest;
use crate::domain::entities::response::DatatableResponse;
use crate::error::{DatatableError, Result};
use crate::usecase::services::datatable::DatatableView;

pub const CONTENT_TYPE: &str = "application/json";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal error";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

#[derive(Serialize)]
struct Success<'a> {
    #[serde(flatten)]
    payload: &'a DatatableResponse,
    result: &'static str,
}

#[derive(Serialize)]
struct Failure<'a> {
    result: &'static str,
    #[serde(rename = "sError")]
    s_error: &'a str,
    text: &'a str,
}

/// Turns a view's outcome into a JSON body for the transport.
///
/// Request failures are reported inside the body with `"result": "error"`;
/// configuration errors are returned to the caller instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonResponder {
    /// Expose error text to the client instead of a generic message.
    pub debug: bool,
    /// Send the bare payload, without the `result` key.
    pub clean: bool,
}

impl JsonResponder {
    pub fn new(debug: bool) -> Self {
        Self {
            debug,
            clean: false,
        }
    }

    pub fn clean(mut self) -> Self {
        self.clean = true;
        self
    }

    pub fn respond<V>(&self, view: &V, request: &DatatableRequest) -> Result<JsonResponse>
    where
        V: DatatableView + ?Sized,
    {
        let body = match view.handle(request) {
            Ok(response) => self.success_body(&response)?,
            Err(err @ DatatableError::Configuration(_)) => return Err(err),
            Err(err) => {
                error!(error = %err, draw = request.draw, "datatable request failed");
                self.failure_body(&err)?
            }
        };

        Ok(JsonResponse {
            status: 200,
            content_type: CONTENT_TYPE,
            body,
        })
    }

    pub fn success_body(&self, response: &DatatableResponse) -> Result<String> {
        let body = if self.clean {
            serde_json::to_string(response)?
        } else {
            serde_json::to_string(&Success {
                payload: response,
                result: "ok",
            })?
        };
        Ok(body)
    }

    pub fn failure_body(&self, err: &DatatableError) -> Result<String> {
        let message = if self.debug {
            err.to_string()
        } else {
            INTERNAL_ERROR_MESSAGE.to_string()
        };
        Ok(serde_json::to_string(&Failure {
            result: "error",
            s_error: &message,
            text: &message,
        })?)
    }
}
