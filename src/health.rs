//! Health-check payloads.
//!
//! A download client polls `/health` before it starts a transfer to learn
//! whether the server is ready and how many bytes to expect:
//!
//! | State | Status | Body |
//! |---|---|---|
//! | ready | `200` | `{"status":"ok","file_size":N}` |
//! | not ready | `503` | `{"status":"error","message":"..."}` |

use serde::Serialize;

use crate::response::{IntoResponse, Json, Response};
use crate::status::Status;

/// The JSON body served on `/health`.
///
/// Fields serialize in declaration order and absent fields are omitted, so
/// the wire shape is fixed.
#[derive(Debug, Serialize)]
pub struct HealthReport {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl HealthReport {
    /// Ready to serve a payload of `file_size` bytes.
    pub fn ok(file_size: u64) -> Self {
        Self { status: "ok", file_size: Some(file_size), message: None }
    }

    /// Not ready; `message` says why.
    pub fn error(message: impl Into<String>) -> Self {
        Self { status: "error", file_size: None, message: Some(message.into()) }
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// `200` when ready, `503 Service Unavailable` otherwise.
impl IntoResponse for HealthReport {
    fn into_response(self) -> Response {
        let status = if self.is_ok() { Status::Ok } else { Status::ServiceUnavailable };
        let mut res = Json(self).into_response();
        if res.status == u16::from(Status::Ok) {
            res.status = status.into();
        }
        res
    }
}
