//! HTTP status codes as a typed enum.
//!
//! Only the codes the mock servers actually emit are listed. Use [`Status`]
//! wherever a status code is accepted: `Response::status()` or
//! `Response::builder().status()`.
//!
//! ```rust
//! use model_mock::{Response, Status};
//!
//! Response::status(Status::NotFound);
//!
//! Response::builder()
//!     .status(Status::ServiceUnavailable)
//!     .json(br#"{"status":"error"}"#.to_vec());
//! ```

/// The status codes a model download server answers with.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    // ── 2xx Success ───────────────────────────────────────────────────────────
    Ok,                  // 200

    // ── 4xx Client errors ─────────────────────────────────────────────────────
    NotFound,            // 404

    // ── 5xx Server errors ─────────────────────────────────────────────────────
    InternalServerError, // 500
    NotImplemented,      // 501
    ServiceUnavailable,  // 503
}

impl Status {
    /// Returns the numeric status code (e.g. `404`).
    pub fn as_u16(self) -> u16 {
        match self {
            Self::Ok                  => 200,
            Self::NotFound            => 404,
            Self::InternalServerError => 500,
            Self::NotImplemented      => 501,
            Self::ServiceUnavailable  => 503,
        }
    }
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 { s.as_u16() }
}

impl From<Status> for http::StatusCode {
    fn from(s: Status) -> Self {
        // Every variant above is a registered code in 100..=999.
        http::StatusCode::from_u16(s.as_u16()).unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR)
    }
}
