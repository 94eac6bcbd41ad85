//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! A response body is either fully buffered (health payloads, error text) or
//! a stream of chunks produced by a [`transfer`](crate::transfer) task. The
//! server converts both into a single hyper body type at the edge.

use std::convert::Infallible;

use bytes::Bytes;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full, StreamBody};
use hyper::body::Frame;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tracing::error;

use crate::status::Status;

/// The body type handed to hyper.
pub(crate) type ResponseBody = UnsyncBoxBody<Bytes, Infallible>;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Content-type values used by the mock servers.
pub(crate) enum ContentType {
    Json,        // application/json
    OctetStream, // application/octet-stream  (model download)
    Text,        // text/plain; charset=utf-8
}

impl ContentType {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Json        => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Text        => "text/plain; charset=utf-8",
        }
    }
}

// ── Body ──────────────────────────────────────────────────────────────────────

/// A response body: buffered bytes, or chunks arriving over a channel.
///
/// Dropping the `Stream` receiver (which hyper does when the peer goes away)
/// is how the producing task learns the client disconnected.
pub(crate) enum Body {
    Full(Bytes),
    Stream(mpsc::Receiver<Bytes>),
}

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// ```rust
/// use model_mock::{Response, Status};
///
/// Response::json(br#"{"status":"ok"}"#.to_vec());
/// Response::status(Status::NotFound);
///
/// Response::builder()
///     .status(Status::ServiceUnavailable)
///     .header("retry-after", "5")
///     .text("warming up");
/// ```
pub struct Response {
    pub(crate) body: Body,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) status: u16,
}

impl Response {
    /// `200 OK` with an `application/json` body.
    pub fn json(body: Vec<u8>) -> Self {
        Self::builder().json(body)
    }

    /// Response with no body.
    pub fn status(code: Status) -> Self {
        Self::builder().status(code).no_body()
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: Vec::new(), status: Status::Ok.into() }
    }

    /// The numeric status code.
    pub fn status_code(&self) -> u16 { self.status }

    /// Case-insensitive lookup of a header set on this response.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Converts into the hyper response written to the socket.
    ///
    /// A header that fails validation degrades the response to a bare 500
    /// instead of failing the connection.
    pub(crate) fn into_inner(self) -> http::Response<ResponseBody> {
        let status = http::StatusCode::from_u16(self.status)
            .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR);
        let mut builder = http::Response::builder().status(status);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let body = match self.body {
            Body::Full(bytes) => Full::new(bytes).boxed_unsync(),
            Body::Stream(rx) => StreamBody::new(
                ReceiverStream::new(rx).map(|chunk| Ok::<_, Infallible>(Frame::data(chunk))),
            )
            .boxed_unsync(),
        };

        builder.body(body).unwrap_or_else(|e| {
            error!("invalid response header: {e}");
            let mut res = http::Response::new(Full::new(Bytes::new()).boxed_unsync());
            *res.status_mut() = http::StatusCode::INTERNAL_SERVER_ERROR;
            res
        })
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `Status::Ok` (200).
/// Terminated by a typed body method.
pub struct ResponseBuilder {
    headers: Vec<(String, String)>,
    status: u16,
}

impl ResponseBuilder {
    pub fn status(mut self, code: Status) -> Self {
        self.status = code.into();
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Terminate with a JSON body (`application/json`).
    pub fn json(self, body: Vec<u8>) -> Response {
        self.finish(ContentType::Json, Body::Full(body.into()))
    }

    /// Terminate with a plain-text body (`text/plain; charset=utf-8`).
    pub fn text(self, body: impl Into<String>) -> Response {
        let body: String = body.into();
        self.finish(ContentType::Text, Body::Full(Bytes::from(body)))
    }

    /// Terminate with no body.
    pub fn no_body(self) -> Response {
        Response { body: Body::Full(Bytes::new()), headers: self.headers, status: self.status }
    }

    /// Terminate with a streamed body of exactly `len` bytes.
    ///
    /// `content-length` is declared up front so the client sees the total
    /// size before the first chunk, exactly as for a file on disk.
    pub(crate) fn stream(
        mut self,
        content_type: ContentType,
        len: u64,
        chunks: mpsc::Receiver<Bytes>,
    ) -> Response {
        self.headers.push(("content-length".to_owned(), len.to_string()));
        self.finish(content_type, Body::Stream(chunks))
    }

    fn finish(self, content_type: ContentType, body: Body) -> Response {
        let mut headers = vec![("content-type".to_owned(), content_type.as_str().to_owned())];
        headers.extend(self.headers);
        Response { body, headers, status: self.status }
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

/// A `200 OK` JSON body serialized with serde_json.
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.0) {
            Ok(bytes) => Response::json(bytes),
            Err(e) => {
                error!("json serialization failed: {e}");
                Response::status(Status::InternalServerError)
            }
        }
    }
}
