//! The two download strategies and the router built from them.
//!
//! A [`ModelSource`] answers two questions: what does a download look like,
//! and is the server ready. [`router`] turns any source into a [`Router`]
//! serving its download paths plus `/health`; every other path is a 404.
//!
//! ```rust,no_run
//! use model_mock::{Server, SyntheticConfig, SyntheticModel, router};
//!
//! # async fn run() -> Result<(), model_mock::Error> {
//! let config = SyntheticConfig::default();
//! let server = Server::bind(([0, 0, 0, 0], config.port).into()).await?;
//! server.serve(router(SyntheticModel::new(config))).await
//! # }
//! ```

use std::future::Future;
use std::io::ErrorKind;

use tokio::fs::File;
use tracing::{debug, error};

use crate::config::{FileConfig, SyntheticConfig};
use crate::health::HealthReport;
use crate::request::Request;
use crate::response::{ContentType, IntoResponse, Response, ResponseBuilder};
use crate::router::Router;
use crate::status::Status;
use crate::transfer;

/// Body of the 503 health response when the model file is missing.
pub const MODEL_MISSING: &str = "Model file not found";

/// A strategy for serving one downloadable model.
pub trait ModelSource: Send + Sync + 'static {
    /// Paths that start a download.
    fn download_paths(&self) -> &'static [&'static str];

    /// Response to a download request.
    fn download(&self, req: Request) -> impl Future<Output = Response> + Send;

    /// Response to `GET /health`.
    fn health(&self, req: Request) -> impl Future<Output = Response> + Send;
}

/// Routes `GET` on each download path and on `/health` to `source`.
pub fn router<S: ModelSource>(source: S) -> Router {
    Router::new(source)
}

/// Response headers shared by both download strategies.
fn attachment(file_name: &str) -> ResponseBuilder {
    Response::builder()
        .header("content-disposition", &format!("attachment; filename=\"{file_name}\""))
        // Advertised for client compatibility; range requests still get the full body.
        .header("accept-ranges", "bytes")
}

fn note_range(req: &Request) {
    if let Some(range) = req.header("range") {
        debug!(range, path = req.path(), "range request served in full");
    }
}

// ── SyntheticModel ────────────────────────────────────────────────────────────

/// Serves `size` zero bytes as `model.gguf`, throttled per chunk.
pub struct SyntheticModel {
    config: SyntheticConfig,
}

impl SyntheticModel {
    pub fn new(config: SyntheticConfig) -> Self {
        Self { config }
    }
}

impl ModelSource for SyntheticModel {
    fn download_paths(&self) -> &'static [&'static str] {
        &["/model.gguf"]
    }

    async fn download(&self, req: Request) -> Response {
        note_range(&req);
        let SyntheticConfig { size, delay, .. } = self.config;
        attachment("model.gguf").stream(
            ContentType::OctetStream,
            size,
            transfer::zeroes(size, delay),
        )
    }

    async fn health(&self, _req: Request) -> Response {
        HealthReport::ok(self.config.size).into_response()
    }
}

// ── ModelFile ─────────────────────────────────────────────────────────────────

/// Serves a model file from disk, unthrottled.
///
/// The file is looked up on every request, so it may be created or removed
/// while the server runs.
pub struct ModelFile {
    config: FileConfig,
}

impl ModelFile {
    pub fn new(config: FileConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FileConfig {
        &self.config
    }

    /// Startup check: the file's size, or the operator guidance to print
    /// instead of binding when there is nothing to serve.
    pub async fn ready(&self) -> Result<u64, String> {
        match self.size().await {
            Some(size) => Ok(size),
            None => {
                let path = self.config.path.display();
                Err(format!(
                    "model file does not exist: {path}\n\
                     create one first: dd if=/dev/zero of={path} bs=1m count=10"
                ))
            }
        }
    }

    /// Size of the model file, or `None` if there is no regular file at the
    /// configured path.
    pub async fn size(&self) -> Option<u64> {
        match tokio::fs::metadata(&self.config.path).await {
            Ok(meta) if meta.is_file() => Some(meta.len()),
            Ok(_) => None,
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    error!(path = %self.config.path.display(), "stat failed: {e}");
                }
                None
            }
        }
    }
}

impl ModelSource for ModelFile {
    fn download_paths(&self) -> &'static [&'static str] {
        &["/", "/model.gguf"]
    }

    async fn download(&self, req: Request) -> Response {
        note_range(&req);
        let path = &self.config.path;

        let file = match File::open(path).await {
            Ok(file) => file,
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    error!(path = %path.display(), "open failed: {e}");
                }
                return not_found(&format!("Model file not found: {}", path.display()));
            }
        };
        let total = match file.metadata().await {
            Ok(meta) if meta.is_file() => meta.len(),
            Ok(_) => return not_found(&format!("Model file not found: {}", path.display())),
            Err(e) => {
                error!(path = %path.display(), "stat failed: {e}");
                return Response::status(Status::InternalServerError);
            }
        };

        attachment(self.config.file_name()).stream(
            ContentType::OctetStream,
            total,
            transfer::file(file, total),
        )
    }

    async fn health(&self, _req: Request) -> Response {
        match self.size().await {
            Some(size) => HealthReport::ok(size).into_response(),
            None => HealthReport::error(MODEL_MISSING).into_response(),
        }
    }
}

fn not_found(message: &str) -> Response {
    Response::builder().status(Status::NotFound).text(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_file(path: &std::path::Path) -> ModelFile {
        ModelFile::new(FileConfig::new(0, path))
    }

    #[tokio::test]
    async fn ready_reports_the_file_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.gguf");
        std::fs::write(&path, b"GGUF0000").unwrap();

        assert_eq!(model_file(&path).ready().await, Ok(8));
    }

    #[tokio::test]
    async fn ready_explains_how_to_create_a_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.gguf");

        let guidance = model_file(&path).ready().await.unwrap_err();
        let mut lines = guidance.lines();
        assert_eq!(
            lines.next(),
            Some(format!("model file does not exist: {}", path.display()).as_str()),
        );
        assert_eq!(
            lines.next(),
            Some(format!("create one first: dd if=/dev/zero of={} bs=1m count=10", path.display()).as_str()),
        );
        assert_eq!(lines.next(), None);
    }

    #[tokio::test]
    async fn a_directory_is_not_ready() {
        let dir = tempfile::tempdir().unwrap();
        assert!(model_file(dir.path()).ready().await.is_err());
    }
}
