//! # model-mock
//!
//! Mock HTTP servers for exercising a client's model-file download path.
//!
//! Two strategies, one server:
//!
//! - [`SyntheticModel`] streams a configurable number of zero bytes as
//!   `/model.gguf`, sleeping after every 64 KiB chunk to simulate a slow link.
//! - [`ModelFile`] streams a real file from disk as `/` and `/model.gguf`,
//!   unthrottled, and reports on `/health` whether the file exists.
//!
//! Both advertise `Accept-Ranges: bytes` and both answer range requests with
//! the whole body. Clients that resume downloads see a `200`, not a `206`.
//!
//! A client hanging up mid-download ends that transfer and nothing else: the
//! producer logs how far it got and the server keeps accepting.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use model_mock::{Server, SyntheticConfig, SyntheticModel, router};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), model_mock::Error> {
//!     let config = SyntheticConfig::new(8080, 1024 * 1024, 0.0)?;
//!     let server = Server::bind(([0, 0, 0, 0], config.port).into()).await?;
//!     server.serve(router(SyntheticModel::new(config))).await
//! }
//! ```

mod config;
mod error;
mod handler;
mod health;
mod request;
mod response;
mod router;
mod server;
mod source;
mod status;
mod transfer;

pub use config::{
    CHUNK_SIZE, DEFAULT_DELAY, DEFAULT_PORT, DEFAULT_SIZE, FileConfig, MODEL_FILE_NAME,
    PROGRESS_INTERVAL, SyntheticConfig,
};
pub use error::Error;
pub use health::HealthReport;
pub use request::Request;
pub use response::{IntoResponse, Json, Response, ResponseBuilder};
pub use router::{HEALTH_PATH, Router};
pub use server::{DEFAULT_DRAIN_TIMEOUT, Server};
pub use source::{MODEL_MISSING, ModelFile, ModelSource, SyntheticModel, router};
pub use status::Status;
