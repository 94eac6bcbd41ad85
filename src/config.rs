//! Startup configuration.
//!
//! Both servers read their settings once, at process start, into an
//! immutable struct. Sources share it read-only through an `Arc`; nothing
//! mutates it after construction.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Error;

/// Size of one body chunk, and of one channel message between a producer
/// task and the connection writing it.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// The real-file server reports progress each time this many more bytes
/// have been sent.
pub const PROGRESS_INTERVAL: u64 = 1024 * 1024;

pub const DEFAULT_PORT: u16 = 8080;

/// 10 MiB.
pub const DEFAULT_SIZE: u64 = 10 * 1024 * 1024;

/// Per-chunk sleep of the synthetic server, roughly 64 MB/s.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(1);

/// Name of the model file the real-file server looks for.
pub const MODEL_FILE_NAME: &str = "qwen2.5-coder-0.5b-ifai-v3-Q4_K_M.gguf";

// ── SyntheticConfig ───────────────────────────────────────────────────────────

/// Settings of the synthetic-data server.
#[derive(Clone, Debug, PartialEq)]
pub struct SyntheticConfig {
    pub port: u16,
    /// Number of zero bytes served on `/model.gguf`.
    pub size: u64,
    /// Sleep after each chunk. Zero disables throttling.
    pub delay: Duration,
}

impl SyntheticConfig {
    /// Builds a config from command-line values. `delay_secs` is fractional
    /// seconds per chunk and must be finite and non-negative.
    pub fn new(port: u16, size: u64, delay_secs: f64) -> Result<Self, Error> {
        let delay = Duration::try_from_secs_f64(delay_secs)
            .map_err(|e| Error::Config(format!("invalid delay {delay_secs}: {e}")))?;
        Ok(Self { port, size, delay })
    }

    /// Approximate throughput implied by the delay, in MB/s. `None` when
    /// the server is not throttled.
    pub fn throughput_mb_per_sec(&self) -> Option<f64> {
        if self.delay.is_zero() {
            return None;
        }
        Some(CHUNK_SIZE as f64 / (self.delay.as_secs_f64() * 1024.0 * 1024.0))
    }
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT, size: DEFAULT_SIZE, delay: DEFAULT_DELAY }
    }
}

// ── FileConfig ────────────────────────────────────────────────────────────────

/// Settings of the real-file server.
#[derive(Clone, Debug, PartialEq)]
pub struct FileConfig {
    pub port: u16,
    /// The model file served on `/` and `/model.gguf`.
    pub path: PathBuf,
}

impl FileConfig {
    pub fn new(port: u16, path: impl Into<PathBuf>) -> Self {
        Self { port, path: path.into() }
    }

    /// The directory the model file lives in.
    pub fn models_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// The model file's own name, used in `Content-Disposition`.
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(MODEL_FILE_NAME)
    }

    /// `<crate dir>/tests/models`, next to the test suites that download from it.
    pub fn default_models_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("models")
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PORT, Self::default_models_dir().join(MODEL_FILE_NAME))
    }
}
