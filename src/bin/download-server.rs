//! Local model download server.
//!
//! Serves a real model file from `tests/models/` as `/` and `/model.gguf`,
//! unthrottled, plus `/health`. Refuses to start when the file is missing.
//!
//! ```text
//! dd if=/dev/zero of=tests/models/qwen2.5-coder-0.5b-ifai-v3-Q4_K_M.gguf bs=1m count=10
//! download-server
//! curl -o model.gguf http://localhost:8080/model.gguf
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};

use model_mock::{DEFAULT_PORT, Error, FileConfig, ModelFile, Server, router};

#[derive(Parser)]
#[command(name = "download-server", about = "Serve a local model file for download testing")]
struct Cli {
    /// Server port.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Model file to serve. Defaults to the model under the crate's
    /// `tests/models` directory.
    #[arg(long)]
    model_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match cli.model_file {
        Some(path) => FileConfig::new(cli.port, path),
        None => FileConfig { port: cli.port, ..FileConfig::default() },
    };

    tokio::fs::create_dir_all(config.models_dir()).await?;

    let source = ModelFile::new(config);
    let size = match source.ready().await {
        Ok(size) => size,
        Err(guidance) => {
            for line in guidance.lines() {
                warn!("{line}");
            }
            return Ok(());
        }
    };

    let config = source.config();
    info!(
        url = %format!("http://localhost:{}/model.gguf", config.port),
        file = config.file_name(),
        size = %format!("{:.1} MB", size as f64 / (1024.0 * 1024.0)),
        dir = %config.models_dir().display(),
        "local model download server ready, press Ctrl+C to stop",
    );

    let server = Server::bind(SocketAddr::from(([0, 0, 0, 0], config.port))).await?;
    server.serve(router(source)).await?;

    info!("server stopped");
    Ok(())
}
