//! Synthetic model download server.
//!
//! Serves `--size` zero bytes as `/model.gguf`, sleeping `--delay` seconds
//! after each 64 KiB chunk, plus `/health`.
//!
//! ```text
//! mock-server --port 8080 --size 1048576 --delay 0
//! curl -o /dev/null http://localhost:8080/model.gguf
//! curl http://localhost:8080/health
//! ```

use std::net::SocketAddr;

use clap::Parser;
use tracing::info;

use model_mock::{
    DEFAULT_DELAY, DEFAULT_PORT, DEFAULT_SIZE, Error, Server, SyntheticConfig, SyntheticModel,
    router,
};

#[derive(Parser)]
#[command(name = "mock-server", about = "Mock HTTP server for model download testing")]
struct Cli {
    /// Server port.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// File size in bytes.
    #[arg(long, default_value_t = DEFAULT_SIZE)]
    size: u64,

    /// Delay per chunk, in seconds.
    #[arg(long, default_value_t = DEFAULT_DELAY.as_secs_f64())]
    delay: f64,
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
    let config = SyntheticConfig::new(cli.port, cli.size, cli.delay)?;

    let size_mb = config.size as f64 / (1024.0 * 1024.0);
    let speed = match config.throughput_mb_per_sec() {
        Some(mb) => format!("~{mb:.1} MB/s"),
        None => "unthrottled".to_owned(),
    };
    info!(
        url = %format!("http://localhost:{}/model.gguf", config.port),
        size = %format!("{size_mb:.1} MB"),
        %speed,
        "mock model download server, press Ctrl+C to stop",
    );

    let server = Server::bind(SocketAddr::from(([0, 0, 0, 0], config.port))).await?;
    server.serve(router(SyntheticModel::new(config))).await?;

    info!("shutting down");
    Ok(())
}
