//! Request logger demo server.
//!
//! Serves a small Axum application wrapped in the request logger so the
//! configured output can be inspected against real traffic.
//!
//! ```text
//! request-logger --config logger.toml --bind 127.0.0.1:3000
//! curl localhost:3000/health
//! curl -X POST -H 'content-type: application/json' -d '{"a":1}' localhost:3000/echo
//! curl localhost:3000/status/503
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use request_logger::config::{load_config, LoggerConfig};
use request_logger::http::server::shutdown_signal;
use request_logger::observability::logging;
use request_logger::{HttpServer, RequestLogger};

#[derive(Parser)]
#[command(name = "request-logger")]
#[command(about = "Demo server for the request logging middleware", long_about = None)]
struct Cli {
    /// Logger configuration file (TOML). Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on.
    #[arg(short, long, default_value = "127.0.0.1:3000")]
    bind: String,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(logging::DEFAULT_DIRECTIVES);

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => LoggerConfig::default(),
    };

    tracing::info!(
        config = ?cli.config,
        log_level = %config.log_level,
        json_logs = config.json_logs,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&cli.bind).await?;
    let server = HttpServer::new(
        RequestLogger::new(config),
        Duration::from_secs(cli.timeout_secs),
    );
    server.run(listener, shutdown_signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
