//! Livestatus HTTP Gateway
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────┐
//!                     │                LIVESTATUS GATEWAY                 │
//!                     │                                                   │
//!   GET /{table}?..   │  ┌─────────┐    ┌────────────┐    ┌───────────┐  │
//!   ──────────────────┼─▶│  http   │───▶│   query    │───▶│ transport │──┼──▶ Livestatus
//!                     │  │ server  │    │  builder   │    │ unix/tcp  │  │    daemon
//!                     │  └─────────┘    └────────────┘    └─────┬─────┘  │
//!                     │                                         │        │
//!   JSON records      │  ┌─────────┐    ┌────────────┐    ┌─────▼─────┐  │
//!   ◀─────────────────┼──│response │◀───│ normalizer │◀───│  fixed16  │◀─┼─── header + body
//!                     │  │ mapping │    │            │    │  reader   │  │
//!                     │  └─────────┘    └────────────┘    └───────────┘  │
//!                     │                                                   │
//!                     │  config · observability · lifecycle              │
//!                     └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use livestatus_gateway::config::{load_config, validate_config, GatewayConfig, TransportKind};
use livestatus_gateway::lifecycle::signals::spawn_signal_listener;
use livestatus_gateway::observability::{logging, metrics};
use livestatus_gateway::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "livestatus-gateway")]
#[command(about = "HTTP gateway for MK Livestatus", long_about = None)]
struct Args {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the HTTP bind address.
    #[arg(long)]
    bind: Option<String>,

    /// Connect to Livestatus over this Unix socket.
    #[arg(long, conflicts_with = "tcp")]
    socket: Option<String>,

    /// Connect to Livestatus over TCP (host:port).
    #[arg(long)]
    tcp: Option<String>,
}

impl Args {
    fn apply(&self, config: &mut GatewayConfig) {
        if let Some(bind) = &self.bind {
            config.listener.bind_address = bind.clone();
        }
        if let Some(path) = &self.socket {
            config.livestatus.transport = TransportKind::Unix;
            config.livestatus.path = path.clone();
        }
        if let Some(address) = &self.tcp {
            config.livestatus.transport = TransportKind::Tcp;
            config.livestatus.address = address.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };
    args.apply(&mut config);
    if let Err(errors) = validate_config(&config) {
        for error in &errors {
            eprintln!("invalid configuration: {}", error);
        }
        return Err(format!("{} configuration error(s)", errors.len()).into());
    }

    logging::init(&config.observability.log_level);

    tracing::info!("livestatus-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        livestatus = %config.livestatus.endpoint(),
        max_connections = config.listener.max_connections,
        read_timeout_secs = config.timeouts.read_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    spawn_signal_listener(&shutdown);

    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
