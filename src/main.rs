//! vhost-switch
//!
//! Serves the virtual hosts declared in a TOML config file.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request        ┌──────────────────────────────────────────────┐
//!     ──────────────────────┼─▶ trace / request-id / timeout layers        │
//!                           │        │                                     │
//!                           │        ▼                                     │
//!                           │  ┌─────────────┐   hit   ┌────────────────┐  │
//!                           │  │ VhostSwitch │───────▶│ vhost handler  │  │
//!                           │  │  dispatch   │         │ chain / app    │  │
//!                           │  └──────┬──────┘         └────────────────┘  │
//!                           │         │ NoMatch                            │
//!                           │         ▼                                    │
//!                           │  ┌─────────────┐                             │
//!                           │  │  fallback   │                             │
//!                           │  └─────────────┘                             │
//!                           └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use vhost_switch::config::{build_switch, load_config, AppCatalog, SwitchConfig};
use vhost_switch::http::HttpServer;
use vhost_switch::lifecycle::Shutdown;
use vhost_switch::observability::logging;

#[derive(Parser)]
#[command(name = "vhost-switch")]
#[command(about = "Route HTTP requests to apps by hostname", long_about = None)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,

    /// Load the config, build the switch, and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => SwitchConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?cli.config,
        "vhost-switch starting"
    );

    let switch = build_switch(&config, &AppCatalog::new())?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        vhosts = switch.len(),
        trim_www = switch.trim_www(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if cli.check {
        let mut hosts: Vec<_> = switch.hosts().map(|h| h.to_string()).collect();
        hosts.sort();
        for host in hosts {
            println!("{host}");
        }
        return Ok(());
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let server = HttpServer::new(config, switch);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
