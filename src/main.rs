use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use locale_prefix_router::config::{load_config, watcher::ConfigWatcher, LocaleRouterConfig};
use locale_prefix_router::lifecycle::{wait_for_signal, Shutdown};
use locale_prefix_router::observability::{logging, metrics};
use locale_prefix_router::{views, LocaleServer, ServerError};

#[derive(Parser)]
#[command(name = "locale-prefix-router")]
#[command(about = "Serve an application under country/language URL prefixes", long_about = None)]
struct Cli {
    /// Configuration file (TOML). Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Validate the configuration, print the route table and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => LocaleRouterConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "locale-prefix-router starting");

    let server = LocaleServer::new(config.clone(), views::demo_routes)?;
    let snapshot = server.state().snapshot();
    let ctx = snapshot.inactive_context();

    if cli.check {
        for line in snapshot.routes.describe(&ctx) {
            println!("{line}");
        }
        return Ok(());
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        default_country = %snapshot.countries.default_country(),
        prefix_default_country = config.routing.prefix_default_country,
        script_prefix = %config.routing.script_prefix,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );
    for line in snapshot.routes.describe(&ctx) {
        tracing::debug!(route = %line, "Route registered");
    }

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    // The watcher stops on drop, so it lives as long as main.
    let (_watcher, config_updates) = match &cli.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_tx, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.listener.bind_address.clone(),
            source,
        })?;

    let shutdown = Shutdown::new();
    tokio::spawn(wait_for_signal(shutdown.clone()));

    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
