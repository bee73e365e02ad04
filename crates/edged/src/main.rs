//! edged — the edgegrid daemon.
//!
//! Single binary that assembles the edgegrid subsystems:
//! - State store (redb)
//! - Scheduler and configuration manager
//! - Live service registry
//! - Plugin resolver (native and shim sources)
//! - Provisioning and deprovisioning coordinators
//! - REST API
//!
//! # Usage
//!
//! ```text
//! edged standalone --config /etc/edgegrid/edged.toml --port 8081
//! edged default-config > edged.toml
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use edge_core::EdgeConfig;
use edgegrid_api::ApiState;
use edgegrid_plugins::PluginResolver;
use edgegrid_registry::ServiceRegistry;
use edgegrid_services::DeprovisionOptions;
use edgegrid_state::StateStore;

#[derive(Parser)]
#[command(name = "edged", about = "edgegrid daemon")]
struct Cli {
    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Run the control plane in a single process.
    Standalone {
        /// Configuration file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Port to listen on, overriding the configuration file.
        #[arg(long)]
        port: Option<u16>,

        /// Data directory for persistent state, overriding the configuration file.
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Print the default configuration as TOML.
    DefaultConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match cli.command {
        Command::Standalone {
            config,
            port,
            data_dir,
        } => {
            let mut edge_config = match config {
                Some(path) => {
                    let loaded = EdgeConfig::from_file(&path)?;
                    info!(path = ?path, "configuration loaded");
                    loaded
                }
                None => EdgeConfig::default(),
            };
            if let Some(port) = port {
                edge_config.server.port = port;
            }
            if let Some(data_dir) = data_dir {
                edge_config.storage.data_dir = data_dir;
            }
            run_standalone(edge_config).await
        }
        Command::DefaultConfig => {
            print!("{}", EdgeConfig::default().to_toml_string()?);
            Ok(())
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,edged=debug,edgegrid=debug"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run_standalone(config: EdgeConfig) -> anyhow::Result<()> {
    info!("edgegrid daemon starting in standalone mode");

    // ── Initialize subsystems ──────────────────────────────────

    std::fs::create_dir_all(&config.storage.data_dir)?;
    let db_path = config.storage.data_dir.join("edgegrid.redb");
    let state = StateStore::open(&db_path)?;
    info!(path = ?db_path, "state store opened");

    let registry = ServiceRegistry::new();

    let resolver = PluginResolver::from_config(&config.plugins);
    info!(
        native = ?config.plugins.native_dir,
        shim = ?config.plugins.shim_dir,
        "plugin resolver initialized"
    );

    let options = DeprovisionOptions::from(&config.deprovision);
    info!(
        poll_interval = ?options.poll_interval,
        deadline = ?options.deadline,
        "deprovisioning options"
    );

    let api_state = ApiState::new(state, registry, resolver, options);

    // ── Start API server ───────────────────────────────────────

    let router = edgegrid_api::build_router(api_state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));

    info!(%addr, "API server starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Graceful shutdown on Ctrl-C.
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            info!("shutdown signal received");
        })
        .await?;

    info!("edgegrid daemon stopped");
    Ok(())
}
