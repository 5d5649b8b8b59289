mod data;
mod error;
mod models;
mod rewards;
mod routes;
mod settings;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tabled::Table;
use tokio::net::TcpListener;
use tracing::info;

use data::CustomerStore;
use rewards::RewardCalculator;
use settings::Settings;

/// Customer reward points: tiered points per purchase, totalled per month
#[derive(Parser)]
#[command(name = "customer-rewards", version, about)]
struct Cli {
    /// Directory holding default.toml (defaults to $CONFIG_DIR or ./config)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Points per currency unit spent above 100
    #[arg(long, global = true)]
    over_100_points: Option<u32>,

    /// Points per currency unit spent between 50 and 100
    #[arg(long, global = true)]
    between_50_and_100_points: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct DataArgs {
    /// JSON file with customers and transactions (omit for the built-in sample data)
    #[arg(long)]
    data: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the rewards HTTP API
    Serve {
        /// Address to bind (overrides server.host)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (overrides server.port)
        #[arg(long)]
        port: Option<u16>,
        #[command(flatten)]
        data: DataArgs,
    },

    /// Print the rewards report as a table
    Report {
        /// Only report this customer ID
        #[arg(long)]
        customer: Option<i64>,
        #[command(flatten)]
        data: DataArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_dir = cli.config.clone().unwrap_or_else(settings::default_config_dir);
    let mut settings = Settings::load(&config_dir)
        .with_context(|| format!("Failed to load configuration from {}", config_dir.display()))?;
    if let Some(points) = cli.over_100_points {
        settings.rates.over_100 = points;
    }
    if let Some(points) = cli.between_50_and_100_points {
        settings.rates.between_50_and_100 = points;
    }

    // RUST_LOG wins over the configured level
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.log_level.as_str().into()),
        )
        .init();

    let calculator = RewardCalculator::new(settings.rates);

    match cli.command {
        Commands::Serve { host, port, data } => {
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }
            let store = load_store(data.data.as_deref())?;
            serve(&settings, store, calculator).await?;
        }

        Commands::Report { customer, data } => {
            let store = load_store(data.data.as_deref())?;
            let report = match customer {
                Some(id) => calculator.rewards_for_customer(store.find_by_id(id)?)?,
                None => calculator.rewards_for_customers(store.all())?,
            };
            println!("{}", Table::new(models::report_rows(&report)));
        }
    }

    Ok(())
}

fn load_store(path: Option<&Path>) -> anyhow::Result<CustomerStore> {
    match path {
        Some(path) => CustomerStore::from_json_file(path),
        None => Ok(CustomerStore::sample()),
    }
}

async fn serve(
    settings: &Settings,
    store: CustomerStore,
    calculator: RewardCalculator,
) -> anyhow::Result<()> {
    let rates = calculator.rates();
    info!(
        over_100 = rates.over_100,
        between_50_and_100 = rates.between_50_and_100,
        customers = store.all().len(),
        "Starting customer-rewards"
    );

    let app = routes::router(routes::AppState::new(store, calculator));

    let addr = settings.server_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
