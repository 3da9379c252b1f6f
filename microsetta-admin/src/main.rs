//! microsetta-admin - metadata pulldown service and command-line tool
//!
//! `serve` runs the HTTP surface; `pulldown` runs one pulldown from a barcode
//! file and writes TSV.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use microsetta_common::config::{
    load_config_file, resolve_api_token, resolve_config, AdminConfig, CliOverrides,
};
use microsetta_common::ApiClient;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use microsetta_admin::export::write_tsv;
use microsetta_admin::pulldown::{drop_private_columns, retrieve_metadata};
use microsetta_admin::{build_router, AppState};

/// Command-line arguments for microsetta-admin
#[derive(Parser, Debug)]
#[command(name = "microsetta-admin")]
#[command(about = "Metadata pulldown for the Microsetta admin console")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "MICROSETTA_ADMIN_CONFIG")]
    config: Option<PathBuf>,

    /// Base URL of the private API
    #[arg(long)]
    private_api_url: Option<String>,

    /// Extra root certificate (PEM) for the private API
    #[arg(long)]
    ca_file: Option<PathBuf>,

    /// Per-request timeout for private API calls, in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run one pulldown and write TSV
    Pulldown {
        /// File with one barcode per line
        #[arg(short, long)]
        barcodes: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep columns that are normally removed before export
        #[arg(long)]
        keep_private: bool,

        /// Private API bearer token (falls back to MICROSETTA_API_TOKEN)
        #[arg(long)]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config = load_config_file(args.config.as_deref())
        .context("Failed to load configuration file")?;

    let level = toml_config.logging.level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "microsetta_admin={0},microsetta_common={0},tower_http={0}",
                    level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting microsetta-admin v{}",
        env!("CARGO_PKG_VERSION")
    );

    let port_override = match &args.command {
        Command::Serve { port } => *port,
        Command::Pulldown { .. } => None,
    };
    let cli = CliOverrides {
        private_api_url: args.private_api_url.clone(),
        ca_file: args.ca_file.clone(),
        request_timeout_secs: args.timeout_secs,
        port: port_override,
    };
    let config = resolve_config(&cli, &toml_config).context("Invalid configuration")?;
    info!("Private API: {}", config.api.base_url);

    match args.command {
        Command::Serve { .. } => serve(config).await,
        Command::Pulldown {
            barcodes,
            output,
            keep_private,
            token,
        } => pulldown(&config, &barcodes, output.as_deref(), keep_private, token.as_deref()).await,
    }
}

async fn serve(config: AdminConfig) -> Result<()> {
    let app = build_router(AppState::new(config.api));

    let addr = format!("127.0.0.1:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// One barcode per line; blank lines ignored
fn read_barcodes(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read barcodes from {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

async fn pulldown(
    config: &AdminConfig,
    barcodes_path: &Path,
    output: Option<&Path>,
    keep_private: bool,
    token: Option<&str>,
) -> Result<()> {
    let barcodes = read_barcodes(barcodes_path)?;
    if barcodes.is_empty() {
        anyhow::bail!("No barcodes in {}", barcodes_path.display());
    }

    let token = resolve_api_token(token)
        .context("No private API token: pass --token or set MICROSETTA_API_TOKEN")?;
    let client = ApiClient::new(&config.api, token)?;

    let result = retrieve_metadata(&client, &barcodes).await?;

    if !result.errors.is_empty() {
        let report = serde_json::to_string_pretty(&result.errors)?;
        eprintln!("{}", report);
    }

    let table = if keep_private {
        result.table
    } else {
        drop_private_columns(&result.table)
    };

    match output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_tsv(&table, file)?;
            info!(rows = table.len(), "Wrote {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            write_tsv(&table, &mut lock)?;
            lock.flush()?;
        }
    }

    Ok(())
}
