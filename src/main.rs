//! # Turismo CLI
//!
//! The `turismo` binary runs both sides of the system: the Query Service
//! and the presentation commands that consume it.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `turismo serve` | Run the read-only query service |
//! | `turismo report <departamento>` | Print the dashboard aggregates for a region |
//! | `turismo export <departamento>` | Write the multi-sheet spreadsheet artifact |
//! | `turismo ping` | Liveness check against a running service |
//!
//! The service reads its store locations from the environment
//! (`TURISMO_DB_ROOT`, `TURISMO_DB_FOURSQUARE`, `TURISMO_DB_GOOGLE`);
//! the client commands only need `--base-url`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use turismo::{client, config, export, report, server};

/// Tourism data query service and dashboard toolkit.
#[derive(Parser)]
#[command(
    name = "turismo",
    about = "Read-only query service and dashboard toolkit for scraped tourism data",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the query service.
    ///
    /// Requires `TURISMO_DB_ROOT` in the environment; the two database
    /// names default to the scrape pipeline's names.
    Serve {
        /// Address to listen on.
        #[arg(long, default_value = "127.0.0.1:8000")]
        bind: String,
    },

    /// Print the dashboard aggregates for a region.
    ///
    /// Issues the four chart fetches and renders indicators, top
    /// categories, reviewer demand, average ratings, monthly tip
    /// activity, and word frequencies. Sections without data render an
    /// informational notice.
    Report {
        /// Region to filter by (substring, case-insensitive).
        departamento: String,

        /// Base URL of a running query service.
        #[arg(long, default_value = "http://127.0.0.1:8000")]
        base_url: String,
    },

    /// Write the four-sheet spreadsheet artifact for a region.
    ///
    /// Every export carries the same four sheets; collections without
    /// data get a placeholder sheet. Fetch failures are reported, not
    /// swallowed.
    Export {
        /// Region to filter by (substring, case-insensitive).
        departamento: String,

        /// Base URL of a running query service.
        #[arg(long, default_value = "http://127.0.0.1:8000")]
        base_url: String,

        /// Output path. Defaults to `Datos_Completos_<region>.xlsx` in
        /// the current directory.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Liveness check against a running service.
    Ping {
        /// Base URL of a running query service.
        #[arg(long, default_value = "http://127.0.0.1:8000")]
        base_url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { bind } => {
            let cfg = config::Config::from_env()?;
            server::run_server(&cfg, &bind).await?;
        }
        Commands::Report {
            departamento,
            base_url,
        } => {
            report::run_report(&base_url, &departamento).await?;
        }
        Commands::Export {
            departamento,
            base_url,
            output,
        } => {
            export::run_export(&base_url, &departamento, output.as_deref()).await?;
        }
        Commands::Ping { base_url } => {
            let api = client::ApiClient::new(&base_url, client::CHART_TIMEOUT)?;
            let body = api.ping().await?;
            println!("{}", body);
        }
    }

    Ok(())
}
