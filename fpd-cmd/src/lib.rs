//! Serve command for the fuel price dashboard.
//!
//! Loads the survey table once, snapshots it into an in-memory database and
//! serves the dashboard page and its JSON API until the process is stopped.

use clap::Args;
use fpd_db::Database;
use fpd_survey::{read_cleaned_table, source::fetch_cleaned_table, DEFAULT_SOURCE_URL};
use log::info;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub mod dispatch;
pub mod filter;
pub mod server;

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address the HTTP server listens on
    #[arg(short, long, default_value = "127.0.0.1:8050")]
    pub bind: SocketAddr,

    /// Location of the survey CSV to fetch at startup
    #[arg(long, default_value = DEFAULT_SOURCE_URL)]
    pub source_url: String,

    /// Load a local CSV (optionally gzip-compressed) instead of fetching
    #[arg(long, conflicts_with = "source_url")]
    pub source_file: Option<PathBuf>,
}

pub async fn run(args: ServeArgs) -> anyhow::Result<()> {
    let table = match &args.source_file {
        Some(path) => {
            info!("Loading survey data from {}", path.display());
            read_cleaned_table(path)?
        }
        None => {
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(60))
                .build()?;
            fetch_cleaned_table(&client, &args.source_url).await?
        }
    };
    let db = Database::from_table(&table)?;
    info!("Survey snapshot ready: {} records", table.len());
    server::serve(args.bind, db).await
}
