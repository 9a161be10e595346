//! FPD CLI - Serves the Brazilian fuel price dashboard.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "fpd-cli",
    version,
    about = "Dashboard of gasoline resale prices in Brazil"
)]
struct Cli {
    #[command(flatten)]
    serve: fpd_cmd::ServeArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("starting with {:?}", cli.serve);
    fpd_cmd::run(cli.serve).await
}
