mod config;
mod main_lib;

use clap::Parser;
use config::{Cli, Config};
use main_lib::{init_tracing, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?.with_cli(&cli);
    init_tracing();

    tracing::info!(
        "Fetching {:?} into {}",
        config.sources,
        config.output_dir.display()
    );
    let report = run(&config).await?;
    tracing::info!(
        "Wrote {} files ({} write failures)",
        report.written.len(),
        report.write_failures
    );

    if report.all_failed() {
        tracing::error!("Every attempted market type failed");
        std::process::exit(1);
    }
    Ok(())
}
