//! CFD CLI - inspect the SQL and render specs behind the damage dashboard.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "cfd-cli",
    version,
    about = "Camp Fire damage dashboard toolkit"
)]
struct Cli {
    /// JSON file overriding the built-in dashboard configuration
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: cfd_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!(
        "[CFD Debug] cli: config {}",
        cli.config.as_deref().unwrap_or("<built-in>")
    );
    let config = cfd_cmd::load_config(cli.config.as_deref())?;
    cfd_cmd::run(cli.command, &config).await
}
