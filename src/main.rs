use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mfentry::auth::TerminalOtpPrompter;
use mfentry::browser::ChromeDriver;
use mfentry::config::{default_config_path, Config};
use mfentry::credentials::Credentials;
use mfentry::pipeline::RowPipeline;
use mfentry::runner;
use mfentry::session::Session;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "mfentry")]
#[command(about = "Enter transactions from a CSV file into MoneyForward's manual-entry form")]
struct Cli {
    /// Import file (日付,内容,金額,保有金融機関,大項目,中項目,メモ,振替,ID)
    input: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(
                "info,chromiumoxide=warn,chromiumoxide::conn=off,chromiumoxide::handler=off",
            )
        }))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true),
        )
        .init();

    let cli = Cli::parse();

    let config_path = default_config_path();
    let config = Config::load_or_default(&config_path)
        .with_context(|| format!("Failed to load config: {}", config_path.display()))?;

    println!("Start: {}", cli.input.display());

    // Everything that can fail without a browser is checked first.
    let pipeline = RowPipeline::load(&cli.input)?;
    let store = config.credentials.build();
    let credentials = Credentials::load(store.as_ref())
        .await
        .context("Failed to load login credentials")?;

    let driver = ChromeDriver::launch(&config.browser).await?;
    let session = Session::new(driver, config.timing.clone());

    let result = runner::run(
        session,
        &config.site,
        &credentials,
        &TerminalOtpPrompter,
        &pipeline,
    )
    .await;

    println!("End: {}", cli.input.display());
    let report = result?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
