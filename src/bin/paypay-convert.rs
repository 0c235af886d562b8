use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mfentry::config::{default_config_path, Config};
use mfentry::convert::{convert_file, default_output_path};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "paypay-convert")]
#[command(about = "Convert a PayPay transaction export into an mfentry import file")]
struct Cli {
    /// PayPay export (CSV)
    input: PathBuf,

    /// Output path [default: <input>_mf.csv]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();

    let cli = Cli::parse();

    let config_path = default_config_path();
    let config = Config::load_or_default(&config_path)
        .with_context(|| format!("Failed to load config: {}", config_path.display()))?;

    let output = cli
        .output
        .unwrap_or_else(|| default_output_path(&cli.input));
    let summary = convert_file(&cli.input, &output, &config.convert)?;

    info!(
        written = summary.written,
        skipped = summary.skipped,
        "Converted PayPay export"
    );
    println!("{}", output.display());
    Ok(())
}
