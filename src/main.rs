use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use promptdeck::cli::Cli;
use promptdeck::config::Config;
use promptdeck::utils::report_error;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    // Ensure configuration exists and load it
    let config = match &cli.config {
        Some(config_path) => Config::load_custom(config_path)?,
        None => {
            Config::ensure_config_exists()?;
            Config::load()?
        }
    };

    if !config.general.color {
        colored::control::set_override(false);
    }

    if let Err(err) = cli.command.execute(config).await {
        report_error(&err);
        std::process::exit(1);
    }

    Ok(())
}

/// Logs go to stderr so `--format json` output stays parseable
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("promptdeck=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("promptdeck=warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
