mod args;
mod commands;
mod render;
mod settings;
mod transport;

use std::time::Duration;

use anyhow::Context;
use books_core::Synchronizer;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::args::Cli;
use crate::settings::Settings;
use crate::transport::UreqTransport;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load books settings")?;
    if let Some(base_url) = cli.base_url {
        settings.api.base_url = base_url;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        settings.api.timeout_ms = timeout_ms;
    }

    // Logs go to stderr so stdout stays the table.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.telemetry.log_level)),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .ok();

    tracing::debug!(
        base_url = %settings.api.base_url,
        timeout_ms = settings.api.timeout_ms,
        "settings loaded"
    );

    let transport = UreqTransport::new(Duration::from_millis(settings.api.timeout_ms));
    let mut sync = Synchronizer::new(&settings.api.base_url);

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    commands::run(
        cli.command,
        &mut sync,
        &transport,
        &mut stdin.lock(),
        &mut stdout.lock(),
    )
}
