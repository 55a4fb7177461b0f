//! Triage console: operator terminal for the emergency triage scoring service.
//!
//! Main entry point for the terminal application.

use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use triage_console::adapters::sanitize::RedactingMakeWriter;
use triage_console::config::{ConsoleConfig, LogMode};
use triage_console::tui::App;

fn main() -> Result<()> {
    let config = ConsoleConfig::parse().validated()?;

    // Writing logs to the terminal would corrupt the TUI (alternate screen):
    // interactive sessions log to a file, non-interactive ones to stdout.
    let interactive = std::io::stdout().is_terminal();
    let use_file = match config.log_mode {
        LogMode::File => true,
        LogMode::Stdout => false,
        LogMode::Auto => interactive,
    };

    let (writer, _guard) = if use_file {
        if let Some(parent) = config.log_file.parent() {
            // Best-effort: a missing directory surfaces as the open error below.
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stdout())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(!use_file)
                .with_writer(RedactingMakeWriter::new(writer)),
        )
        .init();

    tracing::info!(
        server_url = %config.server_url,
        refresh_interval_secs = config.refresh_interval_secs,
        export_path = %config.export_path.display(),
        "Starting triage console..."
    );

    let mut app = App::new(&config)?;
    app.run()?;

    tracing::info!("Triage console shutdown complete.");
    Ok(())
}
