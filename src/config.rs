//! Runtime configuration from command-line flags and environment.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::application::export::DEFAULT_EXPORT_FILE;
use crate::TriageError;

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogMode {
    /// File when attached to a terminal, stdout otherwise
    Auto,
    File,
    Stdout,
}

/// Triage console for the emergency scoring service.
#[derive(Debug, Clone, Parser)]
#[command(name = "triage-console", version, about)]
pub struct ConsoleConfig {
    /// Base URL of the scoring server
    #[arg(long, env = "TRIAGE_SERVER_URL", default_value = "http://localhost:5000")]
    pub server_url: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "TRIAGE_REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    pub request_timeout_secs: u64,

    /// Automatic ranking refresh interval in seconds (0 disables)
    #[arg(long, env = "TRIAGE_REFRESH_INTERVAL_SECS", default_value_t = 30)]
    pub refresh_interval_secs: u64,

    /// Destination of the CSV export
    #[arg(long, env = "TRIAGE_EXPORT_PATH", default_value = DEFAULT_EXPORT_FILE)]
    pub export_path: PathBuf,

    /// Seconds before a notification is dismissed automatically
    #[arg(long, env = "TRIAGE_NOTIFICATION_SECS", default_value_t = 5)]
    pub notification_secs: u64,

    #[arg(long, env = "TRIAGE_LOG_MODE", value_enum, default_value_t = LogMode::Auto)]
    pub log_mode: LogMode,

    #[arg(long, env = "TRIAGE_LOG_FILE", default_value = "triage-console.log")]
    pub log_file: PathBuf,
}

impl ConsoleConfig {
    /// Normalize and check the parsed values.
    ///
    /// # Errors
    /// Returns `TriageError::Config` for an unusable server URL or timeout.
    pub fn validated(mut self) -> crate::Result<Self> {
        let url = self.server_url.trim().trim_end_matches('/').to_string();
        if url.is_empty() {
            return Err(TriageError::Config("server URL is empty".into()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(TriageError::Config(format!(
                "server URL must start with http:// or https://, got {url}"
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(TriageError::Config(
                "request timeout must be at least one second".into(),
            ));
        }
        self.server_url = url;
        Ok(self)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Automatic refresh period, if enabled.
    #[must_use]
    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_interval_secs > 0).then(|| Duration::from_secs(self.refresh_interval_secs))
    }

    #[must_use]
    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.notification_secs)
    }
}
