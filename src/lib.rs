//! # Triage Console
//!
//! Terminal console for an emergency-department triage scoring service.
//!
//! This crate provides:
//! - Patient intake with local validation of vital signs
//! - Submission to the remote scoring server and display of the classification
//! - A server-ranked waiting list with distribution and risk charts
//! - Attendance tracking and CSV export of the ranking
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Intake form, triage levels, ranking types
//! - `ports`: The `TriageApi` trait for the scoring server
//! - `adapters`: reqwest HTTP client, log redaction
//! - `application`: Console state machine, command executor, charts, export
//! - `config`: Command-line and environment configuration
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{IntakeForm, RankingEntry, TriageLevel, TriageResult};
pub use ports::{ApiError, TriageApi};

/// Result type for triage console operations
pub type Result<T> = std::result::Result<T, TriageError>;

/// Main error type for the triage console
#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("Scoring server request failed: {0}")]
    Api(#[from] ports::ApiError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
