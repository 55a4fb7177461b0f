//! TUI module: Terminal User Interface using Ratatui.
//!
//! Provides the operator console for:
//! - Patient intake
//! - Classification results
//! - The ranked waiting list with charts

mod app;
mod styles;
mod ui;
mod worker;

pub use app::{App, Screen};
pub use styles::TriageTheme;
pub use worker::RequestWorker;
