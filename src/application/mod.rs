//! Application layer: console state, command execution and derived views.
//!
//! This module orchestrates domain types with the `TriageApi` port to
//! implement the console's use cases.

pub mod charts;
mod console;
mod executor;
pub mod export;
mod notifications;

pub use charts::ChartData;
pub use console::{Command, Console, ConsoleEvent, RefreshToken, VALIDATION_WARNING};
pub use executor::CommandExecutor;
pub use export::ExportSummary;
pub use notifications::{
    Notification, NotificationKind, Notifications, DEFAULT_NOTIFICATION_TTL,
};
