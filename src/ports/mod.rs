//! Ports layer: Trait definitions for external operations.
//!
//! The scoring server is the only external system the console talks to.

mod triage_api;

pub use triage_api::{ApiError, TriageApi};
