//! Adapters layer: Concrete implementations of ports.
//!
//! - `http`: reqwest client for the triage scoring server
//! - `sanitize`: redaction of clinical data in log output

pub mod http;
pub mod sanitize;

pub use http::HttpTriageClient;
