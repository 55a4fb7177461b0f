//! Triage API port: Trait for the remote scoring server.
//!
//! This trait abstracts the HTTP transport from the console logic so the
//! command executor can run against an in-memory fake in tests.

use crate::domain::{IntakeForm, RankingSnapshot, TriageResult};

/// Errors returned by the scoring server or the transport beneath it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// The server answered with an `{"error": ...}` body.
    #[error("{0}")]
    Server(String),

    /// Connection, TLS or timeout failure.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The body was not the JSON shape we expect.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Message shown to the operator.
    ///
    /// Server errors are shown verbatim; transport and decoding failures are
    /// prefixed with `context`, which names the action that failed.
    #[must_use]
    pub fn user_message(&self, context: &str) -> String {
        match self {
            Self::Server(message) => format!("Error: {message}"),
            Self::Transport(message) | Self::Decode(message) => format!("{context}: {message}"),
        }
    }
}

/// Operations offered by the triage scoring server.
pub trait TriageApi: Send + Sync {
    /// Score a patient and register it in the server-side waiting list.
    ///
    /// # Errors
    /// Returns `ApiError::Server` if the server rejects the form.
    fn predict(&self, form: &IntakeForm) -> Result<TriageResult, ApiError>;

    /// Fetch the ranked waiting list with aggregate statistics.
    ///
    /// # Errors
    /// Returns error if the request or decoding fails.
    fn ranking(&self) -> Result<RankingSnapshot, ApiError>;

    /// Mark a patient as attended.
    ///
    /// # Errors
    /// Returns `ApiError::Server` for unknown patient ids.
    fn mark_attended(&self, patient_id: u64) -> Result<(), ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message() {
        let server = ApiError::Server("Paciente no encontrado".into());
        assert_eq!(
            server.user_message("Error al obtener ranking"),
            "Error: Paciente no encontrado"
        );

        let transport = ApiError::Transport("connection refused".into());
        assert_eq!(
            transport.user_message("Error al conectar con el servidor"),
            "Error al conectar con el servidor: connection refused"
        );
    }
}
