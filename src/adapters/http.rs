//! HTTP adapter: Implementation of `TriageApi` over the server's JSON API.
//!
//! Uses the blocking reqwest client; calls are issued from background
//! worker threads, never from the render loop.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::{IntakeForm, RankingSnapshot, TriageResult};
use crate::ports::{ApiError, TriageApi};

/// Client for the triage scoring server.
#[derive(Debug, Clone)]
pub struct HttpTriageClient {
    http: Client,
    base_url: String,
}

impl HttpTriageClient {
    /// Create a client for `base_url` with a per-request timeout.
    ///
    /// # Errors
    /// Returns `ApiError::Transport` if the TLS backend cannot be initialized.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(transport)?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { http, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl TriageApi for HttpTriageClient {
    fn predict(&self, form: &IntakeForm) -> Result<TriageResult, ApiError> {
        let url = self.url("/predict");
        tracing::debug!(%url, "POST predict");

        let response = self.http.post(&url).json(form).send().map_err(transport)?;
        read_json(response)
    }

    fn ranking(&self) -> Result<RankingSnapshot, ApiError> {
        let url = self.url("/ranking");
        tracing::debug!(%url, "GET ranking");

        let response = self.http.get(&url).send().map_err(transport)?;
        read_json(response)
    }

    fn mark_attended(&self, patient_id: u64) -> Result<(), ApiError> {
        let url = self.url(&format!("/marcar_atendido/{patient_id}"));
        tracing::debug!(%url, "POST marcar_atendido");

        let response = self.http.post(&url).send().map_err(transport)?;
        read_json::<Value>(response).map(|_| ())
    }
}

fn transport(err: reqwest::Error) -> ApiError {
    ApiError::Transport(err.to_string())
}

/// Decode a server response.
///
/// An `error` field wins over the HTTP status: the server reports failures
/// as `{"error": "..."}` with 4xx/5xx codes, and the message is what the
/// operator needs to see.
fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().map_err(transport)?;

    let value: Value = if body.trim().is_empty() {
        Value::Object(serde_json::Map::new())
    } else {
        match serde_json::from_str(&body) {
            Ok(value) => value,
            Err(_) if !status.is_success() => {
                return Err(ApiError::Server(format!("HTTP {}", status.as_u16())));
            }
            Err(e) => return Err(ApiError::Decode(e.to_string())),
        }
    };

    if let Some(error) = value.get("error").filter(|v| !v.is_null()) {
        let message = match error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(ApiError::Server(message));
    }

    if !status.is_success() {
        return Err(ApiError::Server(format!("HTTP {}", status.as_u16())));
    }

    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}
