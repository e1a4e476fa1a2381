//! User registration endpoint.
//!
//! The form is POSTed as JSON using the field wire names. A 2xx answer is a
//! success regardless of its body. Anything else may carry
//! `{"errors": {"<field>": "message" | ["message", ...]}}`, which is mapped
//! back onto [`FieldName`]s.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde::de::IgnoredAny;
use thiserror::Error;

use signup_types::{FieldErrors, FieldName, FormValues, sanitize_server_text};

use crate::{ClientBuildError, http_client_with_timeout, parse_endpoint, read_capped_body};

/// What a successful registration returned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationReceipt {
    pub message: Option<String>,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    /// The server named one or more fields it rejected.
    #[error("registration rejected (HTTP {status}) with {} field error(s)", errors.len())]
    Rejected {
        status: StatusCode,
        errors: FieldErrors,
    },
    /// Non-success status without usable field errors.
    #[error("registration failed with HTTP {0}")]
    Status(StatusCode),
    #[error("registration timed out")]
    Timeout,
    #[error("registration request failed: {0}")]
    Transport(#[source] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct SuccessBody {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: BTreeMap<String, ErrorValue>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorValue {
    One(String),
    Many(Vec<String>),
    Other(IgnoredAny),
}

impl ErrorValue {
    fn first_message(&self) -> Option<&str> {
        match self {
            Self::One(message) => Some(message.as_str()),
            Self::Many(messages) => messages.first().map(String::as_str),
            Self::Other(_) => None,
        }
    }
}

/// Map a raw error body onto form fields. Unknown keys and non-string values
/// are dropped.
fn parse_field_errors(body: &str) -> FieldErrors {
    let parsed: ErrorBody = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::debug!("Registration error body is not structured: {e}");
            return FieldErrors::new();
        }
    };

    let mut errors = FieldErrors::new();
    for (key, value) in &parsed.errors {
        let Ok(field) = FieldName::parse(key) else {
            tracing::warn!(field = %key, "Ignoring error for unknown field");
            continue;
        };
        let Some(message) = value.first_message() else {
            tracing::warn!(%field, "Ignoring non-text field error");
            continue;
        };
        let message = sanitize_server_text(message);
        if !message.is_empty() {
            errors.set(field, message.into_owned());
        }
    }
    errors
}

/// Client for the registration endpoint. Cheap to clone.
#[derive(Debug, Clone)]
pub struct RegistrationClient {
    http: reqwest::Client,
    url: Url,
}

impl RegistrationClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, ClientBuildError> {
        Ok(Self {
            http: http_client_with_timeout(timeout)?,
            url: parse_endpoint(url)?,
        })
    }

    pub async fn register(&self, values: &FormValues) -> Result<RegistrationReceipt, SubmitError> {
        tracing::debug!(url = %self.url, "Submitting registration");

        let response = self
            .http
            .post(self.url.clone())
            .header(ACCEPT, "application/json")
            .json(values)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SubmitError::Timeout
                } else {
                    SubmitError::Transport(e)
                }
            })?;

        let status = response.status();
        if status.is_success() {
            let message = match response.json::<SuccessBody>().await {
                Ok(body) => body
                    .message
                    .map(|m| sanitize_server_text(&m).into_owned()),
                Err(e) => {
                    tracing::debug!("Ignoring unreadable success body: {e}");
                    None
                }
            };
            return Ok(RegistrationReceipt { message });
        }

        let errors = read_capped_body(response)
            .await
            .map(|body| parse_field_errors(&body))
            .unwrap_or_default();
        if errors.is_empty() {
            tracing::warn!(%status, "Registration failed without field errors");
            Err(SubmitError::Status(status))
        } else {
            tracing::info!(%status, fields = errors.len(), "Registration rejected");
            Err(SubmitError::Rejected { status, errors })
        }
    }
}
