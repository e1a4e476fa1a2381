//! HTTP clients for the two remote services the form talks to.
//!
//! # Architecture
//!
//! - [`postal`] - postal-code (CEP) lookup, returning city and state
//! - [`registration`] - user registration, mapping server field errors back
//!   onto [`FieldName`]s
//!
//! Both clients share a hardened [`reqwest::Client`] configuration and apply a
//! whole-request timeout to every call. Timeouts surface as a dedicated error
//! variant so the caller can show a distinct message.

pub mod postal;
pub mod registration;

use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Url;
use reqwest::redirect::Policy;
use thiserror::Error;

pub use postal::{LookupError, PostalAddress, PostalClient};
pub use registration::{RegistrationClient, RegistrationReceipt, SubmitError};
pub use signup_types::{FieldErrors, FieldName, FormValues};

const CONNECT_TIMEOUT_SECS: u64 = 30;
const TCP_KEEPALIVE_SECS: u64 = 60;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

/// Upper bound on error bodies read from either endpoint.
pub(crate) const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("invalid endpoint URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

fn base_client_builder() -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .redirect(Policy::none())
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
        .user_agent(concat!("signup/", env!("CARGO_PKG_VERSION")))
}

/// Build a client whose requests time out after `timeout`.
pub fn http_client_with_timeout(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    base_client_builder().timeout(timeout).build()
}

/// Read at most [`MAX_ERROR_BODY_BYTES`] of a response body as lossy UTF-8.
///
/// Returns `None` when the body was cut off, since a truncated JSON document
/// cannot be parsed anyway.
pub(crate) async fn read_capped_body(response: reqwest::Response) -> Option<String> {
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let Ok(chunk) = chunk else { break };
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            tracing::warn!("Discarding error body larger than {MAX_ERROR_BODY_BYTES} bytes");
            return None;
        }
    }
    Some(String::from_utf8_lossy(&body).into_owned())
}

/// Parse an endpoint URL that must be able to take path segments.
pub(crate) fn parse_endpoint(raw: &str) -> Result<Url, ClientBuildError> {
    let url = Url::parse(raw.trim()).map_err(|e| ClientBuildError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ClientBuildError::InvalidUrl {
            url: raw.to_string(),
            reason: "expected an http(s) URL".to_string(),
        });
    }
    Ok(url)
}
