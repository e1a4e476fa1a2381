//! Postal-code (CEP) lookup against a BrasilAPI-compatible service.
//!
//! `GET {base}/api/cep/v2/{zipcode}` answers with a JSON object carrying at
//! least `city` and `state`. Either key may be missing; callers treat a
//! missing key as an empty value.

use std::time::Duration;

use reqwest::{StatusCode, Url};
use serde::Deserialize;
use thiserror::Error;

use crate::{ClientBuildError, http_client_with_timeout, parse_endpoint};

/// City and state resolved from a postal code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PostalAddress {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

impl PostalAddress {
    /// City and state with missing values mapped to empty strings.
    #[must_use]
    pub fn into_city_state(self) -> (String, String) {
        (self.city.unwrap_or_default(), self.state.unwrap_or_default())
    }
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("postal lookup timed out")]
    Timeout,
    #[error("postal lookup returned HTTP {0}")]
    Status(StatusCode),
    #[error("postal lookup request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("postal lookup returned an unreadable body: {0}")]
    Decode(#[source] reqwest::Error),
}

impl LookupError {
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    fn from_reqwest(err: reqwest::Error, decoding: bool) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if decoding || err.is_decode() {
            Self::Decode(err)
        } else {
            Self::Transport(err)
        }
    }
}

/// Client for the postal lookup endpoint. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PostalClient {
    http: reqwest::Client,
    base: Url,
}

impl PostalClient {
    pub fn new(base: &str, timeout: Duration) -> Result<Self, ClientBuildError> {
        Ok(Self {
            http: http_client_with_timeout(timeout)?,
            base: parse_endpoint(base)?,
        })
    }

    /// URL queried for `zipcode`. The code is a single path segment, so a
    /// stray `/` or `?` in user input is percent-encoded.
    #[must_use]
    pub fn lookup_url(&self, zipcode: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["api", "cep", "v2", zipcode.trim()]);
        }
        url
    }

    pub async fn lookup(&self, zipcode: &str) -> Result<PostalAddress, LookupError> {
        let url = self.lookup_url(zipcode);
        tracing::debug!(%url, "Postal lookup started");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| LookupError::from_reqwest(e, false))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(%status, "Postal lookup rejected");
            return Err(LookupError::Status(status));
        }

        response
            .json::<PostalAddress>()
            .await
            .map_err(|e| LookupError::from_reqwest(e, true))
    }
}
