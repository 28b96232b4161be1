// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of EnergiData.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Generic HTTP layer shared by the API clients

use crate::error::{EnergiError, Result};
use crate::retry::RetryPolicy;
use reqwest::header::{CONTENT_TYPE, HeaderMap, RETRY_AFTER};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, trace};

const USER_AGENT: &str = concat!("energi-data/", env!("CARGO_PKG_VERSION"));

/// HTTP client issuing requests under a [`RetryPolicy`] and decoding the body
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    retry: RetryPolicy,
}

impl ApiClient {
    pub fn new(timeout: Duration, retry: RetryPolicy) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| EnergiError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, retry })
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Set custom retry configuration
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// GET `url` with query parameters
    pub async fn get(
        &self,
        url: &str,
        query: &[(String, String)],
        bearer: Option<&str>,
    ) -> Result<Value> {
        debug!("GET {url}");
        trace!("   Query: {query:?}");

        self.retry
            .run(url, || async move {
                let request = authorize(self.client.get(url).query(query), bearer);
                let response = request.send().await?;
                decode_response(response).await
            })
            .await
    }

    /// POST a JSON body to `url`
    pub async fn post_json(&self, url: &str, body: &Value, bearer: Option<&str>) -> Result<Value> {
        debug!("POST {url}");
        trace!("   Body: {body}");

        self.retry
            .run(url, || async move {
                let request = authorize(self.client.post(url).json(body), bearer);
                let response = request.send().await?;
                decode_response(response).await
            })
            .await
    }
}

fn authorize(request: RequestBuilder, bearer: Option<&str>) -> RequestBuilder {
    match bearer {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

/// Seconds form of `Retry-After`; the HTTP-date form is not honoured
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Map the status line to an error, or decode the body of a success
async fn decode_response(response: Response) -> Result<Value> {
    let status = response.status();

    if !status.is_success() {
        let wait = retry_after(response.headers());
        let message = response.text().await.unwrap_or_default();
        return Err(status_error(status, wait, message));
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_lowercase();
    let body = response.bytes().await?;
    decode_body(&content_type, &body)
}

fn status_error(status: StatusCode, retry_after: Option<Duration>, message: String) -> EnergiError {
    match status {
        StatusCode::BAD_REQUEST => EnergiError::BadRequest { message },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => EnergiError::Unauthorized {
            status: status.as_u16(),
        },
        StatusCode::TOO_MANY_REQUESTS => EnergiError::RateLimited { retry_after },
        status => EnergiError::Status {
            status: status.as_u16(),
            message,
        },
    }
}

/// Decode a response body according to its content type
///
/// Both services answer in JSON. A body without a JSON content type is still
/// tried as JSON before giving up.
pub fn decode_body(content_type: &str, body: &[u8]) -> Result<Value> {
    if content_type.contains("json") {
        return Ok(serde_json::from_slice(body)?);
    }

    serde_json::from_slice(body).map_err(|_| {
        let shown = if content_type.is_empty() {
            "unknown"
        } else {
            content_type
        };
        EnergiError::UnsupportedContent(shown.to_owned())
    })
}
