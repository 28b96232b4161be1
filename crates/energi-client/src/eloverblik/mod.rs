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

//! Eloverblik customer API client
//!
//! Requests are authorized with a short-lived data access token obtained from
//! the user's refresh token and cached in the client.

mod types;

use crate::config::ClientConfig;
use crate::error::{EnergiError, Result};
use crate::http::ApiClient;
use chrono::NaiveDate;
use chrono_tz::Tz;
use energi_types::{Aggregation, MeterReading, MeteringPoint};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use types::{Envelope, MeteringPointIds, TimeSeriesRequest, TimeSeriesResult, flatten_time_series};

pub const DEFAULT_BASE_URL: &str = "https://api.eloverblik.dk/customerapi/api/";

/// Data access tokens are valid for 24 hours; renew an hour early
pub const TOKEN_TTL: Duration = Duration::from_secs(23 * 60 * 60);

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    fetched_at: Instant,
}

#[derive(Debug, Clone)]
pub struct Eloverblik {
    api: ApiClient,
    base_url: String,
    refresh_token: String,
    token_ttl: Duration,
    token: Arc<Mutex<Option<CachedToken>>>,
    tz: Tz,
}

impl Eloverblik {
    pub fn new(api: ApiClient, refresh_token: impl Into<String>) -> Self {
        Self::with_base_url(api, DEFAULT_BASE_URL, refresh_token)
    }

    pub fn with_base_url(api: ApiClient, base_url: &str, refresh_token: impl Into<String>) -> Self {
        let mut base_url = base_url.trim().to_owned();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            api,
            base_url,
            refresh_token: refresh_token.into(),
            token_ttl: TOKEN_TTL,
            token: Arc::new(Mutex::new(None)),
            tz: chrono_tz::Europe::Copenhagen,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self::with_base_url(
            config.api_client()?,
            &config.eloverblik.base_url,
            config.refresh_token()?,
        ))
    }

    /// Override how long an access token is reused
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Data access token, exchanged for the refresh token when none is cached
    pub async fn access_token(&self) -> Result<String> {
        let cached = self
            .token
            .lock()
            .as_ref()
            .filter(|cached| cached.fetched_at.elapsed() < self.token_ttl)
            .map(|cached| cached.value.clone());
        if let Some(value) = cached {
            return Ok(value);
        }

        debug!("Requesting Eloverblik data access token");
        let value = self
            .api
            .get(&self.url("token"), &[], Some(&self.refresh_token))
            .await?;
        let Envelope { result } = serde_json::from_value::<Envelope<String>>(value)?;
        if result.trim().is_empty() {
            return Err(EnergiError::Payload("empty data access token".to_owned()));
        }

        *self.token.lock() = Some(CachedToken {
            value: result.clone(),
            fetched_at: Instant::now(),
        });
        info!("Obtained Eloverblik data access token");
        Ok(result)
    }

    /// Forget the cached access token
    pub fn invalidate_token(&self) {
        self.token.lock().take();
    }

    /// Run `call` with an access token, renewing the token once on 401/403
    async fn authorized<T, F, Fut>(&self, mut call: F) -> Result<T>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let token = self.access_token().await?;
        match call(token).await {
            Err(EnergiError::Unauthorized { status }) => {
                warn!("Eloverblik rejected the access token ({status}), renewing it");
                self.invalidate_token();
                let token = self.access_token().await?;
                call(token).await
            }
            other => other,
        }
    }

    /// Metering points linked to the customer; `include_all` adds those
    /// shared by third parties
    pub async fn metering_points(&self, include_all: bool) -> Result<Vec<MeteringPoint>> {
        let url = &self.url("meteringpoints/meteringpoints");
        let query = &[("includeAll".to_owned(), include_all.to_string())];

        let value = self
            .authorized(|token| async move { self.api.get(url, query, Some(&token)).await })
            .await?;
        let Envelope { result } = serde_json::from_value::<Envelope<Vec<MeteringPoint>>>(value)?;

        info!("Fetched {} metering points", result.len());
        Ok(result)
    }

    /// Meter readings of `metering_points` for the days `[from, to)`
    ///
    /// `to` is exclusive, as Eloverblik treats it; one day is `(day, day + 1)`.
    pub async fn time_series(
        &self,
        metering_points: &[String],
        from: NaiveDate,
        to: NaiveDate,
        aggregation: Aggregation,
    ) -> Result<Vec<MeterReading>> {
        if from >= to {
            return Err(EnergiError::InvalidInput(format!(
                "to date {to} must be after from date {from}"
            )));
        }
        if metering_points.is_empty() {
            return Err(EnergiError::InvalidInput(
                "no metering points requested".to_owned(),
            ));
        }

        let url = &self.url(&format!(
            "meterdata/gettimeseries/{}/{}/{}",
            from.format(DATE_FORMAT),
            to.format(DATE_FORMAT),
            aggregation
        ));
        let body = &serde_json::to_value(TimeSeriesRequest {
            metering_points: MeteringPointIds {
                metering_point: metering_points,
            },
        })?;

        let value = self
            .authorized(|token| async move { self.api.post_json(url, body, Some(&token)).await })
            .await?;
        let Envelope { result } = serde_json::from_value::<Envelope<Vec<TimeSeriesResult>>>(value)?;

        let readings = flatten_time_series(result, self.tz)?;
        info!(
            "Fetched {} readings for {} metering points",
            readings.len(),
            metering_points.len()
        );
        Ok(readings)
    }
}
