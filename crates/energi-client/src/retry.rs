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

//! Retry policy applied to every API request

use crate::error::{EnergiError, Result};
use std::future::Future;
use std::time::Duration;
use tracing::{error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,

    /// Pause after a failed attempt
    pub delay: Duration,

    /// Pause after a 429 without a usable `Retry-After` header
    pub rate_limit_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
            rate_limit_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no waiting
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Run `request` until it succeeds, fails permanently or runs out of attempts
    ///
    /// A 429 waits for the server-provided `Retry-After` (or
    /// `rate_limit_delay`) and ends in [`EnergiError::RetriesExhausted`] when
    /// it hits the last attempt. Other retryable errors wait `delay` and the
    /// final one is returned as is.
    pub async fn run<T, F, Fut>(&self, label: &str, mut request: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match request().await {
                Ok(value) => return Ok(value),
                Err(EnergiError::RateLimited { retry_after }) => {
                    if attempt >= max_attempts {
                        error!("Rate limited (429) on {label}, max retries reached");
                        return Err(EnergiError::RetriesExhausted {
                            attempts: attempt,
                            last: Box::new(EnergiError::RateLimited { retry_after }),
                        });
                    }
                    let wait = retry_after.unwrap_or(self.rate_limit_delay);
                    warn!("Rate limited (429) on {label}. Waiting {wait:?} before retrying");
                    tokio::time::sleep(wait).await;
                }
                Err(e) if !e.is_retryable() => {
                    error!("Request to {label} failed, not retrying: {e}");
                    return Err(e);
                }
                Err(e) if attempt >= max_attempts => {
                    error!("Request to {label} failed after {attempt} attempts: {e}");
                    return Err(e);
                }
                Err(e) => {
                    warn!(
                        "Attempt {attempt}/{max_attempts} for {label} failed: {e}. Retrying in {:?}",
                        self.delay
                    );
                    tokio::time::sleep(self.delay).await;
                }
            }
        }
    }
}
