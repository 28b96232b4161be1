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

//! Client configuration loaded from TOML

use crate::eloverblik;
use crate::energidataservice;
use crate::error::{EnergiError, Result};
use crate::http::ApiClient;
use crate::retry::RetryPolicy;
use crate::time::parse_tz;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Environment variable consulted when the config holds no refresh token
pub const REFRESH_TOKEN_ENV: &str = "ELOVERBLIK_REFRESH_TOKEN";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Timezone naive time input is read in ("CET", "Europe/Copenhagen", ...)
    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default)]
    pub http: HttpSettings,

    #[serde(default)]
    pub retry: RetrySettings,

    #[serde(default)]
    pub energidataservice: EnergiDataServiceSettings,

    #[serde(default)]
    pub eloverblik: EloverblikSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    #[serde(default = "default_rate_limit_delay_secs")]
    pub rate_limit_delay_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergiDataServiceSettings {
    #[serde(default = "default_energidataservice_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EloverblikSettings {
    #[serde(default = "default_eloverblik_url")]
    pub base_url: String,

    /// Long-lived token created in the Eloverblik portal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

fn default_timezone() -> String {
    "CET".to_owned()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    3
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_rate_limit_delay_secs() -> u64 {
    60
}

fn default_energidataservice_url() -> String {
    energidataservice::DEFAULT_BASE_URL.to_owned()
}

fn default_eloverblik_url() -> String {
    eloverblik::DEFAULT_BASE_URL.to_owned()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            http: HttpSettings::default(),
            retry: RetrySettings::default(),
            energidataservice: EnergiDataServiceSettings::default(),
            eloverblik: EloverblikSettings::default(),
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
            rate_limit_delay_secs: default_rate_limit_delay_secs(),
        }
    }
}

impl Default for EnergiDataServiceSettings {
    fn default() -> Self {
        Self {
            base_url: default_energidataservice_url(),
        }
    }
}

impl Default for EloverblikSettings {
    fn default() -> Self {
        Self {
            base_url: default_eloverblik_url(),
            refresh_token: None,
        }
    }
}

impl ClientConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| EnergiError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` when given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        parse_tz(&self.timezone)
            .map_err(|e| EnergiError::Config(format!("timezone: {e}")))?;
        if self.http.timeout_secs == 0 {
            return Err(EnergiError::Config(
                "http.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(EnergiError::Config(
                "retry.max_attempts must be at least 1".to_owned(),
            ));
        }
        for (key, url) in [
            ("energidataservice.base_url", &self.energidataservice.base_url),
            ("eloverblik.base_url", &self.eloverblik.base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(EnergiError::Config(format!(
                    "{key} must be an http(s) URL, got '{url}'"
                )));
            }
        }
        Ok(())
    }

    pub fn tz(&self) -> Result<Tz> {
        parse_tz(&self.timezone)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry.max_attempts,
            delay: Duration::from_millis(self.retry.delay_ms),
            rate_limit_delay: Duration::from_secs(self.retry.rate_limit_delay_secs),
        }
    }

    pub fn api_client(&self) -> Result<ApiClient> {
        ApiClient::new(
            Duration::from_secs(self.http.timeout_secs),
            self.retry_policy(),
        )
    }

    /// Refresh token from config, falling back to `ELOVERBLIK_REFRESH_TOKEN`
    pub fn refresh_token(&self) -> Result<String> {
        self.refresh_token_with(|name| std::env::var(name).ok())
    }

    fn refresh_token_with(&self, env: impl Fn(&str) -> Option<String>) -> Result<String> {
        self.eloverblik
            .refresh_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| env(REFRESH_TOKEN_ENV))
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                EnergiError::Config(format!(
                    "Eloverblik refresh token not found in config or {REFRESH_TOKEN_ENV} environment variable"
                ))
            })
    }
}
