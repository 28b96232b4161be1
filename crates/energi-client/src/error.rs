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

//! Error types for the API clients

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnergiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("bad request (400): {message}")]
    BadRequest { message: String },

    #[error("authentication failed (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("rate limited (429), retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unsupported response content type '{0}'")]
    UnsupportedContent(String),

    #[error("malformed response: {0}")]
    Payload(String),

    #[error("invalid time '{input}': {reason}")]
    InvalidTime { input: String, reason: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("Eloverblik error {code}: {message}")]
    Eloverblik { code: i64, message: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("config file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("gave up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        last: Box<EnergiError>,
    },
}

impl EnergiError {
    /// Whether repeating the same request can succeed
    ///
    /// Transport failures and server-side statuses are retried. A request that
    /// could not be built, or a response that could not be decoded, is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => !e.is_builder(),
            Self::RateLimited { .. } | Self::Status { .. } => true,
            Self::BadRequest { .. }
            | Self::Unauthorized { .. }
            | Self::Decode(_)
            | Self::UnsupportedContent(_)
            | Self::Payload(_)
            | Self::InvalidTime { .. }
            | Self::InvalidInput(_)
            | Self::Eloverblik { .. }
            | Self::Config(_)
            | Self::Io(_)
            | Self::RetriesExhausted { .. } => false,
        }
    }

    pub fn invalid_time(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTime {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EnergiError>;
