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

//! Clients for the public Danish energy data APIs
//!
//! - [`energidataservice`]: day-ahead prices, imbalance prices and DSO grid
//!   tariffs from Energidataservice
//! - [`eloverblik`]: metering points and meter readings from Eloverblik
//!
//! Both share the [`http::ApiClient`] request layer and its
//! [`retry::RetryPolicy`].

pub mod config;
pub mod eloverblik;
pub mod energidataservice;
pub mod error;
pub mod http;
pub mod retry;
pub mod time;

pub use config::ClientConfig;
pub use eloverblik::Eloverblik;
pub use energidataservice::{EnergiDataService, PriceRequest, TariffRequest};
pub use error::{EnergiError, Result};
pub use retry::RetryPolicy;
pub use time::TimeWindow;
