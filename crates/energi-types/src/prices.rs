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

use crate::area::PriceArea;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Day-ahead (spot) price for one market time unit in one price area
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayAheadPrice {
    /// Start of the market time unit
    pub time_utc: DateTime<Utc>,

    /// Same instant in the timezone the caller asked for
    pub time_local: DateTime<Tz>,

    pub price_area: PriceArea,

    /// EUR/MWh, `None` until published
    pub price_eur: Option<f64>,

    /// DKK/MWh, `None` until published
    pub price_dkk: Option<f64>,
}

/// Imbalance settlement price for one time unit in one price area
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImbalancePrice {
    pub time_utc: DateTime<Utc>,
    pub time_local: DateTime<Tz>,
    pub price_area: PriceArea,
    pub imbalance_price_eur: Option<f64>,
    pub imbalance_price_dkk: Option<f64>,
    pub spot_price_eur: Option<f64>,
    pub spot_price_dkk: Option<f64>,

    /// Dataset columns without a dedicated field (volumes, directions, ...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ImbalancePrice {
    /// Numeric value of an extra column, if present and numeric
    pub fn extra_f64(&self, column: &str) -> Option<f64> {
        self.extra.get(column).and_then(Value::as_f64)
    }
}
