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

//! Wire records of the Energidataservice datasets and their conversion
//!
//! Timestamps arrive naive. `TimeUTC` is authoritative; `TimeDK` is dropped
//! and the local time is recomputed in the caller's timezone instead.

use crate::error::{EnergiError, Result};
use crate::time::parse_api_naive;
use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use energi_types::{DayAheadPrice, ImbalancePrice, PriceArea, TariffRecord};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

const DROPPED_COLUMNS: &[&str] = &["TimeUTC", "TimeDK", "PriceArea"];

/// Envelope of every dataset response
#[derive(Debug, Deserialize)]
pub(crate) struct DatasetResponse<T> {
    #[serde(default)]
    pub total: Option<u64>,
    pub records: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawDayAheadPrice {
    #[serde(rename = "TimeUTC")]
    time_utc: String,
    #[serde(rename = "PriceArea")]
    price_area: String,
    #[serde(rename = "DayAheadPriceEUR", default)]
    price_eur: Option<f64>,
    #[serde(rename = "DayAheadPriceDKK", default)]
    price_dkk: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawImbalancePrice {
    #[serde(rename = "TimeUTC")]
    time_utc: String,
    #[serde(rename = "PriceArea")]
    price_area: String,
    #[serde(rename = "ImbalancePriceEUR", default)]
    imbalance_price_eur: Option<f64>,
    #[serde(rename = "ImbalancePriceDKK", default)]
    imbalance_price_dkk: Option<f64>,
    #[serde(rename = "SpotPriceEUR", default)]
    spot_price_eur: Option<f64>,
    #[serde(rename = "SpotPriceDKK", default)]
    spot_price_dkk: Option<f64>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawTariff {
    #[serde(rename = "ChargeOwner")]
    charge_owner: String,
    #[serde(rename = "Note")]
    note: String,
    #[serde(rename = "ChargeTypeCode", default)]
    charge_type_code: Option<String>,
    #[serde(rename = "Description", default)]
    description: Option<String>,
    #[serde(rename = "ValidFrom", alias = "FromDate")]
    valid_from: String,
    #[serde(rename = "ValidTo", alias = "ToDate", default)]
    valid_to: Option<String>,
    /// `Price1..Price24` and whatever else the row carries
    #[serde(flatten)]
    columns: BTreeMap<String, Value>,
}

fn utc_from_api(raw: &str) -> Result<DateTime<Utc>> {
    Ok(parse_api_naive(raw)?.and_utc())
}

impl RawDayAheadPrice {
    pub(crate) fn into_model(self, tz: Tz) -> Result<DayAheadPrice> {
        let time_utc = utc_from_api(&self.time_utc)?;
        Ok(DayAheadPrice {
            time_utc,
            time_local: time_utc.with_timezone(&tz),
            price_area: PriceArea::from(self.price_area),
            price_eur: self.price_eur,
            price_dkk: self.price_dkk,
        })
    }
}

impl RawImbalancePrice {
    pub(crate) fn into_model(mut self, tz: Tz) -> Result<ImbalancePrice> {
        let time_utc = utc_from_api(&self.time_utc)?;
        for column in DROPPED_COLUMNS {
            self.extra.remove(*column);
        }
        Ok(ImbalancePrice {
            time_utc,
            time_local: time_utc.with_timezone(&tz),
            price_area: PriceArea::from(self.price_area),
            imbalance_price_eur: self.imbalance_price_eur,
            imbalance_price_dkk: self.imbalance_price_dkk,
            spot_price_eur: self.spot_price_eur,
            spot_price_dkk: self.spot_price_dkk,
            extra: self.extra,
        })
    }
}

impl RawTariff {
    pub(crate) fn into_model(self) -> Result<TariffRecord> {
        let valid_from = parse_api_naive(&self.valid_from)?;
        let valid_to = self
            .valid_to
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(parse_api_naive)
            .transpose()?;

        let mut hourly_prices = [None; 24];
        for (hour, price) in hourly_prices.iter_mut().enumerate() {
            let column = format!("Price{}", hour + 1);
            *price = match self.columns.get(&column) {
                None | Some(Value::Null) => None,
                Some(Value::Number(n)) => n.as_f64(),
                Some(other) => {
                    return Err(EnergiError::Payload(format!(
                        "{column} of {} / {} is not a number: {other}",
                        self.charge_owner, self.note
                    )));
                }
            };
        }

        if valid_to.is_some_and(|to: NaiveDateTime| to <= valid_from) {
            return Err(EnergiError::Payload(format!(
                "price list entry of {} / {} ends before it starts",
                self.charge_owner, self.note
            )));
        }

        Ok(TariffRecord {
            charge_owner: self.charge_owner,
            note: self.note,
            charge_type_code: self.charge_type_code,
            description: self.description,
            valid_from,
            valid_to,
            hourly_prices,
        })
    }
}
