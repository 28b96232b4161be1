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

//! DSO grid tariffs
//!
//! The DataHub price list publishes hourly tariffs per (DSO, tariff) pair with
//! validity windows in Danish local time. They are expanded onto a 15-minute
//! grid so they line up with the quarter-hourly day-ahead prices.

use super::records::RawTariff;
use super::{DatasetQuery, EnergiDataService, PRICELIST_DATASET};
use crate::error::{EnergiError, Result};
use crate::time::{DEFAULT_TZ, TimeWindow};
use chrono::Timelike;
use chrono_tz::Tz;
use energi_types::{TariffColumn, TariffRecord, TariffSlot, TariffTable};
use tracing::{debug, info, warn};

pub const DEFAULT_DSO: &str = "Radius Elnet A/S";
pub const DEFAULT_TARIFF: &str = "Nettarif C";

#[derive(Debug, Clone, PartialEq)]
pub struct TariffRequest {
    pub start: String,
    pub end: Option<String>,

    /// Timezone naive input is read in
    pub tz: Tz,

    /// Charge owners, e.g. "Radius Elnet A/S"
    pub dsos: Vec<String>,

    /// Tariff names (the price list `Note`), e.g. "Nettarif C"
    pub tariffs: Vec<String>,
}

impl TariffRequest {
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: None,
            tz: DEFAULT_TZ,
            dsos: vec![DEFAULT_DSO.to_owned()],
            tariffs: vec![DEFAULT_TARIFF.to_owned()],
        }
    }

    pub fn end(mut self, end: impl Into<String>) -> Self {
        self.end = Some(end.into());
        self
    }

    pub fn tz(mut self, tz: Tz) -> Self {
        self.tz = tz;
        self
    }

    pub fn dsos<I, S>(mut self, dsos: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dsos = dsos.into_iter().map(Into::into).collect();
        self
    }

    pub fn tariffs<I, S>(mut self, tariffs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tariffs = tariffs.into_iter().map(Into::into).collect();
        self
    }

    /// Grid window, always laid out on the Danish (CET) clock
    pub fn window(&self) -> Result<TimeWindow> {
        TimeWindow::from_input(&self.start, self.end.as_deref(), self.tz, DEFAULT_TZ)
    }

    /// Table columns ordered by DSO, then tariff
    pub fn columns(&self) -> Vec<TariffColumn> {
        self.dsos
            .iter()
            .flat_map(|dso| {
                self.tariffs
                    .iter()
                    .map(move |tariff| TariffColumn::new(dso.as_str(), tariff.as_str()))
            })
            .collect()
    }

    fn query(&self) -> DatasetQuery {
        DatasetQuery::new(PRICELIST_DATASET)
            .filter("ChargeOwner", self.dsos.iter().map(String::as_str))
            .filter("Note", self.tariffs.iter().map(String::as_str))
            .limit(0)
    }
}

impl EnergiDataService {
    /// Grid tariffs of the requested DSOs on a 15-minute grid
    pub async fn dso_tariffs(&self, request: &TariffRequest) -> Result<TariffTable> {
        if request.dsos.is_empty() || request.tariffs.is_empty() {
            return Err(EnergiError::InvalidInput(
                "at least one DSO and one tariff are required".to_owned(),
            ));
        }
        let window = request.window()?;

        let raw: Vec<RawTariff> = self.fetch_records(&request.query()).await?;
        let records = raw
            .into_iter()
            .map(RawTariff::into_model)
            .collect::<Result<Vec<_>>>()?;
        debug!("Received {} price list entries", records.len());

        let table = expand_tariffs(&records, request.columns(), &window);
        info!(
            "Expanded {} tariff columns onto {} slots",
            table.columns.len(),
            table.len()
        );
        Ok(table)
    }
}

/// Lay tariff records out on the 15-minute grid of `window`
///
/// Each slot takes the price of its local hour from the record valid at the
/// slot start. Where validity windows overlap the most recently started
/// record wins; where none applies the cell is `None`.
pub fn expand_tariffs(
    records: &[TariffRecord],
    columns: Vec<TariffColumn>,
    window: &TimeWindow,
) -> TariffTable {
    for column in &columns {
        if !records.iter().any(|r| r.matches(column)) {
            warn!("No price list entries for {}", column.label());
        }
    }

    let slots = window
        .quarter_hours()
        .into_iter()
        .map(|start| {
            let local = start.naive_local();
            let prices = columns
                .iter()
                .map(|column| {
                    records
                        .iter()
                        .filter(|r| r.matches(column) && r.is_valid_at(local))
                        .max_by_key(|r| r.valid_from)
                        .and_then(|r| r.price_for_hour(local.hour()))
                })
                .collect();
            TariffSlot { start, prices }
        })
        .collect();

    TariffTable { columns, slots }
}
