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

//! Grid tariffs published by the DSOs through the DataHub price list.

use chrono::{DateTime, NaiveDateTime};
use chrono_tz::Tz;
use serde::Serialize;

/// One price list entry of a charge owner (DSO)
///
/// Validity bounds are naive Danish local time, exactly as the DataHub
/// publishes them. Prices are DKK/kWh per local hour of day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TariffRecord {
    /// DSO name, e.g. "Radius Elnet A/S"
    pub charge_owner: String,

    /// Tariff name, e.g. "Nettarif C"
    pub note: String,

    pub charge_type_code: Option<String>,
    pub description: Option<String>,
    pub valid_from: NaiveDateTime,

    /// `None` means open-ended
    pub valid_to: Option<NaiveDateTime>,

    /// `Price1..Price24`, index 0 is the hour starting 00:00
    pub hourly_prices: [Option<f64>; 24],
}

impl TariffRecord {
    /// Whether `local` falls inside `[valid_from, valid_to)`
    pub fn is_valid_at(&self, local: NaiveDateTime) -> bool {
        self.valid_from <= local && self.valid_to.is_none_or(|to| local < to)
    }

    /// Price for a local hour of day (0-23)
    ///
    /// Flat tariffs only publish `Price1`; the remaining hours are null and
    /// inherit it.
    pub fn price_for_hour(&self, hour: u32) -> Option<f64> {
        let idx = usize::try_from(hour).ok()?;
        self.hourly_prices
            .get(idx)
            .copied()
            .flatten()
            .or(self.hourly_prices[0])
    }

    pub fn matches(&self, column: &TariffColumn) -> bool {
        self.charge_owner == column.charge_owner && self.note == column.note
    }
}

/// A (DSO, tariff) pair that becomes one column of a [`TariffTable`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TariffColumn {
    pub charge_owner: String,
    pub note: String,
}

impl TariffColumn {
    pub fn new(charge_owner: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            charge_owner: charge_owner.into(),
            note: note.into(),
        }
    }

    /// Column label in `"{dso}_{tariff}"` form
    pub fn label(&self) -> String {
        format!("{}_{}", self.charge_owner, self.note)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TariffSlot {
    pub start: DateTime<Tz>,

    /// One entry per table column, `None` where no price list entry applies
    pub prices: Vec<Option<f64>>,
}

/// Tariffs expanded onto a 15-minute local time grid
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TariffTable {
    pub columns: Vec<TariffColumn>,
    pub slots: Vec<TariffSlot>,
}

impl TariffTable {
    pub fn labels(&self) -> Vec<String> {
        self.columns.iter().map(TariffColumn::label).collect()
    }

    /// All values of one column in slot order
    pub fn column_values(&self, column: usize) -> Vec<Option<f64>> {
        self.slots
            .iter()
            .map(|slot| slot.prices.get(column).copied().flatten())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
