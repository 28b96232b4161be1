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

//! Data model shared by the EnergiData API clients and the CLI.

pub mod area;
pub mod meter;
pub mod prices;
pub mod tariffs;

// Re-export common types for convenience
pub use area::PriceArea;
pub use meter::{Aggregation, MeterReading, MeteringPoint, Resolution};
pub use prices::{DayAheadPrice, ImbalancePrice};
pub use tariffs::{TariffColumn, TariffRecord, TariffSlot, TariffTable};
