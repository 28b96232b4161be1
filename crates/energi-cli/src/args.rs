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

//! CLI argument definitions using clap.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use energi_types::Aggregation;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "energi-data")]
#[command(author, version, about = "Danish energy market and metering data")]
#[command(
    long_about = "Fetch public Danish energy data from the command line.\n\
    \nPrices and grid tariffs come from Energidataservice, metering points and\n\
    meter readings from Eloverblik (requires a refresh token).\n\
    \nExamples:\n  \
    energi-data day-ahead --start 2025-06-01 --zones DK1,DK2\n  \
    energi-data tariffs --start 2025-10-26 --format csv --output tariffs.csv\n  \
    energi-data meter-data --from 2025-06-01 --to 2025-07-01 --aggregation Day"
)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(long, global = true, value_name = "PATH")]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Day-ahead spot prices per bidding zone
    DayAhead(PriceArgs),

    /// Imbalance prices per bidding zone
    Imbalance(PriceArgs),

    /// DSO grid tariffs on a 15-minute grid
    #[command(
        long_about = "Expand DataHub grid tariffs onto 15-minute slots.\n\
        \nOne column per DSO and tariff pair, labelled \"<dso>_<tariff>\".\n\
        The grid follows the Danish clock, so DST days have 92 or 100 slots.\n\
        \nExamples:\n  \
        energi-data tariffs --start 2025-06-01\n  \
        energi-data tariffs --start 2025-06-01 --dso \"Radius Elnet A/S,Cerius A/S\""
    )]
    Tariffs(TariffArgs),

    /// Metering points of the Eloverblik account
    MeteringPoints(MeteringPointArgs),

    /// Meter readings from Eloverblik
    MeterData(MeterDataArgs),
}

#[derive(Debug, Args)]
pub struct PriceArgs {
    /// Window start, e.g. 2025-06-01 or 2025-06-01T06:00
    #[arg(long)]
    pub start: String,

    /// Window end (exclusive); one calendar day after start by default
    #[arg(long)]
    pub end: Option<String>,

    /// Comma-separated bidding zones, all zones by default
    #[arg(long, value_delimiter = ',')]
    pub zones: Vec<String>,

    /// Timezone of the input and of local times in the output
    #[arg(long, value_name = "TZ")]
    pub tz: Option<String>,
}

#[derive(Debug, Args)]
pub struct TariffArgs {
    #[arg(long)]
    pub start: String,

    #[arg(long)]
    pub end: Option<String>,

    /// Timezone the start and end are given in
    #[arg(long, value_name = "TZ")]
    pub tz: Option<String>,

    /// Comma-separated charge owners
    #[arg(long = "dso", value_delimiter = ',', default_value = "Radius Elnet A/S")]
    pub dsos: Vec<String>,

    /// Comma-separated tariff names
    #[arg(long = "tariff", value_delimiter = ',', default_value = "Nettarif C")]
    pub tariffs: Vec<String>,
}

#[derive(Debug, Args)]
pub struct MeteringPointArgs {
    /// Include metering points shared by third parties
    #[arg(long, default_value_t = false)]
    pub include_all: bool,
}

#[derive(Debug, Args)]
pub struct MeterDataArgs {
    /// First day (YYYY-MM-DD)
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub from: NaiveDate,

    /// End day (YYYY-MM-DD), exclusive; the day after --from by default
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub to: Option<NaiveDate>,

    /// Actual, Quarter, Hour, Day, Month or Year
    #[arg(long, default_value = "Hour")]
    pub aggregation: Aggregation,

    /// Comma-separated metering point ids, every linked point by default
    #[arg(long = "metering-point", value_delimiter = ',')]
    pub metering_points: Vec<String>,
}

impl MeterDataArgs {
    /// Exclusive end day, `None` only past the last representable date
    pub fn end(&self) -> Option<NaiveDate> {
        self.to.or_else(|| self.from.succ_opt())
    }
}
