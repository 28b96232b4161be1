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

//! Output formatters for fetched data.

use crate::args::OutputFormat;
use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;
use comfy_table::{Attribute, Cell, Table, presets::UTF8_FULL};
use energi_types::{DayAheadPrice, ImbalancePrice, MeterReading, MeteringPoint, TariffTable};
use serde::Serialize;
use serde_json::Value;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M%:z";

/// Tabular view of a result, together with its JSON form
#[derive(Debug)]
pub struct Report {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub json: Value,
}

fn time<T: TimeZone>(t: &DateTime<T>) -> String
where
    T::Offset: std::fmt::Display,
{
    t.format(TIME_FORMAT).to_string()
}

fn value(v: Option<f64>, decimals: usize) -> String {
    v.map(|v| format!("{v:.decimals$}")).unwrap_or_default()
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|h| (*h).to_owned()).collect()
}

fn to_json<T: Serialize + ?Sized>(data: &T) -> Result<Value> {
    serde_json::to_value(data).context("Failed to serialize output")
}

impl Report {
    pub fn day_ahead(prices: &[DayAheadPrice]) -> Result<Self> {
        Ok(Self {
            headers: headers(&["time_utc", "time_local", "price_area", "price_eur", "price_dkk"]),
            rows: prices
                .iter()
                .map(|p| {
                    vec![
                        time(&p.time_utc),
                        time(&p.time_local),
                        p.price_area.to_string(),
                        value(p.price_eur, 2),
                        value(p.price_dkk, 2),
                    ]
                })
                .collect(),
            json: to_json(prices)?,
        })
    }

    pub fn imbalance(prices: &[ImbalancePrice]) -> Result<Self> {
        Ok(Self {
            headers: headers(&[
                "time_utc",
                "time_local",
                "price_area",
                "imbalance_price_eur",
                "imbalance_price_dkk",
                "spot_price_eur",
                "spot_price_dkk",
            ]),
            rows: prices
                .iter()
                .map(|p| {
                    vec![
                        time(&p.time_utc),
                        time(&p.time_local),
                        p.price_area.to_string(),
                        value(p.imbalance_price_eur, 2),
                        value(p.imbalance_price_dkk, 2),
                        value(p.spot_price_eur, 2),
                        value(p.spot_price_dkk, 2),
                    ]
                })
                .collect(),
            json: to_json(prices)?,
        })
    }

    pub fn tariffs(table: &TariffTable) -> Result<Self> {
        let mut names = vec!["time_local".to_owned()];
        names.extend(table.labels());

        Ok(Self {
            headers: names,
            rows: table
                .slots
                .iter()
                .map(|slot| {
                    std::iter::once(time(&slot.start))
                        .chain(slot.prices.iter().map(|p| value(*p, 4)))
                        .collect()
                })
                .collect(),
            json: to_json(table)?,
        })
    }

    pub fn metering_points(points: &[MeteringPoint]) -> Result<Self> {
        Ok(Self {
            headers: headers(&[
                "metering_point_id",
                "type",
                "settlement_method",
                "address",
                "balance_supplier",
            ]),
            rows: points
                .iter()
                .map(|p| {
                    vec![
                        p.metering_point_id.clone(),
                        p.type_of_mp.clone().unwrap_or_default(),
                        p.settlement_method.clone().unwrap_or_default(),
                        p.address(),
                        p.balance_supplier_name.clone().unwrap_or_default(),
                    ]
                })
                .collect(),
            json: to_json(points)?,
        })
    }

    /// Meter readings with start times shown in `tz` as well as UTC
    pub fn meter_readings(readings: &[MeterReading], tz: Tz) -> Result<Self> {
        Ok(Self {
            headers: headers(&[
                "metering_point_id",
                "start_utc",
                "start_local",
                "resolution",
                "quantity_kwh",
                "quality",
            ]),
            rows: readings
                .iter()
                .map(|r| {
                    vec![
                        r.metering_point_id.clone(),
                        time(&r.start),
                        time(&r.start.with_timezone(&tz)),
                        r.resolution.to_string(),
                        value(Some(r.quantity_kwh), 3),
                        r.quality.clone(),
                    ]
                })
                .collect(),
            json: to_json(readings)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn render(report: &Report, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(report)),
        OutputFormat::Csv => render_csv(report),
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(&report.json)?;
            out.push('\n');
            Ok(out)
        }
    }
}

fn render_table(report: &Report) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(
        report
            .headers
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
    );
    for row in &report.rows {
        table.add_row(row);
    }

    let mut output = table.to_string();
    output.push('\n');
    output.push_str(&format!("{} rows\n", report.rows.len()));
    output
}

fn render_csv(report: &Report) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&report.headers)?;
    for row in &report.rows {
        writer.write_record(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush CSV output: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use energi_types::{PriceArea, Resolution, TariffColumn, TariffSlot};

    fn prices() -> Vec<DayAheadPrice> {
        let time_utc = Utc.with_ymd_and_hms(2025, 5, 31, 22, 0, 0).unwrap();
        vec![
            DayAheadPrice {
                time_utc,
                time_local: time_utc.with_timezone(&chrono_tz::CET),
                price_area: PriceArea::Dk1,
                price_eur: Some(39.5),
                price_dkk: Some(294.714),
            },
            DayAheadPrice {
                time_utc,
                time_local: time_utc.with_timezone(&chrono_tz::CET),
                price_area: PriceArea::Dk2,
                price_eur: None,
                price_dkk: None,
            },
        ]
    }

    #[test]
    fn test_day_ahead_csv() {
        let report = Report::day_ahead(&prices()).unwrap();
        let csv = render(&report, OutputFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "time_utc,time_local,price_area,price_eur,price_dkk");
        assert_eq!(
            lines[1],
            "2025-05-31 22:00+00:00,2025-06-01 00:00+02:00,DK1,39.50,294.71"
        );
        assert_eq!(
            lines[2],
            "2025-05-31 22:00+00:00,2025-06-01 00:00+02:00,DK2,,"
        );
    }

    #[test]
    fn test_table_contains_headers_and_count() {
        let report = Report::day_ahead(&prices()).unwrap();
        let table = render(&report, OutputFormat::Table).unwrap();
        assert!(table.contains("price_area"));
        assert!(table.contains("DK2"));
        assert!(table.ends_with("2 rows\n"));
    }

    #[test]
    fn test_json_keeps_null_prices() {
        let report = Report::day_ahead(&prices()).unwrap();
        let json: Value = serde_json::from_str(&render(&report, OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json[0]["price_area"], "DK1");
        assert!(json[1]["price_eur"].is_null());
    }

    #[test]
    fn test_tariff_columns_use_labels() {
        let start = Utc
            .with_ymd_and_hms(2025, 6, 14, 22, 0, 0)
            .unwrap()
            .with_timezone(&chrono_tz::CET);
        let table = TariffTable {
            columns: vec![
                TariffColumn::new("Radius Elnet A/S", "Nettarif C"),
                TariffColumn::new("Cerius A/S", "Nettarif C"),
            ],
            slots: vec![TariffSlot {
                start,
                prices: vec![Some(0.1265), None],
            }],
        };

        let report = Report::tariffs(&table).unwrap();
        let csv = render(&report, OutputFormat::Csv).unwrap();
        assert_eq!(
            csv,
            "time_local,Radius Elnet A/S_Nettarif C,Cerius A/S_Nettarif C\n\
             2025-06-15 00:00+02:00,0.1265,\n"
        );
    }

    #[test]
    fn test_meter_readings_local_column() {
        let readings = vec![MeterReading {
            metering_point_id: "571313100000000001".to_owned(),
            start: Utc.with_ymd_and_hms(2025, 1, 31, 23, 0, 0).unwrap(),
            resolution: Resolution::Hour,
            quantity_kwh: 0.4,
            quality: "A04".to_owned(),
        }];

        let report = Report::meter_readings(&readings, chrono_tz::Europe::Copenhagen).unwrap();
        assert_eq!(report.rows[0][2], "2025-02-01 00:00+01:00");
        assert_eq!(report.rows[0][3], "PT1H");
        assert_eq!(report.rows[0][4], "0.400");
    }
}
