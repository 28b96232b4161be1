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

//! Metering point data as served by Eloverblik.

use chrono::{DateTime, Days, Months, NaiveDateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Time series aggregation level accepted by the Eloverblik API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Aggregation {
    /// Whatever resolution the meter reports
    Actual,
    Quarter,
    #[default]
    Hour,
    Day,
    Month,
    Year,
}

impl Aggregation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Actual => "Actual",
            Self::Quarter => "Quarter",
            Self::Hour => "Hour",
            Self::Day => "Day",
            Self::Month => "Month",
            Self::Year => "Year",
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Aggregation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "actual" => Ok(Self::Actual),
            "quarter" => Ok(Self::Quarter),
            "hour" => Ok(Self::Hour),
            "day" => Ok(Self::Day),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            other => Err(format!(
                "unknown aggregation '{other}', expected one of actual, quarter, hour, day, month, year"
            )),
        }
    }
}

/// Interval length of a time series period (ISO 8601 duration in the payload)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    QuarterHour,
    Hour,
    Day,
    Month,
    Year,
}

impl Resolution {
    pub fn from_iso(s: &str) -> Option<Self> {
        match s.trim() {
            "PT15M" => Some(Self::QuarterHour),
            "PT1H" => Some(Self::Hour),
            "P1D" => Some(Self::Day),
            "P1M" => Some(Self::Month),
            "P1Y" => Some(Self::Year),
            _ => None,
        }
    }

    pub fn as_iso(&self) -> &'static str {
        match self {
            Self::QuarterHour => "PT15M",
            Self::Hour => "PT1H",
            Self::Day => "P1D",
            Self::Month => "P1M",
            Self::Year => "P1Y",
        }
    }

    /// Start of interval number `index` (0-based) of a period beginning at `start`
    ///
    /// Sub-daily steps are fixed durations. Calendar steps are taken on the
    /// local clock of `tz`, so a daily series keeps starting at local
    /// midnight across DST changes.
    pub fn offset(&self, start: DateTime<Utc>, index: u32, tz: Tz) -> Option<DateTime<Utc>> {
        let steps = i64::from(index);
        match self {
            Self::QuarterHour => start.checked_add_signed(TimeDelta::minutes(15 * steps)),
            Self::Hour => start.checked_add_signed(TimeDelta::hours(steps)),
            Self::Day => shift_local(start, tz, |local| {
                local.checked_add_days(Days::new(u64::from(index)))
            }),
            Self::Month => shift_local(start, tz, |local| {
                local.checked_add_months(Months::new(index))
            }),
            Self::Year => shift_local(start, tz, |local| {
                local.checked_add_months(Months::new(index.checked_mul(12)?))
            }),
        }
    }
}

fn shift_local<F>(start: DateTime<Utc>, tz: Tz, shift: F) -> Option<DateTime<Utc>>
where
    F: FnOnce(NaiveDateTime) -> Option<NaiveDateTime>,
{
    let local = shift(start.with_timezone(&tz).naive_local())?;
    tz.from_local_datetime(&local)
        .earliest()
        .map(|t| t.with_timezone(&Utc))
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_iso())
    }
}

/// One metered quantity for one interval
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeterReading {
    pub metering_point_id: String,
    pub start: DateTime<Utc>,
    pub resolution: Resolution,
    pub quantity_kwh: f64,

    /// Eloverblik quality code (A04 measured, A03 estimated, ...)
    pub quality: String,
}

/// Metering point registered to the authenticated customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeteringPoint {
    pub metering_point_id: String,
    #[serde(default, rename = "typeOfMP")]
    pub type_of_mp: Option<String>,
    #[serde(default)]
    pub settlement_method: Option<String>,
    #[serde(default)]
    pub street_name: Option<String>,
    #[serde(default)]
    pub building_number: Option<String>,
    #[serde(default)]
    pub postcode: Option<String>,
    #[serde(default)]
    pub city_name: Option<String>,
    #[serde(default)]
    pub balance_supplier_name: Option<String>,
    #[serde(default)]
    pub has_relation: Option<bool>,
}

impl MeteringPoint {
    /// Single-line address, empty when the API returned none
    pub fn address(&self) -> String {
        let street = [self.street_name.as_deref(), self.building_number.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        let city = [self.postcode.as_deref(), self.city_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        match (street.is_empty(), city.is_empty()) {
            (false, false) => format!("{street}, {city}"),
            (false, true) => street,
            (true, _) => city,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Copenhagen;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_aggregation_parses_case_insensitively() {
        assert_eq!("quarter".parse::<Aggregation>(), Ok(Aggregation::Quarter));
        assert_eq!("Hour".parse::<Aggregation>(), Ok(Aggregation::Hour));
        assert!("weekly".parse::<Aggregation>().is_err());
    }

    #[test]
    fn test_fixed_step_offsets() {
        let start = utc("2025-03-29T23:00:00Z");
        assert_eq!(
            Resolution::QuarterHour.offset(start, 5, Copenhagen),
            Some(utc("2025-03-30T00:15:00Z"))
        );
        assert_eq!(
            Resolution::Hour.offset(start, 3, Copenhagen),
            Some(utc("2025-03-30T02:00:00Z"))
        );
    }

    #[test]
    fn test_daily_offset_follows_local_midnight_across_dst() {
        // 2025-03-30 00:00 CET is 2025-03-29T23:00Z; next local midnight is CEST
        let start = utc("2025-03-29T23:00:00Z");
        assert_eq!(
            Resolution::Day.offset(start, 1, Copenhagen),
            Some(utc("2025-03-30T22:00:00Z"))
        );
    }

    #[test]
    fn test_monthly_offset() {
        let start = utc("2024-12-31T23:00:00Z");
        assert_eq!(
            Resolution::Month.offset(start, 3, Copenhagen),
            Some(utc("2025-03-31T22:00:00Z"))
        );
    }

    #[test]
    fn test_metering_point_from_api_json() {
        let json = r#"{
            "meteringPointId": "571313100000000001",
            "typeOfMP": "E17",
            "streetName": "Vejnavn",
            "buildingNumber": "12",
            "postcode": "2100",
            "cityName": "København Ø",
            "hasRelation": true
        }"#;
        let point: MeteringPoint = serde_json::from_str(json).unwrap();
        assert_eq!(point.metering_point_id, "571313100000000001");
        assert_eq!(point.type_of_mp.as_deref(), Some("E17"));
        assert_eq!(point.address(), "Vejnavn 12, 2100 København Ø");
    }
}
