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

//! Time input parsing and timezone handling
//!
//! User input is either a naive date/time, interpreted in a caller-supplied
//! timezone, or an RFC 3339 timestamp carrying its own offset. The APIs talk
//! UTC; results are presented back in the caller's timezone.

use crate::error::{EnergiError, Result};
use chrono::{
    DateTime, Days, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc,
};
use chrono_tz::Tz;

/// Timezone assumed for user input when none is given
pub const DEFAULT_TZ: Tz = chrono_tz::CET;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const API_FORMAT: &str = "%Y-%m-%dT%H:%M";

pub fn parse_tz(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| EnergiError::InvalidInput(format!("unknown timezone '{name}': {e}")))
}

/// Attach `tz` to a naive local time
///
/// The repeated hour of a DST fall-back resolves to its first occurrence.
/// Times inside the spring-forward gap do not exist and are rejected.
pub fn localize(naive: NaiveDateTime, tz: Tz) -> Result<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(t) => Ok(t),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => Err(EnergiError::invalid_time(
            naive.to_string(),
            format!("does not exist in {tz} (DST gap)"),
        )),
    }
}

fn parse_naive(input: &str) -> Option<NaiveDateTime> {
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// Parse a time string and express it in `tz_to`
///
/// Naive input is taken to be local time in `tz_from`; input with an offset
/// is only converted.
pub fn resolve(input: &str, tz_from: Tz, tz_to: Tz) -> Result<DateTime<Tz>> {
    let input = input.trim();

    if let Ok(aware) = DateTime::parse_from_rfc3339(input) {
        return Ok(aware.with_timezone(&tz_to));
    }

    let naive = parse_naive(input).ok_or_else(|| {
        EnergiError::invalid_time(
            input,
            "expected YYYY-MM-DD, YYYY-MM-DDTHH:MM[:SS] or RFC 3339",
        )
    })?;

    Ok(localize(naive, tz_from)?.with_timezone(&tz_to))
}

/// Move `t` by whole calendar days on its own local clock
pub fn add_local_days(t: DateTime<Tz>, days: u64) -> Result<DateTime<Tz>> {
    let naive = t
        .naive_local()
        .checked_add_days(Days::new(days))
        .ok_or_else(|| EnergiError::invalid_time(t.to_rfc3339(), "date out of range"))?;
    localize(naive, t.timezone())
}

/// Half-open query window `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl TimeWindow {
    /// Build a window from user input
    ///
    /// Inputs are read in `tz_input` and expressed in `tz_calendar`. Without
    /// an end the window spans one calendar day of `tz_calendar`, which is 23
    /// or 25 hours on DST change days.
    pub fn from_input(
        start: &str,
        end: Option<&str>,
        tz_input: Tz,
        tz_calendar: Tz,
    ) -> Result<Self> {
        let start_at = resolve(start, tz_input, tz_calendar)?;
        let end_at = match end {
            Some(end) => resolve(end, tz_input, tz_calendar)?,
            None => add_local_days(start_at, 1)?,
        };

        if end_at <= start_at {
            return Err(EnergiError::InvalidInput(format!(
                "end {end_at} is not after start {start_at}"
            )));
        }

        Ok(Self {
            start: start_at,
            end: end_at,
        })
    }

    pub fn start_utc(&self) -> DateTime<Utc> {
        self.start.with_timezone(&Utc)
    }

    pub fn end_utc(&self) -> DateTime<Utc> {
        self.end.with_timezone(&Utc)
    }

    /// Every 15-minute boundary in the window, stepping in absolute time
    pub fn quarter_hours(&self) -> Vec<DateTime<Tz>> {
        let tz = self.start.timezone();
        let step = TimeDelta::minutes(15);
        let end = self.end_utc();
        let mut slots = Vec::new();
        let mut current = self.start_utc();
        while current < end {
            slots.push(current.with_timezone(&tz));
            current += step;
        }
        slots
    }
}

/// Minute-precision UTC form expected by Energidataservice
pub fn format_api(t: DateTime<Utc>) -> String {
    t.format(API_FORMAT).to_string()
}

/// Parse a naive API timestamp such as `2025-10-25T22:00:00`
pub fn parse_api_naive(input: &str) -> Result<NaiveDateTime> {
    parse_naive(input.trim())
        .ok_or_else(|| EnergiError::invalid_time(input, "unrecognised API timestamp"))
}
