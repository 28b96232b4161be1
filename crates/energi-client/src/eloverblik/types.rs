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

//! Eloverblik wire format and its flattening into [`MeterReading`]s

use crate::error::{EnergiError, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use energi_types::{MeterReading, Resolution};
use serde::{Deserialize, Serialize};

/// `{"result": ...}` wrapper around every response
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub result: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TimeSeriesRequest<'a> {
    pub metering_points: MeteringPointIds<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MeteringPointIds<'a> {
    pub metering_point: &'a [String],
}

/// One entry per requested metering point
#[derive(Debug, Deserialize)]
pub(crate) struct TimeSeriesResult {
    #[serde(default)]
    success: bool,
    #[serde(rename = "errorCode", default)]
    error_code: Option<i64>,
    #[serde(rename = "errorText", default)]
    error_text: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "MyEnergyData_MarketDocument", default)]
    document: Option<MarketDocument>,
}

#[derive(Debug, Deserialize)]
struct MarketDocument {
    #[serde(rename = "TimeSeries", default)]
    time_series: Vec<TimeSeries>,
}

#[derive(Debug, Deserialize)]
struct TimeSeries {
    #[serde(rename = "mRID")]
    metering_point_id: String,
    #[serde(rename = "Period", default)]
    periods: Vec<Period>,
}

#[derive(Debug, Deserialize)]
struct Period {
    resolution: String,
    #[serde(rename = "timeInterval")]
    time_interval: TimeInterval,
    #[serde(rename = "Point", default)]
    points: Vec<Point>,
}

#[derive(Debug, Deserialize)]
struct TimeInterval {
    start: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct Point {
    position: String,
    #[serde(rename = "out_Quantity.quantity")]
    quantity: String,
    #[serde(rename = "out_Quantity.quality", default)]
    quality: Option<String>,
}

/// Flatten time series results into readings sorted by metering point and start
///
/// Calendar resolutions are stepped on the `tz` clock.
pub(crate) fn flatten_time_series(results: Vec<TimeSeriesResult>, tz: Tz) -> Result<Vec<MeterReading>> {
    let mut readings = Vec::new();

    for result in results {
        if !result.success {
            return Err(EnergiError::Eloverblik {
                code: result.error_code.unwrap_or_default(),
                message: format!(
                    "{} ({})",
                    result.error_text.unwrap_or_else(|| "unknown error".to_owned()),
                    result.id.unwrap_or_default()
                ),
            });
        }

        let Some(document) = result.document else {
            return Err(EnergiError::Payload(
                "successful result without MyEnergyData_MarketDocument".to_owned(),
            ));
        };

        for series in document.time_series {
            for period in &series.periods {
                read_period(&series.metering_point_id, period, tz, &mut readings)?;
            }
        }
    }

    readings.sort_by(|a, b| {
        (&a.metering_point_id, a.start).cmp(&(&b.metering_point_id, b.start))
    });
    Ok(readings)
}

fn read_period(
    metering_point_id: &str,
    period: &Period,
    tz: Tz,
    readings: &mut Vec<MeterReading>,
) -> Result<()> {
    let resolution = Resolution::from_iso(&period.resolution).ok_or_else(|| {
        EnergiError::Payload(format!("unknown resolution '{}'", period.resolution))
    })?;

    for point in &period.points {
        let position: u32 = point
            .position
            .trim()
            .parse()
            .ok()
            .filter(|p| *p >= 1)
            .ok_or_else(|| EnergiError::Payload(format!("invalid position '{}'", point.position)))?;
        let quantity_kwh: f64 = point.quantity.trim().parse().map_err(|_| {
            EnergiError::Payload(format!("invalid quantity '{}'", point.quantity))
        })?;
        let start = resolution
            .offset(period.time_interval.start, position - 1, tz)
            .ok_or_else(|| EnergiError::Payload(format!("position {position} out of range")))?;

        readings.push(MeterReading {
            metering_point_id: metering_point_id.to_owned(),
            start,
            resolution,
            quantity_kwh,
            quality: point.quality.clone().unwrap_or_default(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::Copenhagen;
    use serde_json::json;

    fn results(value: serde_json::Value) -> Vec<TimeSeriesResult> {
        serde_json::from_value::<Envelope<Vec<TimeSeriesResult>>>(value)
            .unwrap()
            .result
    }

    fn document(id: &str, resolution: &str, start: &str, points: &[(&str, &str)]) -> serde_json::Value {
        json!({
            "success": true,
            "errorCode": 10000,
            "errorText": "NoError",
            "id": id,
            "MyEnergyData_MarketDocument": {
                "mRID": "doc",
                "TimeSeries": [{
                    "mRID": id,
                    "businessType": "A04",
                    "measurement_Unit.name": "KWH",
                    "Period": [{
                        "resolution": resolution,
                        "timeInterval": {"start": start, "end": start},
                        "Point": points.iter().map(|(pos, qty)| json!({
                            "position": pos,
                            "out_Quantity.quantity": qty,
                            "out_Quantity.quality": "A04"
                        })).collect::<Vec<_>>()
                    }]
                }]
            }
        })
    }

    #[test]
    fn test_request_body_shape() {
        let ids = vec!["571313100000000001".to_owned()];
        let body = serde_json::to_value(TimeSeriesRequest {
            metering_points: MeteringPointIds {
                metering_point: &ids,
            },
        })
        .unwrap();
        assert_eq!(
            body,
            json!({"meteringPoints": {"meteringPoint": ["571313100000000001"]}})
        );
    }

    #[test]
    fn test_hourly_points_are_offset_from_period_start() {
        let raw = results(json!({"result": [
            document("mp-1", "PT1H", "2025-05-31T22:00:00Z", &[("1", "0.370"), ("2", "0.415"), ("24", "1.2")])
        ]}));

        let readings = flatten_time_series(raw, Copenhagen).unwrap();
        assert_eq!(readings.len(), 3);
        assert_eq!(readings[0].start, Utc.with_ymd_and_hms(2025, 5, 31, 22, 0, 0).unwrap());
        assert_eq!(readings[1].start, Utc.with_ymd_and_hms(2025, 5, 31, 23, 0, 0).unwrap());
        assert_eq!(readings[2].start, Utc.with_ymd_and_hms(2025, 6, 1, 21, 0, 0).unwrap());
        assert!((readings[1].quantity_kwh - 0.415).abs() < 1e-9);
        assert_eq!(readings[0].quality, "A04");
    }

    #[test]
    fn test_daily_points_follow_local_midnight_across_dst() {
        let raw = results(json!({"result": [
            document("mp-1", "P1D", "2025-10-24T22:00:00Z", &[("1", "5"), ("2", "6"), ("3", "7")])
        ]}));

        let readings = flatten_time_series(raw, Copenhagen).unwrap();
        assert_eq!(readings[1].start, Utc.with_ymd_and_hms(2025, 10, 25, 22, 0, 0).unwrap());
        assert_eq!(readings[2].start, Utc.with_ymd_and_hms(2025, 10, 26, 23, 0, 0).unwrap());
    }

    #[test]
    fn test_readings_sorted_by_point_then_time() {
        let raw = results(json!({"result": [
            document("mp-2", "PT15M", "2025-05-31T22:00:00Z", &[("2", "1"), ("1", "1")]),
            document("mp-1", "PT15M", "2025-05-31T22:00:00Z", &[("1", "1")])
        ]}));

        let readings = flatten_time_series(raw, Copenhagen).unwrap();
        let order: Vec<(&str, u32)> = readings
            .iter()
            .map(|r| (r.metering_point_id.as_str(), chrono::Timelike::minute(&r.start)))
            .collect();
        assert_eq!(order, vec![("mp-1", 0), ("mp-2", 0), ("mp-2", 15)]);
    }

    #[test]
    fn test_failed_entry_is_an_error() {
        let raw = results(json!({"result": [{
            "success": false,
            "errorCode": 20000,
            "errorText": "WrongNumberOfArguments",
            "id": "mp-9",
            "MyEnergyData_MarketDocument": null
        }]}));

        let err = flatten_time_series(raw, Copenhagen).unwrap_err();
        assert!(matches!(err, EnergiError::Eloverblik { code: 20000, .. }));
    }

    #[test]
    fn test_bad_points_are_payload_errors() {
        let zero = results(json!({"result": [
            document("mp-1", "PT1H", "2025-05-31T22:00:00Z", &[("0", "1")])
        ]}));
        assert!(matches!(flatten_time_series(zero, Copenhagen), Err(EnergiError::Payload(_))));

        let text = results(json!({"result": [
            document("mp-1", "PT1H", "2025-05-31T22:00:00Z", &[("1", "n/a")])
        ]}));
        assert!(matches!(flatten_time_series(text, Copenhagen), Err(EnergiError::Payload(_))));

        let resolution = results(json!({"result": [
            document("mp-1", "PT5M", "2025-05-31T22:00:00Z", &[("1", "1")])
        ]}));
        assert!(matches!(
            flatten_time_series(resolution, Copenhagen),
            Err(EnergiError::Payload(_))
        ));
    }
}
