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

use super::records::{RawDayAheadPrice, RawImbalancePrice};
use super::{DAY_AHEAD_DATASET, DatasetQuery, EnergiDataService, IMBALANCE_DATASET};
use crate::error::Result;
use crate::time::{DEFAULT_TZ, TimeWindow};
use chrono_tz::Tz;
use energi_types::{DayAheadPrice, ImbalancePrice, PriceArea};
use tracing::info;

/// Time window and bidding zones of a price query
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRequest {
    pub start: String,
    pub end: Option<String>,

    /// Empty means every area the dataset carries
    pub zones: Vec<PriceArea>,

    /// Timezone of naive input and of the returned local times
    pub tz: Tz,
}

impl PriceRequest {
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: None,
            zones: Vec::new(),
            tz: DEFAULT_TZ,
        }
    }

    pub fn end(mut self, end: impl Into<String>) -> Self {
        self.end = Some(end.into());
        self
    }

    pub fn zone(mut self, zone: impl Into<PriceArea>) -> Self {
        self.zones.push(zone.into());
        self
    }

    pub fn zones<I, Z>(mut self, zones: I) -> Self
    where
        I: IntoIterator<Item = Z>,
        Z: Into<PriceArea>,
    {
        self.zones.extend(zones.into_iter().map(Into::into));
        self
    }

    pub fn tz(mut self, tz: Tz) -> Self {
        self.tz = tz;
        self
    }

    pub fn window(&self) -> Result<TimeWindow> {
        TimeWindow::from_input(&self.start, self.end.as_deref(), self.tz, self.tz)
    }

    fn query(&self, dataset: &str) -> Result<DatasetQuery> {
        Ok(DatasetQuery::new(dataset)
            .window(&self.window()?)
            .filter("PriceArea", self.zones.iter().map(PriceArea::code))
            .limit(0))
    }
}

impl EnergiDataService {
    /// Day-ahead spot prices, sorted by time then area
    pub async fn day_ahead_prices(&self, request: &PriceRequest) -> Result<Vec<DayAheadPrice>> {
        let query = request.query(DAY_AHEAD_DATASET)?;
        let raw: Vec<RawDayAheadPrice> = self.fetch_records(&query).await?;

        let mut prices = raw
            .into_iter()
            .map(|r| r.into_model(request.tz))
            .collect::<Result<Vec<_>>>()?;
        prices.sort_by(|a, b| {
            (a.time_utc, &a.price_area).cmp(&(b.time_utc, &b.price_area))
        });

        info!("Fetched {} day-ahead prices", prices.len());
        Ok(prices)
    }

    /// Imbalance prices, sorted by time then area
    pub async fn imbalance_prices(&self, request: &PriceRequest) -> Result<Vec<ImbalancePrice>> {
        let query = request.query(IMBALANCE_DATASET)?;
        let raw: Vec<RawImbalancePrice> = self.fetch_records(&query).await?;

        let mut prices = raw
            .into_iter()
            .map(|r| r.into_model(request.tz))
            .collect::<Result<Vec<_>>>()?;
        prices.sort_by(|a, b| {
            (a.time_utc, &a.price_area).cmp(&(b.time_utc, &b.price_area))
        });

        info!("Fetched {} imbalance prices", prices.len());
        Ok(prices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EnergiError;
    use crate::http::ApiClient;
    use crate::retry::RetryPolicy;
    use chrono::Timelike;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use std::time::Duration;

    fn client(url: &str) -> EnergiDataService {
        let api = ApiClient::new(Duration::from_secs(5), RetryPolicy::none()).unwrap();
        EnergiDataService::with_base_url(api, url)
    }

    #[test]
    fn test_single_zone_and_list_build_the_same_filter() {
        let single = PriceRequest::new("2025-06-01").zone("DK1");
        let list = PriceRequest::new("2025-06-01").zones(["DK1"]);
        assert_eq!(single, list);

        let query = PriceRequest::new("2025-06-01")
            .zones(["DK1", "DK2"])
            .query(DAY_AHEAD_DATASET)
            .unwrap();
        assert_eq!(
            query.filter_json().as_deref(),
            Some(r#"{"PriceArea":["DK1","DK2"]}"#)
        );
    }

    #[test]
    fn test_reversed_window_is_rejected() {
        let err = PriceRequest::new("2025-06-02")
            .end("2025-06-01")
            .window()
            .unwrap_err();
        assert!(matches!(err, EnergiError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_day_ahead_prices_are_localized_and_sorted() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/DayAheadPrices")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("start".into(), "2025-05-31T22:00".into()),
                Matcher::UrlEncoded("end".into(), "2025-06-01T22:00".into()),
                Matcher::UrlEncoded("timezone".into(), "UTC".into()),
                Matcher::UrlEncoded("filter".into(), r#"{"PriceArea":["DK1","DK2"]}"#.into()),
                Matcher::UrlEncoded("limit".into(), "0".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "total": 3,
                    "records": [
                        {"TimeUTC": "2025-05-31T22:15:00", "TimeDK": "2025-06-01T00:15:00",
                         "PriceArea": "DK1", "DayAheadPriceEUR": 40.0, "DayAheadPriceDKK": 298.4},
                        {"TimeUTC": "2025-05-31T22:00:00", "TimeDK": "2025-06-01T00:00:00",
                         "PriceArea": "DK2", "DayAheadPriceEUR": 51.0, "DayAheadPriceDKK": 380.5},
                        {"TimeUTC": "2025-05-31T22:00:00", "TimeDK": "2025-06-01T00:00:00",
                         "PriceArea": "DK1", "DayAheadPriceEUR": 39.5, "DayAheadPriceDKK": 294.7}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let request = PriceRequest::new("2025-06-01").zones(["DK1", "DK2"]);
        let prices = client(&server.url())
            .day_ahead_prices(&request)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(prices.len(), 3);
        assert_eq!(prices[0].price_area, PriceArea::Dk1);
        assert_eq!(prices[0].price_eur, Some(39.5));
        assert_eq!(prices[1].price_area, PriceArea::Dk2);
        assert_eq!(prices[2].time_local.minute(), 15);
        assert_eq!(prices[0].time_local.hour(), 0);
    }

    #[tokio::test]
    async fn test_imbalance_prices_without_zones_send_no_filter() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/ImbalancePrice")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("start".into(), "2025-05-31T22:00".into()),
                Matcher::UrlEncoded("end".into(), "2025-06-01T04:00".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "total": 1,
                    "records": [
                        {"TimeUTC": "2025-05-31T22:00:00", "TimeDK": "2025-06-01T00:00:00",
                         "PriceArea": "DK1", "ImbalancePriceEUR": 80.0, "SpotPriceEUR": 39.5,
                         "BalancingDemand": 12.0}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let request = PriceRequest::new("2025-06-01T00:00").end("2025-06-01T06:00");
        let prices = client(&server.url())
            .imbalance_prices(&request)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(prices.len(), 1);
        assert_eq!(prices[0].spot_price_eur, Some(39.5));
        assert_eq!(prices[0].extra_f64("BalancingDemand"), Some(12.0));
    }

    #[tokio::test]
    async fn test_bad_timestamp_in_payload_is_an_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/DayAheadPrices")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"records": [{"TimeUTC": "yesterday", "PriceArea": "DK1"}]}"#)
            .create_async()
            .await;

        let err = client(&server.url())
            .day_ahead_prices(&PriceRequest::new("2025-06-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, EnergiError::InvalidTime { .. }));
    }

    #[tokio::test]
    async fn test_truncated_page_is_an_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/DayAheadPrices")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "total": 192,
                    "limit": 100,
                    "records": [
                        {"TimeUTC": "2025-05-31T22:00:00", "PriceArea": "DK1", "DayAheadPriceEUR": 39.5},
                        {"TimeUTC": "2025-05-31T22:00:00", "PriceArea": "DK2", "DayAheadPriceEUR": 51.0}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let err = client(&server.url())
            .day_ahead_prices(&PriceRequest::new("2025-06-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, EnergiError::Payload(_)));
    }
}
