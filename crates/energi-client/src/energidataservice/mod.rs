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

//! Energidataservice client
//!
//! Every dataset lives under `{base_url}{dataset}` and answers with
//! `{"total": n, "records": [...]}`.

mod prices;
mod query;
mod records;
mod tariffs;

pub use prices::PriceRequest;
pub use query::DatasetQuery;
pub use tariffs::{TariffRequest, expand_tariffs};

use crate::config::ClientConfig;
use crate::error::{EnergiError, Result};
use crate::http::ApiClient;
use records::DatasetResponse;
use serde::de::DeserializeOwned;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.energidataservice.dk/dataset/";

pub const DAY_AHEAD_DATASET: &str = "DayAheadPrices";
pub const IMBALANCE_DATASET: &str = "ImbalancePrice";
pub const PRICELIST_DATASET: &str = "DatahubPricelist";

#[derive(Debug, Clone)]
pub struct EnergiDataService {
    api: ApiClient,
    base_url: String,
}

impl EnergiDataService {
    pub fn new(api: ApiClient) -> Self {
        Self::with_base_url(api, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api: ApiClient, base_url: &str) -> Self {
        let mut base_url = base_url.trim().to_owned();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self { api, base_url }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self::with_base_url(
            config.api_client()?,
            &config.energidataservice.base_url,
        ))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn dataset_url(&self, dataset: &str) -> String {
        format!("{}{dataset}", self.base_url)
    }

    /// Issue `query` and deserialize its `records`
    pub async fn fetch_records<T: DeserializeOwned>(&self, query: &DatasetQuery) -> Result<Vec<T>> {
        let url = self.dataset_url(query.dataset());
        let value = self.api.get(&url, &query.params(), None).await?;
        let response: DatasetResponse<T> = serde_json::from_value(value)?;
        let received = response.records.len();

        debug!(
            "{}: {received} records (total {:?})",
            query.dataset(),
            response.total
        );
        // A capped page must not pass for the whole selection
        if let Some(total) = response.total
            && u64::try_from(received).ok() != Some(total)
        {
            return Err(EnergiError::Payload(format!(
                "{}: received {received} of {total} records",
                query.dataset()
            )));
        }
        Ok(response.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::RetryPolicy;
    use mockito::{Matcher, Server};
    use serde::Deserialize;
    use serde_json::json;
    use std::time::Duration;

    #[derive(Debug, Deserialize)]
    struct Row {
        #[serde(rename = "Value")]
        value: i64,
    }

    fn api() -> ApiClient {
        ApiClient::new(Duration::from_secs(5), RetryPolicy::none()).unwrap()
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = EnergiDataService::with_base_url(api(), "http://localhost:1234/dataset");
        assert_eq!(
            client.dataset_url("DayAheadPrices"),
            "http://localhost:1234/dataset/DayAheadPrices"
        );
    }

    #[tokio::test]
    async fn test_fetch_records() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/Example")
            .match_query(Matcher::UrlEncoded("limit".into(), "5".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"total": 2, "records": [{"Value": 1}, {"Value": 2}]}).to_string())
            .create_async()
            .await;

        let client = EnergiDataService::with_base_url(api(), &server.url());
        let rows: Vec<Row> = client
            .fetch_records(&DatasetQuery::new("Example").limit(5))
            .await
            .unwrap();

        assert_eq!(rows.iter().map(|r| r.value).collect::<Vec<_>>(), vec![1, 2]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_records_is_a_decode_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/Example")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"total": 0}"#)
            .create_async()
            .await;

        let client = EnergiDataService::with_base_url(api(), &server.url());
        let err = client
            .fetch_records::<Row>(&DatasetQuery::new("Example"))
            .await
            .unwrap_err();
        assert!(matches!(err, EnergiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_fewer_records_than_total_is_rejected() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/Example")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"total": 192, "limit": 100, "records": [{"Value": 1}, {"Value": 2}]}).to_string())
            .create_async()
            .await;

        let client = EnergiDataService::with_base_url(api(), &server.url());
        let err = client
            .fetch_records::<Row>(&DatasetQuery::new("Example"))
            .await
            .unwrap_err();
        assert!(matches!(err, EnergiError::Payload(msg) if msg.contains("2 of 192")));
    }

    #[tokio::test]
    async fn test_records_without_total_are_accepted() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/Example")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"records": [{"Value": 7}]}).to_string())
            .create_async()
            .await;

        let client = EnergiDataService::with_base_url(api(), &server.url());
        let rows: Vec<Row> = client
            .fetch_records(&DatasetQuery::new("Example"))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }
}
