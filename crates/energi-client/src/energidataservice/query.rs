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

use crate::time::{TimeWindow, format_api};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Parameters of one dataset request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetQuery {
    dataset: String,
    window: Option<(DateTime<Utc>, DateTime<Utc>)>,
    filter: BTreeMap<String, Vec<String>>,
    limit: Option<u32>,
}

impl DatasetQuery {
    pub fn new(dataset: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            window: None,
            filter: BTreeMap::new(),
            limit: None,
        }
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    pub fn window(mut self, window: &TimeWindow) -> Self {
        self.window = Some((window.start_utc(), window.end_utc()));
        self
    }

    /// Restrict `column` to any of `values`; an empty list adds no filter
    pub fn filter<I, S>(mut self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if !values.is_empty() {
            self.filter.insert(column.into(), values);
        }
        self
    }

    /// Row limit, `0` returns every row
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Filter object, e.g. `{"PriceArea":["DK1","DK2"]}`
    pub fn filter_json(&self) -> Option<String> {
        if self.filter.is_empty() {
            return None;
        }
        let object: Map<String, Value> = self
            .filter
            .iter()
            .map(|(column, values)| (column.clone(), Value::from(values.clone())))
            .collect();
        Some(Value::Object(object).to_string())
    }

    /// Query string parameters in request order
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if let Some((start, end)) = self.window {
            params.push(("start".to_owned(), format_api(start)));
            params.push(("end".to_owned(), format_api(end)));
            params.push(("timezone".to_owned(), "UTC".to_owned()));
        }
        if let Some(filter) = self.filter_json() {
            params.push(("filter".to_owned(), filter));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_owned(), limit.to_string()));
        }

        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::DEFAULT_TZ;

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_window_params_are_utc() {
        let window = TimeWindow::from_input("2025-10-25", Some("2025-10-27"), DEFAULT_TZ, DEFAULT_TZ)
            .unwrap();
        let params = DatasetQuery::new("DayAheadPrices").window(&window).params();

        assert_eq!(param(&params, "start"), Some("2025-10-24T22:00"));
        assert_eq!(param(&params, "end"), Some("2025-10-26T23:00"));
        assert_eq!(param(&params, "timezone"), Some("UTC"));
        assert_eq!(param(&params, "filter"), None);
    }

    #[test]
    fn test_filter_json_shape() {
        let query = DatasetQuery::new("DatahubPricelist")
            .filter("ChargeOwner", ["Radius Elnet A/S"])
            .filter("Note", ["Nettarif C"])
            .limit(0);

        assert_eq!(
            query.filter_json().as_deref(),
            Some(r#"{"ChargeOwner":["Radius Elnet A/S"],"Note":["Nettarif C"]}"#)
        );
        let params = query.params();
        assert_eq!(param(&params, "limit"), Some("0"));
        assert_eq!(param(&params, "start"), None);
    }

    #[test]
    fn test_empty_filter_is_omitted() {
        let query = DatasetQuery::new("DayAheadPrices").filter("PriceArea", Vec::<String>::new());
        assert!(query.filter_json().is_none());
        assert!(query.params().is_empty());
    }
}
