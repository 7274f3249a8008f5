#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Arc;

use stratlab::domain::backtest::{BacktestRequest, DAILY_BARS_PER_YEAR};
use stratlab::domain::choice_store::ChoiceStore;
use stratlab::domain::error::StratlabError;
use stratlab::domain::params::ParamValue;
pub use stratlab::domain::series::PricePoint;
use stratlab::ports::data_port::DataPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_series(mut self, symbol: &str, series: Vec<PricePoint>) -> Self {
        self.data.insert(symbol.to_string(), series);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, StratlabError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(StratlabError::DataSource {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .map(|series| {
                series
                    .iter()
                    .filter(|p| {
                        p.timestamp.date() >= start_date && p.timestamp.date() <= end_date
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_point(day_offset: i64, close: f64) -> PricePoint {
    PricePoint {
        timestamp: date(2024, 1, 1).and_hms_opt(0, 0, 0).unwrap()
            + chrono::Duration::days(day_offset),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000.0,
    }
}

pub fn make_series(closes: &[f64]) -> Vec<PricePoint> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_point(i as i64, c))
        .collect()
}

/// Daily bars oscillating around `base` with a gentle sine wave.
pub fn oscillating_series(len: usize, base: f64) -> Vec<PricePoint> {
    let closes: Vec<f64> = (0..len)
        .map(|i| base + base * 0.2 * ((i as f64) * 0.6).sin())
        .collect();
    make_series(&closes)
}

/// Steadily rising daily bars.
pub fn trending_series(len: usize, start: f64, step: f64) -> Vec<PricePoint> {
    let closes: Vec<f64> = (0..len).map(|i| start + step * i as f64).collect();
    make_series(&closes)
}

pub fn sample_request(symbol: &str, strategy_id: &str) -> BacktestRequest {
    BacktestRequest {
        symbol: symbol.to_string(),
        start_date: date(2024, 1, 1),
        end_date: date(2025, 1, 1),
        starting_cash: 10_000.0,
        strategy_id: strategy_id.to_string(),
        params: BTreeMap::new(),
        bars_per_year: DAILY_BARS_PER_YEAR,
    }
}

pub fn number_params(pairs: &[(&str, f64)]) -> BTreeMap<String, ParamValue> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), ParamValue::Number(*v)))
        .collect()
}

pub fn fresh_choices() -> Arc<ChoiceStore> {
    Arc::new(ChoiceStore::new())
}
