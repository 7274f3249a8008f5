//! Process-wide record of the selector's most recent choice per symbol.
//!
//! A read-model for out-of-band inspection only: concurrent selector runs for
//! the same symbol race with last-write-wins semantics, and no backtest ever
//! reads the store to make its own decisions. Injected explicitly so tests
//! can use isolated stores.

use std::collections::HashMap;
use std::sync::Mutex;

use super::params::Params;

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveChoice {
    pub strategy_id: String,
    pub strategy_name: String,
    pub parameters: Params,
}

#[derive(Debug, Default)]
pub struct ChoiceStore {
    inner: Mutex<HashMap<String, ActiveChoice>>,
}

impl ChoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, symbol: &str, choice: ActiveChoice) {
        let mut map = self.inner.lock().expect("choice store poisoned");
        map.insert(symbol.to_string(), choice);
    }

    /// Most recent choice written by any selector run for `symbol`.
    pub fn active(&self, symbol: &str) -> Option<ActiveChoice> {
        let map = self.inner.lock().expect("choice store poisoned");
        map.get(symbol).cloned()
    }
}
