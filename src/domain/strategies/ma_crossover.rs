//! Moving-average crossover strategy.
//!
//! BUY when the fast average crosses above the slow average, SELL when it
//! crosses below. Crossings require the previous bar, so index 0 always holds.

use crate::domain::error::StratlabError;
use crate::domain::indicator::moving_average;
use crate::domain::params::{Params, ParamSpec};
use crate::domain::series::{closes, PricePoint};
use crate::domain::strategy::{Signal, Strategy};

use super::trade_fraction_spec;

pub const ID: &str = "ma-crossover";

/// Cached indicator columns, recomputed when the series the strategy sees
/// changes length (fresh instance per run, so in practice computed once).
#[derive(Debug, Default)]
struct Cache {
    len: usize,
    fast: Vec<f64>,
    slow: Vec<f64>,
}

#[derive(Debug, Default)]
pub struct MaCrossover {
    cache: Option<Cache>,
}

impl MaCrossover {
    fn specs() -> Vec<ParamSpec> {
        vec![
            ParamSpec::number("fast", 10.0).bounded(2.0, 50.0).stepped(8.0),
            ParamSpec::number("slow", 30.0).bounded(5.0, 200.0).stepped(25.0),
            trade_fraction_spec(),
        ]
    }

    fn ensure_cache(&mut self, series: &[PricePoint], params: &Params) {
        let fresh = match &self.cache {
            Some(c) => c.len != series.len(),
            None => true,
        };
        if fresh {
            let specs = Self::specs();
            let prices = closes(series);
            let fast = params.number_or(&specs, "fast") as usize;
            let slow = params.number_or(&specs, "slow") as usize;
            self.cache = Some(Cache {
                len: series.len(),
                fast: moving_average(&prices, fast),
                slow: moving_average(&prices, slow),
            });
        }
    }
}

impl Strategy for MaCrossover {
    fn id(&self) -> &'static str {
        ID
    }

    fn name(&self) -> &'static str {
        "MA Crossover"
    }

    fn description(&self) -> &'static str {
        "Buys when the fast moving average crosses above the slow, sells on the reverse cross"
    }

    fn param_specs(&self) -> Vec<ParamSpec> {
        Self::specs()
    }

    fn evaluate(
        &mut self,
        series: &[PricePoint],
        index: usize,
        params: &Params,
    ) -> Result<Signal, StratlabError> {
        if index == 0 {
            return Ok(Signal::Hold);
        }

        self.ensure_cache(series, params);
        let cache = self.cache.as_ref().unwrap();

        let (f_curr, s_curr) = (cache.fast[index], cache.slow[index]);
        let (f_prev, s_prev) = (cache.fast[index - 1], cache.slow[index - 1]);

        if f_curr.is_nan() || s_curr.is_nan() || f_prev.is_nan() || s_prev.is_nan() {
            return Ok(Signal::Hold);
        }

        if f_curr > s_curr && f_prev <= s_prev {
            Ok(Signal::Buy)
        } else if f_curr < s_curr && f_prev >= s_prev {
            Ok(Signal::Sell)
        } else {
            Ok(Signal::Hold)
        }
    }
}
