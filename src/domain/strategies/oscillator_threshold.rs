//! Momentum-oscillator threshold strategy.
//!
//! BUY when the oscillator falls below the oversold threshold, SELL when it
//! rises above the overbought threshold.

use crate::domain::error::StratlabError;
use crate::domain::indicator::momentum_oscillator;
use crate::domain::params::{Params, ParamSpec};
use crate::domain::series::{closes, PricePoint};
use crate::domain::strategy::{Signal, Strategy};

use super::trade_fraction_spec;

pub const ID: &str = "oscillator-threshold";

#[derive(Debug, Default)]
pub struct OscillatorThreshold {
    cache: Option<(usize, Vec<f64>)>,
}

impl OscillatorThreshold {
    fn specs() -> Vec<ParamSpec> {
        vec![
            ParamSpec::number("period", 14.0).bounded(2.0, 30.0).stepped(7.0),
            ParamSpec::number("oversold", 30.0).bounded(5.0, 45.0),
            ParamSpec::number("overbought", 70.0).bounded(55.0, 95.0),
            trade_fraction_spec(),
        ]
    }

    fn ensure_cache(&mut self, series: &[PricePoint], params: &Params) {
        let fresh = match &self.cache {
            Some((len, _)) => *len != series.len(),
            None => true,
        };
        if fresh {
            let specs = Self::specs();
            let prices = closes(series);
            let period = params.number_or(&specs, "period") as usize;
            self.cache = Some((series.len(), momentum_oscillator(&prices, period)));
        }
    }
}

impl Strategy for OscillatorThreshold {
    fn id(&self) -> &'static str {
        ID
    }

    fn name(&self) -> &'static str {
        "Oscillator Threshold"
    }

    fn description(&self) -> &'static str {
        "Buys when the momentum oscillator is oversold and sells when overbought"
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
        self.ensure_cache(series, params);
        let (_, osc) = self.cache.as_ref().unwrap();

        let value = osc[index];
        if value.is_nan() {
            return Ok(Signal::Hold);
        }

        let specs = Self::specs();
        let oversold = params.number_or(&specs, "oversold");
        let overbought = params.number_or(&specs, "overbought");

        if value < oversold {
            Ok(Signal::Buy)
        } else if value > overbought {
            Ok(Signal::Sell)
        } else {
            Ok(Signal::Hold)
        }
    }
}
