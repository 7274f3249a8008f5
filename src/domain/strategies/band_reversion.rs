//! Mean-reversion strategy on volatility bands.
//!
//! BUY when the close drops below the lower band, SELL when it rises above
//! the upper band. Holds while the close stays inside the envelope.

use crate::domain::error::StratlabError;
use crate::domain::indicator::{volatility_bands, VolatilityBands};
use crate::domain::params::{Params, ParamSpec};
use crate::domain::series::{closes, PricePoint};
use crate::domain::strategy::{Signal, Strategy};

use super::trade_fraction_spec;

pub const ID: &str = "band-reversion";

#[derive(Debug, Default)]
pub struct BandReversion {
    cache: Option<(usize, VolatilityBands)>,
}

impl BandReversion {
    fn specs() -> Vec<ParamSpec> {
        vec![
            ParamSpec::number("period", 20.0).bounded(5.0, 50.0).stepped(15.0),
            ParamSpec::number("multiplier", 2.0).bounded(1.0, 3.0).stepped(1.0),
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
            let multiplier = params.number_or(&specs, "multiplier");
            self.cache = Some((series.len(), volatility_bands(&prices, period, multiplier)));
        }
    }
}

impl Strategy for BandReversion {
    fn id(&self) -> &'static str {
        ID
    }

    fn name(&self) -> &'static str {
        "Band Reversion"
    }

    fn description(&self) -> &'static str {
        "Buys below the lower volatility band and sells above the upper band"
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
        let (_, bands) = self.cache.as_ref().unwrap();

        let close = series[index].close;
        let (upper, lower) = (bands.upper[index], bands.lower[index]);

        if upper.is_nan() || lower.is_nan() {
            return Ok(Signal::Hold);
        }

        if close < lower {
            Ok(Signal::Buy)
        } else if close > upper {
            Ok(Signal::Sell)
        } else {
            Ok(Signal::Hold)
        }
    }
}
