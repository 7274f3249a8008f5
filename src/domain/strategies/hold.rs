//! Do-nothing baseline strategy.
//!
//! Always signals HOLD. Used as a benchmark candidate and as the selector's
//! fallback before its first evaluation window fills.

use crate::domain::error::StratlabError;
use crate::domain::params::{Params, ParamSpec};
use crate::domain::series::PricePoint;
use crate::domain::strategy::{Signal, Strategy};

#[derive(Debug, Default)]
pub struct HoldStrategy;

pub const ID: &str = "hold";

impl Strategy for HoldStrategy {
    fn id(&self) -> &'static str {
        ID
    }

    fn name(&self) -> &'static str {
        "Hold"
    }

    fn description(&self) -> &'static str {
        "Never trades; holds the starting cash for the whole run"
    }

    fn param_specs(&self) -> Vec<ParamSpec> {
        vec![]
    }

    fn evaluate(
        &mut self,
        _series: &[PricePoint],
        _index: usize,
        _params: &Params,
    ) -> Result<Signal, StratlabError> {
        Ok(Signal::Hold)
    }
}
