//! Strategy capability contract.
//!
//! A strategy is evaluated once per bar with strictly increasing indices and
//! returns exactly one signal derived only from data at indices <= the current
//! one. Mutable scratch state lives inside the instance; the registry hands
//! out a fresh instance per backtest run so state never leaks across runs.

use super::error::StratlabError;
use super::params::{Params, ParamSpec};
use super::selector::Decision;
use super::series::PricePoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::Hold => write!(f, "HOLD"),
        }
    }
}

/// Descriptive listing entry for a registered strategy.
#[derive(Debug, Clone)]
pub struct StrategyInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub param_specs: Vec<ParamSpec>,
}

pub trait Strategy {
    fn id(&self) -> &'static str;
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn param_specs(&self) -> Vec<ParamSpec>;

    /// Produce the signal for `index`. `params` has already been validated
    /// against [`Strategy::param_specs`].
    fn evaluate(
        &mut self,
        series: &[PricePoint],
        index: usize,
        params: &Params,
    ) -> Result<Signal, StratlabError>;

    /// Drain the decision log accumulated during a run. Only meta-strategies
    /// produce one; everything else reports `None`.
    fn take_decisions(&mut self) -> Option<Vec<Decision>> {
        None
    }
}
