//! Strategy registry: id-keyed catalogue of available strategies.
//!
//! The registry hands out a fresh instance per backtest run, so per-run
//! scratch state never leaks between runs. The selector is registered like any
//! other strategy but is constructed with the catalogue of concrete candidates
//! plus the shared choice store.

use std::sync::Arc;

use super::backtest::DAILY_BARS_PER_YEAR;
use super::choice_store::ChoiceStore;
use super::error::StratlabError;
use super::selector::{self, SelectorStrategy, StrategyCtor};
use super::strategies::{BandReversion, HoldStrategy, MaCrossover, OscillatorThreshold};
use super::strategy::{Strategy, StrategyInfo};

pub struct StrategyRegistry {
    entries: Vec<(StrategyInfo, StrategyCtor)>,
}

fn entry(ctor: StrategyCtor) -> (StrategyInfo, StrategyCtor) {
    let instance = ctor();
    (
        StrategyInfo {
            id: instance.id(),
            name: instance.name(),
            description: instance.description(),
            param_specs: instance.param_specs(),
        },
        ctor,
    )
}

impl StrategyRegistry {
    /// The standard catalogue: every concrete strategy plus the selector.
    pub fn standard() -> Self {
        StrategyRegistry {
            entries: vec![
                entry(|| Box::new(MaCrossover::default())),
                entry(|| Box::new(BandReversion::default())),
                entry(|| Box::new(OscillatorThreshold::default())),
                entry(|| Box::new(HoldStrategy)),
            ],
        }
    }

    /// Listing of every available strategy, selector included.
    pub fn list(&self) -> Vec<StrategyInfo> {
        let mut infos: Vec<StrategyInfo> =
            self.entries.iter().map(|(info, _)| info.clone()).collect();

        let selector = SelectorStrategy::new(
            Vec::new(),
            Arc::new(ChoiceStore::new()),
            "",
            DAILY_BARS_PER_YEAR,
        );
        infos.push(StrategyInfo {
            id: selector.id(),
            name: selector.name(),
            description: selector.description(),
            param_specs: selector.param_specs(),
        });
        infos
    }

    /// Candidate catalogue the selector scores: every concrete strategy.
    pub fn selector_candidates(&self) -> Vec<(StrategyInfo, StrategyCtor)> {
        self.entries.clone()
    }

    /// Instantiate a fresh strategy for one run. `bars_per_year` feeds the
    /// selector's annualized scoring and is ignored by concrete strategies.
    pub fn create(
        &self,
        id: &str,
        symbol: &str,
        choices: &Arc<ChoiceStore>,
        bars_per_year: f64,
    ) -> Result<Box<dyn Strategy>, StratlabError> {
        if id == selector::ID {
            return Ok(Box::new(SelectorStrategy::new(
                self.selector_candidates(),
                Arc::clone(choices),
                symbol,
                bars_per_year,
            )));
        }

        self.entries
            .iter()
            .find(|(info, _)| info.id == id)
            .map(|(_, ctor)| ctor())
            .ok_or_else(|| StratlabError::UnknownStrategy { id: id.to_string() })
    }
}
