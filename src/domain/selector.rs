//! Selector meta-strategy.
//!
//! At each re-evaluation point the selector backtests every candidate strategy
//! (optionally across its parameter grid) over a trailing lookback window,
//! picks the best scorer under the configured metric, records the choice, and
//! delegates signal generation to the winner until the next re-evaluation.
//! Sub-backtests run on a nominal cash amount and are fully isolated from the
//! outer engine's portfolio.

use std::sync::Arc;

use super::backtest::simulate;
use super::choice_store::{ActiveChoice, ChoiceStore};
use super::error::StratlabError;
use super::metrics::Metrics;
use super::params::{enumerate_grid, Params, ParamSpec};
use super::series::PricePoint;
use super::strategy::{Signal, Strategy, StrategyInfo};

pub const ID: &str = "selector";

/// Cash given to every windowed sub-backtest. Scores compare runs against each
/// other, so the absolute amount is irrelevant as long as it is shared.
const NOMINAL_CASH: f64 = 10_000.0;

/// Constructor for a fresh candidate instance.
pub type StrategyCtor = fn() -> Box<dyn Strategy>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalMetric {
    Pnl,
    Sharpe,
    WinRate,
}

impl EvalMetric {
    pub fn parse(name: &str) -> Result<EvalMetric, StratlabError> {
        match name {
            "pnl" => Ok(EvalMetric::Pnl),
            "sharpe" => Ok(EvalMetric::Sharpe),
            "winrate" => Ok(EvalMetric::WinRate),
            other => Err(StratlabError::Validation {
                reason: format!("unknown evaluation metric: {other} (expected pnl, sharpe or winrate)"),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EvalMetric::Pnl => "pnl",
            EvalMetric::Sharpe => "sharpe",
            EvalMetric::WinRate => "winrate",
        }
    }
}

/// One entry of the selector's decision log: what was chosen at a
/// re-evaluation point and the score that won. `score` is `None` during
/// warm-up (window below the minimum) or when the metric was undefined on the
/// winning sub-backtest.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Decision {
    pub timestamp: chrono::NaiveDateTime,
    pub strategy_id: String,
    pub parameters: Params,
    pub score: Option<f64>,
    pub metric: &'static str,
}

struct ActiveStrategy {
    id: String,
    name: String,
    params: Params,
    instance: Box<dyn Strategy>,
}

pub struct SelectorStrategy {
    candidates: Vec<(StrategyInfo, StrategyCtor)>,
    choices: Arc<ChoiceStore>,
    symbol: String,
    bars_per_year: f64,
    active: Option<ActiveStrategy>,
    decisions: Vec<Decision>,
    last_eval: Option<usize>,
}

impl SelectorStrategy {
    pub fn new(
        candidates: Vec<(StrategyInfo, StrategyCtor)>,
        choices: Arc<ChoiceStore>,
        symbol: &str,
        bars_per_year: f64,
    ) -> Self {
        SelectorStrategy {
            candidates,
            choices,
            symbol: symbol.to_string(),
            bars_per_year,
            active: None,
            decisions: Vec::new(),
            last_eval: None,
        }
    }

    fn specs() -> Vec<ParamSpec> {
        vec![
            ParamSpec::number("lookback", 30.0).bounded(2.0, 500.0),
            ParamSpec::number("min_bars", 10.0).bounded(2.0, 500.0),
            ParamSpec::number("cadence", 1.0).bounded(1.0, 100.0),
            ParamSpec::text("metric", "pnl"),
            ParamSpec::flag("optimize", false),
        ]
    }

    fn due_for_evaluation(&self, index: usize, cadence: usize) -> bool {
        match self.last_eval {
            None => true,
            Some(last) => index - last >= cadence,
        }
    }

    /// Score every candidate/combination over the window and install the
    /// winner. Ties keep the earlier-enumerated entry (strict greater-than).
    fn evaluate_candidates(
        &mut self,
        window: &[PricePoint],
        metric: EvalMetric,
        optimize: bool,
    ) -> Result<(), StratlabError> {
        let mut best: Option<(usize, Params, Option<f64>)> = None;

        for (cand_idx, (info, ctor)) in self.candidates.iter().enumerate() {
            let combos = if optimize {
                enumerate_grid(&info.param_specs)
            } else {
                vec![Params::default()]
            };

            for combo in combos {
                let score = score_window(window, *ctor, &combo, metric, self.bars_per_year)?;
                let better = match &best {
                    None => true,
                    Some((_, _, best_score)) => score_beats(score, *best_score),
                };
                if better {
                    best = Some((cand_idx, combo, score));
                }
            }
        }

        let Some((cand_idx, params, score)) = best else {
            return Ok(());
        };
        let info = &self.candidates[cand_idx].0;

        self.choices.record(
            &self.symbol,
            ActiveChoice {
                strategy_id: info.id.to_string(),
                strategy_name: info.name.to_string(),
                parameters: params.clone(),
            },
        );
        self.decisions.push(Decision {
            timestamp: window[window.len() - 1].timestamp,
            strategy_id: info.id.to_string(),
            parameters: params.clone(),
            score,
            metric: metric.name(),
        });

        let unchanged = self
            .active
            .as_ref()
            .is_some_and(|a| a.id == info.id && a.params == params);
        if !unchanged {
            self.active = Some(ActiveStrategy {
                id: info.id.to_string(),
                name: info.name.to_string(),
                params,
                instance: (self.candidates[cand_idx].1)(),
            });
        }

        Ok(())
    }

    /// Log the re-evaluation point when the window was too small to score:
    /// the incumbent (or `hold`) stays active with no score.
    fn log_skipped(&mut self, timestamp: chrono::NaiveDateTime, metric: EvalMetric) {
        let (strategy_id, parameters) = match &self.active {
            Some(active) => (active.id.clone(), active.params.clone()),
            None => ("hold".to_string(), Params::default()),
        };
        self.decisions.push(Decision {
            timestamp,
            strategy_id,
            parameters,
            score: None,
            metric: metric.name(),
        });
    }
}

impl Strategy for SelectorStrategy {
    fn id(&self) -> &'static str {
        ID
    }

    fn name(&self) -> &'static str {
        "Selector"
    }

    fn description(&self) -> &'static str {
        "Periodically backtests every candidate strategy over a trailing window and trades the best one"
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
        let specs = Self::specs();
        let lookback = params.number_or(&specs, "lookback") as usize;
        let min_bars = params.number_or(&specs, "min_bars") as usize;
        let cadence = (params.number_or(&specs, "cadence") as usize).max(1);
        let metric = EvalMetric::parse(params.text_or(&specs, "metric"))?;
        let optimize = params.flag_or(&specs, "optimize");

        if self.due_for_evaluation(index, cadence) {
            self.last_eval = Some(index);
            let start = (index + 1).saturating_sub(lookback);
            let window = &series[start..=index];

            if window.len() < min_bars {
                self.log_skipped(series[index].timestamp, metric);
            } else {
                self.evaluate_candidates(window, metric, optimize)?;
            }
        }

        match &mut self.active {
            Some(active) => {
                let params = active.params.clone();
                active.instance.evaluate(series, index, &params)
            }
            None => Ok(Signal::Hold),
        }
    }

    fn take_decisions(&mut self) -> Option<Vec<Decision>> {
        Some(std::mem::take(&mut self.decisions))
    }
}

/// Run one isolated sub-backtest of a candidate over `window` and report its
/// score under `metric`.
fn score_window(
    window: &[PricePoint],
    ctor: StrategyCtor,
    params: &Params,
    metric: EvalMetric,
    bars_per_year: f64,
) -> Result<Option<f64>, StratlabError> {
    let mut instance = ctor();
    let sim = simulate(window, instance.as_mut(), params, NOMINAL_CASH)?;

    let score = match metric {
        EvalMetric::Pnl => sim.final_value().map(|v| v - NOMINAL_CASH),
        EvalMetric::Sharpe => {
            Metrics::compute(&sim.equity_curve, &sim.trades, bars_per_year).sharpe_ratio
        }
        EvalMetric::WinRate => Metrics::compute(&sim.equity_curve, &sim.trades, 0.0).win_rate,
    };
    Ok(score)
}

/// Strict ordering between optional scores. Undefined never wins, and a
/// defined score beats undefined.
fn score_beats(candidate: Option<f64>, incumbent: Option<f64>) -> bool {
    match (candidate, incumbent) {
        (Some(c), Some(i)) => c > i,
        (Some(_), None) => true,
        (None, _) => false,
    }
}
