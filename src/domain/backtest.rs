//! Backtest engine: request validation, the bar-by-bar simulation loop, and
//! result assembly.
//!
//! Sizing policy is all-in/all-out: BUY converts available cash to shares at
//! the bar's close, SELL converts held shares back to cash. A strategy that
//! declares a `trade_fraction` parameter trades only that fraction per signal.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::choice_store::ChoiceStore;
use super::error::StratlabError;
use super::metrics::Metrics;
use super::params::{ParamValue, Params};
use super::registry::StrategyRegistry;
use super::selector::Decision;
use super::series::{validate_series, PricePoint};
use super::strategies::TRADE_FRACTION;
use super::strategy::{Signal, Strategy};

/// Bars per year for a daily series; used wherever returns are annualized.
pub const DAILY_BARS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TradeAction {
    Buy,
    Sell,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Trade {
    pub timestamp: chrono::NaiveDateTime,
    pub action: TradeAction,
    pub price: f64,
    pub shares: f64,
    pub cash_after: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EquityPoint {
    pub timestamp: chrono::NaiveDateTime,
    pub value: f64,
}

/// Cash and share holdings during a run. Both are non-negative; they are only
/// mutated together inside the trade application step.
#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub shares_held: f64,
}

impl Portfolio {
    pub fn new(starting_cash: f64) -> Self {
        Portfolio {
            cash: starting_cash,
            shares_held: 0.0,
        }
    }

    pub fn value(&self, close: f64) -> f64 {
        self.cash + self.shares_held * close
    }
}

#[derive(Debug, Clone)]
pub struct BacktestRequest {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub starting_cash: f64,
    pub strategy_id: String,
    pub params: BTreeMap<String, ParamValue>,
    pub bars_per_year: f64,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BacktestResult {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_value: f64,
    pub final_value: f64,
    pub profit_loss: f64,
    pub profit_loss_pct: f64,
    pub total_trades: usize,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    pub decisions: Option<Vec<Decision>>,
    pub metrics: Metrics,
}

/// Trades and equity history of one simulation pass.
#[derive(Debug, Clone, Default)]
pub struct Simulation {
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
}

impl Simulation {
    pub fn final_value(&self) -> Option<f64> {
        self.equity_curve.last().map(|p| p.value)
    }
}

/// Run the core loop over `series`. Pure with respect to everything except
/// the strategy instance: the selector reuses this for its windowed
/// sub-backtests without touching the outer engine's state.
pub fn simulate(
    series: &[PricePoint],
    strategy: &mut dyn Strategy,
    params: &Params,
    starting_cash: f64,
) -> Result<Simulation, StratlabError> {
    let fraction = params
        .get(TRADE_FRACTION)
        .and_then(ParamValue::as_number)
        .unwrap_or(1.0);

    let mut portfolio = Portfolio::new(starting_cash);
    let mut sim = Simulation::default();

    for (i, bar) in series.iter().enumerate() {
        let signal =
            strategy
                .evaluate(series, i, params)
                .map_err(|e| StratlabError::StrategyExecution {
                    id: strategy.id().to_string(),
                    reason: e.to_string(),
                })?;

        match signal {
            Signal::Buy if portfolio.cash > 0.0 => {
                let spend = portfolio.cash * fraction;
                let shares = spend / bar.close;
                portfolio.cash -= spend;
                portfolio.shares_held += shares;
                sim.trades.push(Trade {
                    timestamp: bar.timestamp,
                    action: TradeAction::Buy,
                    price: bar.close,
                    shares,
                    cash_after: portfolio.cash,
                });
            }
            Signal::Sell if portfolio.shares_held > 0.0 => {
                let shares = portfolio.shares_held * fraction;
                portfolio.shares_held -= shares;
                portfolio.cash += shares * bar.close;
                sim.trades.push(Trade {
                    timestamp: bar.timestamp,
                    action: TradeAction::Sell,
                    price: bar.close,
                    shares,
                    cash_after: portfolio.cash,
                });
            }
            _ => {}
        }

        sim.equity_curve.push(EquityPoint {
            timestamp: bar.timestamp,
            value: portfolio.value(bar.close),
        });
    }

    Ok(sim)
}

/// Validate a request and run one full backtest over the fetched series.
pub fn run_backtest(
    request: &BacktestRequest,
    series: &[PricePoint],
    registry: &StrategyRegistry,
    choices: &Arc<ChoiceStore>,
) -> Result<BacktestResult, StratlabError> {
    if request.end_date <= request.start_date {
        return Err(StratlabError::Validation {
            reason: format!(
                "end date {} must be after start date {}",
                request.end_date, request.start_date
            ),
        });
    }
    if request.starting_cash <= 0.0 {
        return Err(StratlabError::Validation {
            reason: format!("starting cash must be positive, got {}", request.starting_cash),
        });
    }

    let mut strategy = registry.create(
        &request.strategy_id,
        &request.symbol,
        choices,
        request.bars_per_year,
    )?;
    let params = Params::validate(&request.params, &strategy.param_specs())?;

    if series.is_empty() {
        return Err(StratlabError::DataUnavailable {
            symbol: request.symbol.clone(),
        });
    }
    validate_series(series)?;

    let sim = simulate(series, strategy.as_mut(), &params, request.starting_cash)?;

    let final_value = sim.final_value().unwrap_or(request.starting_cash);
    let profit_loss = final_value - request.starting_cash;
    let metrics = Metrics::compute(&sim.equity_curve, &sim.trades, request.bars_per_year);

    Ok(BacktestResult {
        symbol: request.symbol.clone(),
        start_date: request.start_date,
        end_date: request.end_date,
        initial_value: request.starting_cash,
        final_value,
        profit_loss,
        profit_loss_pct: profit_loss / request.starting_cash * 100.0,
        total_trades: sim.trades.len(),
        trades: sim.trades,
        equity_curve: sim.equity_curve,
        decisions: strategy.take_decisions(),
        metrics,
    })
}
