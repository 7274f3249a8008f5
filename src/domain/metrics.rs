//! Performance metrics computed once per completed backtest.
//!
//! Ratios that are meaningless on the given data (too few returns, zero
//! volatility, zero elapsed time, no completed round-trips) are reported as
//! `None` rather than coerced to a sentinel value.

use super::backtest::{EquityPoint, Trade, TradeAction};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Metrics {
    pub sharpe_ratio: Option<f64>,
    pub max_drawdown: f64,
    pub cagr: Option<f64>,
    pub win_rate: Option<f64>,
}

impl Metrics {
    pub fn compute(equity_curve: &[EquityPoint], trades: &[Trade], bars_per_year: f64) -> Self {
        Metrics {
            sharpe_ratio: compute_sharpe(equity_curve, bars_per_year),
            max_drawdown: compute_drawdown(equity_curve),
            cagr: compute_cagr(equity_curve),
            win_rate: compute_win_rate(trades),
        }
    }
}

/// Per-bar returns of the equity curve.
fn returns(equity_curve: &[EquityPoint]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .map(|w| {
            let prev = w[0].value;
            if prev > 0.0 {
                (w[1].value - prev) / prev
            } else {
                0.0
            }
        })
        .collect()
}

fn compute_sharpe(equity_curve: &[EquityPoint], bars_per_year: f64) -> Option<f64> {
    let returns = returns(equity_curve);
    if returns.len() < 2 {
        return None;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        Some(mean / stddev * bars_per_year.sqrt())
    } else {
        None
    }
}

/// Largest peak-to-trough decline as a fraction of the running peak.
fn compute_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    let mut peak = f64::MIN;
    let mut max_dd = 0.0_f64;

    for point in equity_curve {
        if point.value > peak {
            peak = point.value;
        } else if peak > 0.0 {
            let dd = (peak - point.value) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}

fn compute_cagr(equity_curve: &[EquityPoint]) -> Option<f64> {
    let first = equity_curve.first()?;
    let last = equity_curve.last()?;

    let days = (last.timestamp - first.timestamp).num_days();
    if days == 0 || first.value <= 0.0 {
        return None;
    }

    Some((last.value / first.value).powf(365.0 / days as f64) - 1.0)
}

/// Fraction of completed round-trips that realized a gain. A round-trip is a
/// BUY paired with the next SELL; the all-in/all-out policy makes the pairing
/// unambiguous.
fn compute_win_rate(trades: &[Trade]) -> Option<f64> {
    let mut round_trips = 0usize;
    let mut wins = 0usize;
    let mut open_entry: Option<f64> = None;

    for trade in trades {
        match trade.action {
            TradeAction::Buy => {
                if open_entry.is_none() {
                    open_entry = Some(trade.price);
                }
            }
            TradeAction::Sell => {
                if let Some(entry) = open_entry.take() {
                    round_trips += 1;
                    if trade.price > entry {
                        wins += 1;
                    }
                }
            }
        }
    }

    if round_trips > 0 {
        Some(wins as f64 / round_trips as f64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_curve(values: &[f64]) -> Vec<EquityPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| EquityPoint {
                timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
                    + chrono::Duration::days(i as i64),
                value,
            })
            .collect()
    }

    fn make_trade(action: TradeAction, price: f64, day: i64) -> Trade {
        Trade {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
                + chrono::Duration::days(day),
            action,
            price,
            shares: 10.0,
            cash_after: 0.0,
        }
    }

    #[test]
    fn sharpe_undefined_on_short_curve() {
        assert!(compute_sharpe(&make_curve(&[100.0, 101.0]), 252.0).is_none());
        assert!(compute_sharpe(&make_curve(&[100.0]), 252.0).is_none());
        assert!(compute_sharpe(&[], 252.0).is_none());
    }

    #[test]
    fn sharpe_undefined_on_flat_curve() {
        assert!(compute_sharpe(&make_curve(&[100.0; 10]), 252.0).is_none());
    }

    #[test]
    fn sharpe_positive_on_rising_curve() {
        let curve = make_curve(&[100.0, 101.0, 103.0, 104.0, 107.0, 108.0]);
        let sharpe = compute_sharpe(&curve, 252.0).unwrap();
        assert!(sharpe > 0.0);
    }

    #[test]
    fn sharpe_scales_with_annualization() {
        let curve = make_curve(&[100.0, 101.0, 103.0, 104.0, 107.0, 108.0]);
        let daily = compute_sharpe(&curve, 252.0).unwrap();
        let hourly = compute_sharpe(&curve, 252.0 * 6.5).unwrap();
        assert!((hourly / daily - 6.5_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn drawdown_zero_on_monotone_rise() {
        let curve = make_curve(&[100.0, 110.0, 120.0, 130.0]);
        assert!((compute_drawdown(&curve) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn drawdown_tracks_running_peak() {
        let curve = make_curve(&[100.0, 110.0, 90.0, 95.0, 80.0, 100.0]);
        let expected = (110.0 - 80.0) / 110.0;
        assert!((compute_drawdown(&curve) - expected).abs() < 1e-9);
    }

    #[test]
    fn drawdown_empty_curve_is_zero() {
        assert!((compute_drawdown(&[]) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn cagr_doubling_over_a_year() {
        let mut curve = make_curve(&[100.0]);
        curve.push(EquityPoint {
            timestamp: curve[0].timestamp + chrono::Duration::days(365),
            value: 200.0,
        });
        let cagr = compute_cagr(&curve).unwrap();
        assert!((cagr - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cagr_undefined_for_zero_elapsed_days() {
        let curve = vec![
            EquityPoint {
                timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .and_hms_opt(9, 0, 0)
                    .unwrap(),
                value: 100.0,
            },
            EquityPoint {
                timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .and_hms_opt(16, 0, 0)
                    .unwrap(),
                value: 110.0,
            },
        ];
        assert!(compute_cagr(&curve).is_none());
    }

    #[test]
    fn win_rate_counts_round_trips() {
        let trades = vec![
            make_trade(TradeAction::Buy, 10.0, 0),
            make_trade(TradeAction::Sell, 15.0, 1), // win
            make_trade(TradeAction::Buy, 20.0, 2),
            make_trade(TradeAction::Sell, 18.0, 3), // loss
        ];
        assert!((compute_win_rate(&trades).unwrap() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn win_rate_ignores_open_position() {
        let trades = vec![
            make_trade(TradeAction::Buy, 10.0, 0),
            make_trade(TradeAction::Sell, 15.0, 1),
            make_trade(TradeAction::Buy, 20.0, 2), // never exited
        ];
        assert!((compute_win_rate(&trades).unwrap() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn win_rate_flat_exit_is_not_a_win() {
        let trades = vec![
            make_trade(TradeAction::Buy, 10.0, 0),
            make_trade(TradeAction::Sell, 10.0, 1),
        ];
        assert!((compute_win_rate(&trades).unwrap() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn win_rate_undefined_without_round_trips() {
        assert!(compute_win_rate(&[]).is_none());
        let only_buy = vec![make_trade(TradeAction::Buy, 10.0, 0)];
        assert!(compute_win_rate(&only_buy).is_none());
    }

    #[test]
    fn compute_assembles_all_fields() {
        let curve = make_curve(&[100.0, 105.0, 102.0, 108.0, 110.0]);
        let trades = vec![
            make_trade(TradeAction::Buy, 100.0, 0),
            make_trade(TradeAction::Sell, 108.0, 3),
        ];
        let metrics = Metrics::compute(&curve, &trades, 252.0);

        assert!(metrics.sharpe_ratio.is_some());
        assert!(metrics.max_drawdown > 0.0);
        assert!(metrics.cagr.is_some());
        assert!((metrics.win_rate.unwrap() - 1.0).abs() < f64::EPSILON);
    }
}
