//! Momentum oscillator (RSI-style).
//!
//! Uses Wilder's smoothing for average gain/loss calculation:
//! - First defined value: simple mean of gains/losses over the first `period`
//!   price changes
//! - Subsequent: avg = (prev_avg * (period-1) + current) / period
//!
//! Value = 100 - (100 / (1 + avg_gain / avg_loss)); if avg_loss == 0 the value
//! is 100. Warmup: the first `period` positions are NaN (a change needs two
//! prices, so the first defined value lands at index `period`).

pub fn momentum_oscillator(prices: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || prices.len() < 2 {
        return vec![f64::NAN; prices.len()];
    }

    let mut out = vec![f64::NAN; prices.len().min(period)];
    if prices.len() <= period {
        return out;
    }

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=period {
        let change = prices[i] - prices[i - 1];
        if change > 0.0 {
            avg_gain += change;
        } else {
            avg_loss += -change;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;
    out.push(oscillator_value(avg_gain, avg_loss));

    for i in (period + 1)..prices.len() {
        let change = prices[i] - prices[i - 1];
        let gain = if change > 0.0 { change } else { 0.0 };
        let loss = if change < 0.0 { -change } else { 0.0 };

        avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
        out.push(oscillator_value(avg_gain, avg_loss));
    }

    out
}

fn oscillator_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain > 0.0 {
            100.0
        } else {
            // Flat window: no gains, no losses.
            50.0
        }
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}
