//! Volatility bands around a moving-average midline.
//!
//! - Middle: simple moving average over the period
//! - Upper: middle + multiplier × stddev
//! - Lower: middle − multiplier × stddev
//!
//! Stddev is the population standard deviation (divides by N, not N−1) of the
//! same trailing window as the middle band. Constant windows give stddev 0,
//! so upper == middle == lower.

use super::moving_average::moving_average;

#[derive(Debug, Clone, PartialEq)]
pub struct VolatilityBands {
    pub middle: Vec<f64>,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
}

pub fn volatility_bands(prices: &[f64], period: usize, multiplier: f64) -> VolatilityBands {
    let middle = moving_average(prices, period);
    let mut upper = Vec::with_capacity(prices.len());
    let mut lower = Vec::with_capacity(prices.len());

    for i in 0..prices.len() {
        let mid = middle[i];
        if mid.is_nan() {
            upper.push(f64::NAN);
            lower.push(f64::NAN);
            continue;
        }

        let start = i + 1 - period;
        let window = &prices[start..=i];
        let variance =
            window.iter().map(|p| (p - mid) * (p - mid)).sum::<f64>() / period as f64;
        let stddev = variance.sqrt();

        upper.push(mid + multiplier * stddev);
        lower.push(mid - multiplier * stddev);
    }

    VolatilityBands {
        middle,
        upper,
        lower,
    }
}
