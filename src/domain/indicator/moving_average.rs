//! Simple moving average.
//!
//! Output at index i is the arithmetic mean of `prices[i-period+1..=i]`.
//! Warmup: first (period-1) positions are NaN. `period == 0` yields all NaN;
//! `period == 1` yields the input unchanged.

pub fn moving_average(prices: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return vec![f64::NAN; prices.len()];
    }

    let mut out = Vec::with_capacity(prices.len());

    // Each window is summed from scratch: a rolling add/subtract sum drifts
    // under cancellation at mixed magnitudes and breaks period-1 identity.
    for i in 0..prices.len() {
        if i + 1 < period {
            out.push(f64::NAN);
            continue;
        }
        let window = &prices[i + 1 - period..=i];
        out.push(window.iter().sum::<f64>() / period as f64);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ma_basic() {
        let prices = [10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0];
        let ma = moving_average(&prices, 3);

        assert_eq!(ma.len(), 7);
        assert!(ma[0].is_nan());
        assert!(ma[1].is_nan());
        assert!((ma[2] - 11.0).abs() < 1e-9);
        assert!((ma[3] - 12.0).abs() < 1e-9);
        assert!((ma[4] - 13.0).abs() < 1e-9);
        assert!((ma[5] - 14.0).abs() < 1e-9);
        assert!((ma[6] - 15.0).abs() < 1e-9);
    }

    #[test]
    fn ma_period_one_is_identity() {
        let prices = [10.0, 20.0, 15.0, 30.0];
        let ma = moving_average(&prices, 1);

        for (a, b) in ma.iter().zip(prices.iter()) {
            assert!((a - b).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn ma_period_one_identity_at_extreme_magnitudes() {
        // Mixed magnitudes cancel catastrophically under a rolling sum;
        // period 1 must still reproduce the input bit-for-bit.
        let prices = [1e16, 1.0, -1e16, 3.0];
        let ma = moving_average(&prices, 1);

        for (a, b) in ma.iter().zip(prices.iter()) {
            assert!(a == b, "expected {b}, got {a}");
        }
    }

    #[test]
    fn ma_zero_period_all_undefined() {
        let prices = [10.0, 20.0, 30.0];
        let ma = moving_average(&prices, 0);

        assert_eq!(ma.len(), 3);
        assert!(ma.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn ma_period_longer_than_series() {
        let prices = [10.0, 20.0];
        let ma = moving_average(&prices, 5);

        assert_eq!(ma.len(), 2);
        assert!(ma.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn ma_empty_input() {
        let ma = moving_average(&[], 3);
        assert!(ma.is_empty());
    }

    #[test]
    fn ma_constant_prices() {
        let prices = [5.0; 10];
        let ma = moving_average(&prices, 4);

        for v in &ma[3..] {
            assert!((v - 5.0).abs() < 1e-9);
        }
    }
}
