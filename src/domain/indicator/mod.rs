//! Technical indicator implementations.
//!
//! All indicators are pure functions over a close-price slice, returning an
//! output the same length as the input. Positions where the trailing window
//! has not yet filled are `f64::NAN`.

pub mod moving_average;
pub mod bands;
pub mod oscillator;

pub use bands::{volatility_bands, VolatilityBands};
pub use moving_average::moving_average;
pub use oscillator::momentum_oscillator;
