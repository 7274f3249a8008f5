//! Built-in strategy implementations.

pub mod hold;
pub mod ma_crossover;
pub mod band_reversion;
pub mod oscillator_threshold;

pub use band_reversion::BandReversion;
pub use hold::HoldStrategy;
pub use ma_crossover::MaCrossover;
pub use oscillator_threshold::OscillatorThreshold;

use super::params::ParamSpec;

/// Fractional-sizing parameter shared by the trading strategies. The engine
/// reads it from validated params when declared; all-in/all-out otherwise.
pub const TRADE_FRACTION: &str = "trade_fraction";

pub(crate) fn trade_fraction_spec() -> ParamSpec {
    ParamSpec::number(TRADE_FRACTION, 1.0).bounded(0.01, 1.0)
}
