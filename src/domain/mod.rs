//! Core domain types and logic.

pub mod series;
pub mod indicator;
pub mod params;
pub mod strategy;
pub mod strategies;
pub mod registry;
pub mod backtest;
pub mod metrics;
pub mod selector;
pub mod choice_store;
pub mod error;
