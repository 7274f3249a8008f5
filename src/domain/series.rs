//! Historical price bar representation and series validation.

use chrono::NaiveDateTime;

use super::error::StratlabError;

/// One historical price sample. Series are ordered ascending by timestamp
/// with no duplicates; spacing between bars may be uneven.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PricePoint {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Verify ascending, duplicate-free timestamps.
pub fn validate_series(series: &[PricePoint]) -> Result<(), StratlabError> {
    for pair in series.windows(2) {
        if pair[1].timestamp <= pair[0].timestamp {
            return Err(StratlabError::Validation {
                reason: format!(
                    "price series not strictly ascending at {}",
                    pair[1].timestamp
                ),
            });
        }
    }
    Ok(())
}

/// Extract the close-price column.
pub fn closes(series: &[PricePoint]) -> Vec<f64> {
    series.iter().map(|p| p.close).collect()
}
