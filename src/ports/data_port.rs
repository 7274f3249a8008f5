//! Historical price data access port.

use chrono::NaiveDate;

use crate::domain::error::StratlabError;
use crate::domain::series::PricePoint;

pub trait DataPort {
    /// Fetch the available bars for `symbol` within `[start_date, end_date]`,
    /// ordered ascending by timestamp with no duplicates. Partial coverage is
    /// valid; a symbol with no data at all is a `DataUnavailable` error.
    fn fetch(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, StratlabError>;
}
