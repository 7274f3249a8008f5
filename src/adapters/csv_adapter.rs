//! CSV file data adapter.
//!
//! Reads bars for a symbol from `{SYMBOL}.csv` under a base directory with
//! columns `timestamp,open,high,low,close,volume`. Timestamps accept either
//! `%Y-%m-%d %H:%M:%S` or a bare date (taken as midnight).

use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;

use crate::domain::error::StratlabError;
use crate::domain::series::PricePoint;
use crate::ports::data_port::DataPort;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

fn field<'a>(
    record: &'a csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<&'a str, StratlabError> {
    record.get(index).ok_or_else(|| StratlabError::DataSource {
        reason: format!("missing {} column", name),
    })
}

fn numeric_field(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<f64, StratlabError> {
    field(record, index, name)?
        .parse()
        .map_err(|e| StratlabError::DataSource {
            reason: format!("invalid {} value: {}", name, e),
        })
}

fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, StratlabError> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default())
        })
        .map_err(|e| StratlabError::DataSource {
            reason: format!("invalid timestamp: {}", e),
        })
}

impl DataPort for CsvAdapter {
    fn fetch(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, StratlabError> {
        let path = self.csv_path(symbol);
        if !path.exists() {
            return Err(StratlabError::DataUnavailable {
                symbol: symbol.to_string(),
            });
        }
        let content = fs::read_to_string(&path)?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| StratlabError::DataSource {
                reason: format!("CSV parse error: {}", e),
            })?;

            let timestamp = parse_timestamp(field(&record, 0, "timestamp")?)?;
            if timestamp.date() < start_date || timestamp.date() > end_date {
                continue;
            }

            bars.push(PricePoint {
                timestamp,
                open: numeric_field(&record, 1, "open")?,
                high: numeric_field(&record, 2, "high")?,
                low: numeric_field(&record, 3, "low")?,
                close: numeric_field(&record, 4, "close")?,
                volume: numeric_field(&record, 5, "volume")?,
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "timestamp,open,high,low,close,volume\n\
            2024-01-15,100.0,110.0,90.0,105.0,50000\n\
            2024-01-16,105.0,115.0,100.0,110.0,60000\n\
            2024-01-17,110.0,120.0,105.0,115.0,55000\n";
        fs::write(path.join("BHP.csv"), csv_content).unwrap();

        let intraday = "timestamp,open,high,low,close,volume\n\
            2024-01-15 10:00:00,10.0,10.5,9.5,10.2,1000\n\
            2024-01-15 11:00:00,10.2,10.8,10.0,10.6,1200\n";
        fs::write(path.join("INTRA.csv"), intraday).unwrap();

        fs::write(
            path.join("BAD.csv"),
            "timestamp,open,high,low,close,volume\n2024-01-15,abc,1,1,1,1\n",
        )
        .unwrap();

        (dir, path)
    }

    fn range(from: u32, to: u32) -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2024, 1, from).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, to).unwrap(),
        )
    }

    #[test]
    fn fetch_returns_all_bars_in_range() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let (start, end) = range(15, 17);
        let bars = adapter.fetch("BHP", start, end).unwrap();

        assert_eq!(bars.len(), 3);
        assert!((bars[0].open - 100.0).abs() < f64::EPSILON);
        assert!((bars[0].close - 105.0).abs() < f64::EPSILON);
        assert!((bars[0].volume - 50000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn fetch_filters_by_date() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let (start, end) = range(16, 16);
        let bars = adapter.fetch("BHP", start, end).unwrap();

        assert_eq!(bars.len(), 1);
        assert_eq!(
            bars[0].timestamp.date(),
            NaiveDate::from_ymd_opt(2024, 1, 16).unwrap()
        );
    }

    #[test]
    fn fetch_parses_intraday_timestamps() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let (start, end) = range(15, 15);
        let bars = adapter.fetch("INTRA", start, end).unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].timestamp.format("%H:%M").to_string(), "10:00");
    }

    #[test]
    fn fetch_missing_symbol_is_unavailable() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let (start, end) = range(1, 31);
        let err = adapter.fetch("XYZ", start, end).unwrap_err();
        assert!(matches!(err, StratlabError::DataUnavailable { .. }));
    }

    #[test]
    fn fetch_rejects_malformed_values() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let (start, end) = range(1, 31);
        let err = adapter.fetch("BAD", start, end).unwrap_err();
        assert!(matches!(err, StratlabError::DataSource { .. }));
    }

    #[test]
    fn fetch_outside_range_is_empty() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        let bars = adapter.fetch("BHP", start, end).unwrap();
        assert!(bars.is_empty());
    }
}
