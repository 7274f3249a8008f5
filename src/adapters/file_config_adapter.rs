//! INI file configuration adapter.

use configparser::ini::Ini;
use std::path::Path;

use crate::domain::error::StratlabError;
use crate::ports::config_port::ConfigPort;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StratlabError> {
        let mut config = Ini::new();
        config
            .load(path.as_ref())
            .map_err(|e| StratlabError::ConfigParse {
                file: path.as_ref().display().to_string(),
                reason: e,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, StratlabError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|e| StratlabError::ConfigParse {
                file: "<inline>".to_string(),
                reason: e,
            })?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_ref()
            .and_then(|v| Self::parse_bool(v))
            .unwrap_or(default)
    }

    fn section(&self, section: &str) -> Vec<(String, String)> {
        let map = self.config.get_map();
        let mut pairs: Vec<(String, String)> = map
            .as_ref()
            .and_then(|m| m.get(section))
            .map(|keys| {
                keys.iter()
                    .filter_map(|(k, v)| v.as_ref().map(|v| (k.clone(), v.clone())))
                    .collect()
            })
            .unwrap_or_default();
        pairs.sort();
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn from_string_parses_sections() {
        let content = "\
[backtest]
symbol = AAPL
starting_cash = 10000.0
strategy = ma-crossover

[params]
fast = 5
";
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("backtest", "symbol"),
            Some("AAPL".to_string())
        );
        assert_eq!(
            adapter.get_double("backtest", "starting_cash", 0.0),
            10000.0
        );
        assert_eq!(adapter.get_int("params", "fast", 0), 5);
    }

    #[test]
    fn missing_keys_fall_back() {
        let adapter = FileConfigAdapter::from_string("[backtest]\nsymbol = A\n").unwrap();
        assert_eq!(adapter.get_string("backtest", "missing"), None);
        assert_eq!(adapter.get_int("backtest", "missing", 7), 7);
        assert_eq!(adapter.get_double("backtest", "missing", 1.5), 1.5);
        assert!(adapter.get_bool("backtest", "missing", true));
    }

    #[test]
    fn non_numeric_values_fall_back() {
        let adapter = FileConfigAdapter::from_string("[backtest]\ncash = lots\n").unwrap();
        assert_eq!(adapter.get_int("backtest", "cash", 42), 42);
        assert_eq!(adapter.get_double("backtest", "cash", 9.9), 9.9);
    }

    #[test]
    fn bool_spellings() {
        let adapter = FileConfigAdapter::from_string(
            "[flags]\na = true\nb = yes\nc = 1\nd = false\ne = no\nf = 0\n",
        )
        .unwrap();
        assert!(adapter.get_bool("flags", "a", false));
        assert!(adapter.get_bool("flags", "b", false));
        assert!(adapter.get_bool("flags", "c", false));
        assert!(!adapter.get_bool("flags", "d", true));
        assert!(!adapter.get_bool("flags", "e", true));
        assert!(!adapter.get_bool("flags", "f", true));
    }

    #[test]
    fn section_lists_all_pairs() {
        let adapter =
            FileConfigAdapter::from_string("[params]\nfast = 5\nslow = 20\n").unwrap();
        let pairs = adapter.section("params");
        assert_eq!(
            pairs,
            vec![
                ("fast".to_string(), "5".to_string()),
                ("slow".to_string(), "20".to_string()),
            ]
        );
        assert!(adapter.section("missing").is_empty());
    }

    #[test]
    fn from_file_reads_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[backtest]\nsymbol = BHP\n").unwrap();

        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("backtest", "symbol"),
            Some("BHP".to_string())
        );
    }

    #[test]
    fn from_file_missing_is_an_error() {
        let result = FileConfigAdapter::from_file("/nonexistent/config.ini");
        assert!(matches!(result, Err(StratlabError::ConfigParse { .. })));
    }
}
