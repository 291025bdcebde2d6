//! INI file configuration adapter.

use crate::domain::error::StockPulseError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StockPulseError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config.load(path).map_err(|reason| StockPulseError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, StockPulseError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| StockPulseError::ConfigParse {
                file: "<string>".into(),
                reason,
            })?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config
            .get(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
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
            .as_deref()
            .and_then(Self::parse_bool)
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[simulation]
symbol = AAPL
initial_capital = 25000.0
strategy = rsi

[data]
prices_dir = /var/data/prices
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(adapter.get_string("simulation", "symbol"), Some("AAPL".to_string()));
        assert_eq!(adapter.get_string("simulation", "strategy"), Some("rsi".to_string()));
        assert_eq!(
            adapter.get_string("data", "prices_dir"),
            Some("/var/data/prices".to_string())
        );
    }

    #[test]
    fn get_string_returns_none_for_missing_or_blank_key() {
        let adapter =
            FileConfigAdapter::from_string("[simulation]\nsymbol = AAPL\nend_date =\n").unwrap();
        assert_eq!(adapter.get_string("simulation", "missing"), None);
        assert_eq!(adapter.get_string("simulation", "end_date"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_int_returns_value_or_default() {
        let adapter =
            FileConfigAdapter::from_string("[indicators]\nsma_fast = 10\nrsi = abc\n").unwrap();
        assert_eq!(adapter.get_int("indicators", "sma_fast", 20), 10);
        assert_eq!(adapter.get_int("indicators", "sma_slow", 50), 50);
        assert_eq!(adapter.get_int("indicators", "rsi", 14), 14);
    }

    #[test]
    fn get_double_returns_value() {
        let adapter =
            FileConfigAdapter::from_string("[simulation]\ninitial_capital = 10000.5\n").unwrap();
        assert_eq!(adapter.get_double("simulation", "initial_capital", 0.0), 10000.5);
    }

    #[test]
    fn get_double_returns_default_for_missing_or_non_numeric() {
        let adapter =
            FileConfigAdapter::from_string("[signal]\nma_weight = not_a_number\n").unwrap();
        assert_eq!(adapter.get_double("signal", "ma_weight", 0.3), 0.3);
        assert_eq!(adapter.get_double("signal", "trend_weight", 0.4), 0.4);
    }

    #[test]
    fn get_bool_accepts_common_spellings() {
        let adapter = FileConfigAdapter::from_string(
            "[simulation]\na = true\nb = YES\nc = 1\nd = false\ne = no\nf = off\n",
        )
        .unwrap();
        assert!(adapter.get_bool("simulation", "a", false));
        assert!(adapter.get_bool("simulation", "b", false));
        assert!(adapter.get_bool("simulation", "c", false));
        assert!(!adapter.get_bool("simulation", "d", true));
        assert!(!adapter.get_bool("simulation", "e", true));
        assert!(!adapter.get_bool("simulation", "f", true));
    }

    #[test]
    fn get_bool_returns_default_for_missing_or_garbage() {
        let adapter =
            FileConfigAdapter::from_string("[simulation]\nfractional_shares = maybe\n").unwrap();
        assert!(adapter.get_bool("simulation", "fractional_shares", true));
        assert!(!adapter.get_bool("simulation", "missing", false));
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[data]\nsentiment_dir = /tmp/news\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("data", "sentiment_dir"),
            Some("/tmp/news".to_string())
        );
    }

    #[test]
    fn from_file_missing_file_is_config_parse_error() {
        let err = FileConfigAdapter::from_file("/nonexistent/path/stockpulse.ini").unwrap_err();
        match err {
            StockPulseError::ConfigParse { file, .. } => {
                assert_eq!(file, "/nonexistent/path/stockpulse.ini")
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
