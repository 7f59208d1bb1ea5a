//! Configuration loading
//!
//! Layers, lowest precedence first:
//! 1. built-in defaults
//! 2. TOML file (`--config`, else `<user config dir>/pricecalc/config.toml` if present)
//! 3. `PRICECALC_*` environment variables (`PRICECALC_TAX_RATES=0,0.07`)
//! 4. command-line flags (`Overrides`)

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use pricecalc_core::application::runner::constants::{
    DEFAULT_DELIMITER, DEFAULT_INPUT_PATH, DEFAULT_MAX_WORKERS, DEFAULT_OUTPUT_PREFIX,
    DEFAULT_TAX_RATES,
};
use pricecalc_core::domain::TaxRate;
use pricecalc_core::{AppError, Result};
use pricecalc_infra_fs::OutputLayout;

const ENV_PREFIX: &str = "PRICECALC";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(AppError::Config(format!(
                "log_format must be \"pretty\" or \"json\", got {:?}",
                other
            ))),
        }
    }
}

/// Raw configuration as read from file and environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub input_path: String,
    pub output_dir: String,
    pub output_prefix: String,
    pub tax_rates: Vec<f64>,
    pub delimiter: String,
    pub max_workers: usize,
    pub log_format: String,
}

/// Values given on the command line; `None` keeps the configured value
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub input_path: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub output_prefix: Option<String>,
    pub tax_rates: Option<Vec<TaxRate>>,
    pub delimiter: Option<char>,
    pub max_workers: Option<usize>,
}

/// Validated settings a run is executed with
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub input_path: PathBuf,
    pub layout: OutputLayout,
    pub tax_rates: Vec<TaxRate>,
    pub delimiter: u8,
    pub max_workers: usize,
}

impl AppConfig {
    /// Load defaults, config file and environment
    ///
    /// An explicit `path` must exist; the per-user default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let default_path = default_config_path();
        Self::load_from(path, default_path.as_deref(), Environment::with_prefix(ENV_PREFIX))
    }

    fn load_from(explicit: Option<&Path>, fallback: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("input_path", DEFAULT_INPUT_PATH)
            .and_then(|b| b.set_default("output_dir", "."))
            .and_then(|b| b.set_default("output_prefix", DEFAULT_OUTPUT_PREFIX))
            .and_then(|b| b.set_default("tax_rates", DEFAULT_TAX_RATES.to_vec()))
            .and_then(|b| b.set_default("delimiter", DEFAULT_DELIMITER.to_string()))
            .and_then(|b| b.set_default("max_workers", DEFAULT_MAX_WORKERS as i64))
            .and_then(|b| b.set_default("log_format", "pretty"))
            .map_err(config_error)?;

        builder = match (explicit, fallback) {
            (Some(path), _) => builder.add_source(File::from(path).required(true)),
            (None, Some(path)) => builder.add_source(File::from(path).required(false)),
            (None, None) => builder,
        };

        let env = env
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("tax_rates");

        let config: AppConfig = builder
            .add_source(env)
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(config_error)?;

        config.log_format()?;
        Ok(config)
    }

    pub fn log_format(&self) -> Result<LogFormat> {
        self.log_format.parse()
    }

    /// Merge command-line overrides and validate the result
    pub fn settings(&self, overrides: &Overrides) -> Result<RunSettings> {
        let tax_rates = match &overrides.tax_rates {
            Some(rates) => rates.clone(),
            None => self
                .tax_rates
                .iter()
                .map(|r| TaxRate::try_from(*r))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| AppError::Config(format!("tax_rates: {}", e)))?,
        };
        if tax_rates.is_empty() {
            return Err(AppError::Config("at least one tax rate is required".to_string()));
        }

        let delimiter = match overrides.delimiter {
            Some(c) => c,
            None => single_char(&self.delimiter)?,
        };
        let delimiter = delimiter_byte(delimiter)?;

        let max_workers = overrides.max_workers.unwrap_or(self.max_workers);
        if max_workers == 0 {
            return Err(AppError::Config("max_workers must be at least 1".to_string()));
        }

        let output_prefix = overrides
            .output_prefix
            .clone()
            .unwrap_or_else(|| self.output_prefix.clone());
        if output_prefix.is_empty() || output_prefix.contains(['/', '\\']) {
            return Err(AppError::Config(format!(
                "output_prefix {:?} must be a non-empty file name prefix",
                output_prefix
            )));
        }

        let input_path = overrides
            .input_path
            .clone()
            .unwrap_or_else(|| expand(&self.input_path));
        let output_dir = overrides
            .output_dir
            .clone()
            .unwrap_or_else(|| expand(&self.output_dir));

        Ok(RunSettings {
            input_path,
            layout: OutputLayout::new(output_dir, output_prefix),
            tax_rates,
            delimiter,
            max_workers,
        })
    }
}

fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "pricecalc")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

fn single_char(value: &str) -> Result<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(AppError::Config(format!(
            "delimiter must be a single character, got {:?}",
            value
        ))),
    }
}

fn delimiter_byte(c: char) -> Result<u8> {
    if !c.is_ascii() || c == '"' || c == '\n' || c == '\r' {
        return Err(AppError::Config(format!(
            "delimiter {:?} must be an ASCII character other than a quote or newline",
            c
        )));
    }
    Ok(c as u8)
}

fn config_error(err: config::ConfigError) -> AppError {
    AppError::Config(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(source))
    }

    fn rates(settings: &RunSettings) -> Vec<String> {
        settings.tax_rates.iter().map(|r| r.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::load_from(None, None, env(&[])).unwrap();
        let settings = config.settings(&Overrides::default()).unwrap();

        assert_eq!(settings.input_path, PathBuf::from("prices.txt"));
        assert_eq!(settings.layout, OutputLayout::new(".", "result"));
        assert_eq!(rates(&settings), vec!["0", "0.07", "0.1", "0.15"]);
        assert_eq!(settings.delimiter, b',');
        assert_eq!(settings.max_workers, 1);
        assert_eq!(config.log_format().unwrap(), LogFormat::Pretty);
    }

    #[test]
    fn test_file_then_env_then_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pricecalc.toml");
        std::fs::write(
            &path,
            "input_path = \"items.txt\"\ndelimiter = \";\"\ntax_rates = [0.2]\nmax_workers = 4\n",
        )
        .unwrap();

        let config = AppConfig::load_from(
            Some(&path),
            None,
            env(&[("PRICECALC_TAX_RATES", "0.05,0.25"), ("PRICECALC_LOG_FORMAT", "json")]),
        )
        .unwrap();

        let settings = config.settings(&Overrides::default()).unwrap();
        assert_eq!(settings.input_path, PathBuf::from("items.txt"));
        assert_eq!(settings.delimiter, b';');
        assert_eq!(settings.max_workers, 4);
        assert_eq!(rates(&settings), vec!["0.05", "0.25"]);
        assert_eq!(config.log_format().unwrap(), LogFormat::Json);

        let overrides = Overrides {
            tax_rates: Some(vec!["0.19".parse().unwrap()]),
            delimiter: Some('|'),
            max_workers: Some(2),
            ..Default::default()
        };
        let settings = config.settings(&overrides).unwrap();
        assert_eq!(rates(&settings), vec!["0.19"]);
        assert_eq!(settings.delimiter, b'|');
        assert_eq!(settings.max_workers, 2);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppConfig::load_from(Some(&dir.path().join("nope.toml")), None, env(&[]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_missing_default_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppConfig::load_from(None, Some(&dir.path().join("config.toml")), env(&[]));
        assert!(result.is_ok());
    }

    #[test]
    fn test_invalid_values() {
        let config = AppConfig::load_from(None, None, env(&[])).unwrap();

        let mut bad = config.clone();
        bad.tax_rates = vec![0.1, -0.2];
        assert!(matches!(
            bad.settings(&Overrides::default()),
            Err(AppError::Config(_))
        ));

        let mut bad = config.clone();
        bad.tax_rates.clear();
        assert!(bad
            .settings(&Overrides::default())
            .unwrap_err()
            .to_string()
            .contains("at least one"));

        let mut bad = config.clone();
        bad.delimiter = ";;".to_string();
        assert!(bad.settings(&Overrides::default()).is_err());

        let overrides = Overrides {
            max_workers: Some(0),
            ..Default::default()
        };
        assert!(config.settings(&overrides).is_err());

        let overrides = Overrides {
            delimiter: Some('"'),
            ..Default::default()
        };
        assert!(config.settings(&overrides).is_err());

        assert!(AppConfig::load_from(None, None, env(&[("PRICECALC_LOG_FORMAT", "xml")])).is_err());
    }
}
