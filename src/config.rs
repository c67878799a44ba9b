use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::extract::DEFAULT_ENTITY_LABELS;
use crate::gazetteer::{NominatimSettings, DEFAULT_ENDPOINT, DEFAULT_USER_AGENT};
use crate::models::AreaBand;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub parser: ParserConfig,
    pub gazetteer: GazetteerConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ParserConfig {
    /// Smallest accepted area in km²
    pub area_low: Option<f64>,
    /// Largest accepted area in km²
    pub area_high: Option<f64>,
    /// Merge every place of a document into one record
    pub union: bool,
    pub entity_labels: Vec<String>,
    /// 0 uses one worker per core
    pub threads: usize,
    pub log_trees: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            area_low: None,
            area_high: None,
            union: true,
            entity_labels: DEFAULT_ENTITY_LABELS.iter().map(|s| s.to_string()).collect(),
            threads: 0,
            log_trees: false,
        }
    }
}

impl ParserConfig {
    pub fn band(&self) -> AreaBand {
        AreaBand::new(self.area_low, self.area_high)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GazetteerConfig {
    pub endpoint: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub min_interval_ms: u64,
    pub max_attempts: u32,
}

impl Default for GazetteerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            min_interval_ms: 1000,
            max_attempts: 2,
        }
    }
}

impl GazetteerConfig {
    pub fn settings(&self) -> NominatimSettings {
        NominatimSettings {
            endpoint: self.endpoint.clone(),
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            min_interval: Duration::from_millis(self.min_interval_ms),
            max_attempts: self.max_attempts,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.gazetteer.endpoint).with_context(|| {
            format!("Invalid gazetteer endpoint: {}", self.gazetteer.endpoint)
        })?;

        if let (Some(low), Some(high)) = (self.parser.area_low, self.parser.area_high) {
            if low > high {
                anyhow::bail!("area_low ({}) is greater than area_high ({})", low, high);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn load(content: &str) -> Result<Config> {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        Config::load_from_file(file.path())
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = load("").unwrap();
        assert!(config.parser.union);
        assert_eq!(config.parser.band(), AreaBand::default());
        assert_eq!(config.parser.entity_labels, vec!["LOC", "GPE"]);
        assert_eq!(config.gazetteer.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.gazetteer.settings().min_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_full_file() {
        let config = load(
            r#"
            [parser]
            area_low = 1000.0
            area_high = 50000.0
            union = false
            entity_labels = ["LOC"]
            threads = 8

            [gazetteer]
            endpoint = "http://localhost:8080"
            max_attempts = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.parser.band(), AreaBand::new(Some(1000.0), Some(50000.0)));
        assert!(!config.parser.union);
        assert_eq!(config.parser.threads, 8);
        assert_eq!(config.gazetteer.settings().max_attempts, 5);
        assert_eq!(config.gazetteer.timeout_secs, 30);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(load("[gazetteer]\nendpoint = \"not a url\"").is_err());
        assert!(load("[parser]\narea_low = 10.0\narea_high = 1.0").is_err());
        assert!(load("[parser]\nunion = \"yes\"").is_err());
    }
}
