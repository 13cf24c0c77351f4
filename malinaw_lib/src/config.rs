//! Run configuration: defaults, then an optional TOML file, then environment.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::fetch::BrowserOptions;
use crate::record::{RecordDefaults, DEFAULT_CONGRESS};

const DEFAULT_SITE_URL: &str = "https://www.congress.gov.ph";
const DEFAULT_LISTING_URL: &str = "https://www.congress.gov.ph/legisdocs/?v=bills";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value for {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStrategy {
    #[default]
    Http,
    Browser,
}

impl FromStr for FetchStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(FetchStrategy::Http),
            "browser" => Ok(FetchStrategy::Browser),
            other => Err(format!("unknown fetch strategy: {}", other)),
        }
    }
}

impl fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchStrategy::Http => f.write_str("http"),
            FetchStrategy::Browser => f.write_str("browser"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    pub strategy: FetchStrategy,
    /// Site hosting the modal endpoint.
    pub site_url: String,
    pub listing_url: String,
    /// DevTools websocket of a running browser; a headless one is launched
    /// when unset.
    pub browser_ws: Option<String>,
    pub open_retries: u32,
    pub close_retries: u32,
    pub modal_timeout_ms: u64,
    /// Fewest rows accepted from one modal. Defaults per strategy.
    pub min_rows: Option<usize>,
    pub request_timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            strategy: FetchStrategy::Http,
            site_url: DEFAULT_SITE_URL.to_string(),
            listing_url: DEFAULT_LISTING_URL.to_string(),
            browser_ws: None,
            open_retries: 6,
            close_retries: 6,
            modal_timeout_ms: 5000,
            min_rows: None,
            request_timeout_secs: 30,
        }
    }
}

impl FetchConfig {
    pub fn min_rows(&self) -> usize {
        self.min_rows.unwrap_or(match self.strategy {
            FetchStrategy::Http => 1,
            FetchStrategy::Browser => 7,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub fetch: FetchConfig,
    /// Write the checkpoint after this many successes.
    pub checkpoint_every: usize,
    /// Pause between items, in milliseconds.
    pub request_delay_ms: u64,
    pub congress: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            checkpoint_every: 5,
            request_delay_ms: 0,
            congress: DEFAULT_CONGRESS,
        }
    }
}

impl PipelineConfig {
    /// Defaults, overlaid with `path` when given, overlaid with `MALINAW_*`
    /// environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_with(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("MALINAW_SITE_URL") {
            self.fetch.site_url = url;
        }
        if let Some(url) = lookup("MALINAW_LISTING_URL") {
            self.fetch.listing_url = url;
        }
        if let Some(ws) = lookup("MALINAW_BROWSER_WS") {
            self.fetch.browser_ws = Some(ws);
        }
        if let Some(n) = env_parse(&lookup, "MALINAW_CHECKPOINT_EVERY")? {
            self.checkpoint_every = n;
        }
        if let Some(n) = env_parse(&lookup, "MALINAW_OPEN_RETRIES")? {
            self.fetch.open_retries = n;
        }
        if let Some(n) = env_parse(&lookup, "MALINAW_CLOSE_RETRIES")? {
            self.fetch.close_retries = n;
        }
        if let Some(ms) = env_parse(&lookup, "MALINAW_MODAL_TIMEOUT_MS")? {
            self.fetch.modal_timeout_ms = ms;
        }
        if let Some(n) = env_parse(&lookup, "MALINAW_MIN_ROWS")? {
            self.fetch.min_rows = Some(n);
        }
        if let Some(ms) = env_parse(&lookup, "MALINAW_REQUEST_DELAY_MS")? {
            self.request_delay_ms = ms;
        }
        if let Some(n) = env_parse(&lookup, "MALINAW_CONGRESS")? {
            self.congress = n;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.checkpoint_every == 0 {
            return Err(ConfigError::Invalid(
                "checkpoint_every must be at least 1".to_string(),
            ));
        }
        if self.fetch.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn browser_options(&self) -> BrowserOptions {
        BrowserOptions {
            ws_url: self.fetch.browser_ws.clone(),
            listing_url: self.fetch.listing_url.clone(),
            open_retries: self.fetch.open_retries,
            close_retries: self.fetch.close_retries,
            modal_timeout: Duration::from_millis(self.fetch.modal_timeout_ms),
            min_rows: self.fetch.min_rows(),
        }
    }

    pub fn record_defaults(&self) -> RecordDefaults {
        RecordDefaults::for_congress(self.congress)
    }
}

fn env_parse<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { key, value }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.checkpoint_every, 5);
        assert_eq!(config.request_delay_ms, 0);
        assert_eq!(config.congress, 19);
        assert_eq!(config.fetch.strategy, FetchStrategy::Http);
        assert_eq!(config.fetch.min_rows(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn browser_strategy_defaults_to_seven_rows() {
        let config: PipelineConfig = toml::from_str("[fetch]\nstrategy = \"browser\"\n").unwrap();
        let options = config.browser_options();
        assert_eq!(options.min_rows, 7);
        assert_eq!(options.modal_timeout, Duration::from_secs(5));
    }

    #[test]
    fn toml_overrides_defaults() {
        let config: PipelineConfig = toml::from_str(
            r#"
            checkpoint_every = 10
            request_delay_ms = 250

            [fetch]
            site_url = "http://localhost:8080"
            min_rows = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.checkpoint_every, 10);
        assert_eq!(config.request_delay(), Duration::from_millis(250));
        assert_eq!(config.fetch.site_url, "http://localhost:8080");
        assert_eq!(config.fetch.min_rows(), 3);
        assert_eq!(config.fetch.open_retries, 6);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let result: Result<PipelineConfig, _> = toml::from_str("checkpoint_evry = 2\n");
        assert!(result.is_err());
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = PipelineConfig::default();
        config
            .apply_env_with(env(&[
                ("MALINAW_CHECKPOINT_EVERY", "2"),
                ("MALINAW_BROWSER_WS", "ws://127.0.0.1:9222/devtools/browser/abc"),
                ("MALINAW_OPEN_RETRIES", "3"),
                ("MALINAW_CONGRESS", "18"),
            ]))
            .unwrap();
        assert_eq!(config.checkpoint_every, 2);
        assert_eq!(config.fetch.open_retries, 3);
        assert_eq!(config.congress, 18);
        assert!(config.record_defaults().pdf_base_url.ends_with("basic_18"));
        assert_eq!(
            config.browser_options().ws_url.as_deref(),
            Some("ws://127.0.0.1:9222/devtools/browser/abc")
        );
    }

    #[test]
    fn malformed_env_value_names_the_key() {
        let mut config = PipelineConfig::default();
        let err = config
            .apply_env_with(env(&[("MALINAW_MIN_ROWS", "seven")]))
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid value for MALINAW_MIN_ROWS: \"seven\"");
    }

    #[test]
    fn zero_checkpoint_interval_is_invalid() {
        let config = PipelineConfig {
            checkpoint_every: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("malinaw.toml");
        fs::write(&path, "congress = 20\n").unwrap();
        assert_eq!(PipelineConfig::from_file(&path).unwrap().congress, 20);
    }

    #[test]
    fn strategy_parses_case_insensitively() {
        assert_eq!("Browser".parse::<FetchStrategy>(), Ok(FetchStrategy::Browser));
        assert!("curl".parse::<FetchStrategy>().is_err());
    }
}
