//! Client configuration read from `secq.ron`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use secq_core::{PollPolicy, Settings, DEFAULT_DEBOUNCE, DEFAULT_POLL_INTERVAL};
use secq_engine::{BackendSettings, DEFAULT_BASE_URL};
use secq_logging::{LevelFilter, LogDestination};
use serde::Deserialize;

pub const CONFIG_FILENAME: &str = "secq.ron";
pub const BASE_URL_ENV: &str = "SECQ_BASE_URL";
const DEFAULT_STORE_DIR: &str = ".secq";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    /// Directory holding the persisted results.
    pub store_dir: PathBuf,
    pub debounce_ms: u64,
    pub poll: PollConfig,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub log_destination: LogDestination,
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub interval_secs: u64,
    pub backoff_multiplier: u32,
    pub max_interval_secs: u64,
    /// Pending answers tolerated before giving up; unset polls forever.
    pub max_attempts: Option<u32>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let backend = BackendSettings::default();
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
            poll: PollConfig::default(),
            connect_timeout_secs: backend.connect_timeout.as_secs(),
            request_timeout_secs: backend.request_timeout.as_secs(),
            log_destination: LogDestination::File,
            log_level: "info".to_string(),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
            backoff_multiplier: 1,
            max_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
            max_attempts: None,
        }
    }
}

impl ClientConfig {
    /// Reads `explicit`, or `./secq.ron` when it exists, or falls back to defaults.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(CONFIG_FILENAME);
                if path.is_file() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_ron(&text).with_context(|| format!("in config file {}", path.display()))
    }

    pub fn from_ron(text: &str) -> anyhow::Result<Self> {
        let config: Self = ron::from_str(text).context("parsing client config")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.poll.interval_secs == 0 {
            bail!("poll.interval_secs must be at least 1");
        }
        Ok(())
    }

    /// Applies the environment value first, then the command line flag.
    pub fn override_base_url(&mut self, from_env: Option<String>, from_flag: Option<String>) {
        if let Some(url) = from_env.into_iter().chain(from_flag).last() {
            self.base_url = url;
        }
    }

    pub fn level_filter(&self) -> anyhow::Result<LevelFilter> {
        self.log_level
            .parse::<LevelFilter>()
            .map_err(|_| anyhow!("unknown log level {:?}", self.log_level))
    }

    pub fn settings(&self) -> Settings {
        Settings {
            debounce: Duration::from_millis(self.debounce_ms),
            poll: PollPolicy {
                interval: Duration::from_secs(self.poll.interval_secs),
                backoff_multiplier: self.poll.backoff_multiplier,
                max_interval: Duration::from_secs(self.poll.max_interval_secs),
                max_attempts: self.poll.max_attempts,
            },
        }
    }

    pub fn backend_settings(&self) -> BackendSettings {
        BackendSettings {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_match_core_settings() {
        let config = ClientConfig::default();
        assert_eq!(config.settings(), Settings::default());
        assert_eq!(config.backend_settings().base_url, DEFAULT_BASE_URL);
        assert_eq!(config.level_filter().unwrap(), LevelFilter::Info);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let config = ClientConfig::from_ron(
            r#"(
                base_url: "http://analysis.local:9000/",
                poll: (max_attempts: Some(30), backoff_multiplier: 2, max_interval_secs: 60),
                log_destination: Both,
            )"#,
        )
        .unwrap();

        assert_eq!(config.base_url, "http://analysis.local:9000/");
        assert_eq!(config.log_destination, LogDestination::Both);
        assert_eq!(config.store_dir, PathBuf::from(".secq"));

        let policy = config.settings().poll;
        assert_eq!(policy.max_attempts, Some(30));
        assert_eq!(policy.delay_for(0), Duration::from_secs(10));
        assert_eq!(policy.delay_for(1), Duration::from_secs(20));
        assert_eq!(policy.delay_for(5), Duration::from_secs(60));
    }

    #[test]
    fn flag_wins_over_environment() {
        let mut config = ClientConfig::default();
        config.override_base_url(Some("http://from-env/".into()), None);
        assert_eq!(config.base_url, "http://from-env/");

        config.override_base_url(Some("http://from-env/".into()), Some("http://flag/".into()));
        assert_eq!(config.base_url, "http://flag/");
    }

    #[test]
    fn reads_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "(debounce_ms: 50, log_level: \"debug\")").unwrap();

        let config = ClientConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.settings().debounce, Duration::from_millis(50));
        assert_eq!(config.level_filter().unwrap(), LevelFilter::Debug);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(ClientConfig::from_ron("(debounce_ms: \"soon\")").is_err());
        assert!(ClientConfig::load(Some(Path::new("/nonexistent/secq.ron"))).is_err());

        let config = ClientConfig {
            log_level: "chatty".into(),
            ..ClientConfig::default()
        };
        assert!(config.level_filter().is_err());
    }

    #[test]
    fn rejects_zero_poll_interval() {
        let err = ClientConfig::from_ron("(poll: (interval_secs: 0))").unwrap_err();
        assert!(err.to_string().contains("interval_secs"));

        let config = ClientConfig::from_ron("(poll: (interval_secs: 1))").unwrap();
        assert_eq!(config.settings().poll.delay_for(0), Duration::from_secs(1));
    }
}
