use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub space: SpaceConfig,
    #[serde(default)]
    pub sweeper: SweeperConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Ticket space configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpaceConfig {
    /// Directory holding the ticketed files (created if absent).
    #[serde(default = "default_space_path")]
    pub path: PathBuf,
    /// Entry TTL in seconds. Unset means 12 hours; values under an hour
    /// are raised to one hour when sweeping.
    #[serde(default)]
    pub ttl_secs: Option<u64>,
    /// Embed a sequence number in generated tickets. The expiration loop
    /// only runs when this is on.
    #[serde(default)]
    pub sequencing: bool,
}

impl SpaceConfig {
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }
}

impl Default for SpaceConfig {
    fn default() -> Self {
        Self {
            path: default_space_path(),
            ttl_secs: None,
            sequencing: false,
        }
    }
}

fn default_space_path() -> PathBuf {
    PathBuf::from("/tmp/tickets")
}

/// Background expiration configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SweeperConfig {
    /// Seconds between sweeps.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl SweeperConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

fn default_interval_secs() -> u64 {
    3600 // 1 hour
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
    /// Filter directive used when `RUST_LOG` is not set.
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: default_filter(),
        }
    }
}

fn default_filter() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}
