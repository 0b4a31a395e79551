use std::{path::PathBuf, time::Duration};

use ais_core::{Grouping, Palette};
use config::{Config, File};
use serde::Deserialize;
use snafu::ResultExt;
use strum::{AsRefStr, EnumString};

use crate::{
    MergePolicy, ThresholdClassifier,
    error::{
        Result,
        error::{ConfigSnafu, EnvironmentSnafu},
    },
};

pub const DEFAULT_BACKLOG_CAPACITY: usize = 10;
pub const DEFAULT_MAX_FRAME_LENGTH: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, AsRefStr, EnumString)]
pub enum Environment {
    Local,
    Development,
    Production,
    Test,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<&LogLevel> for tracing::Level {
    fn from(value: &LogLevel) -> Self {
        match value {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    pub environment: Environment,
    pub log_level: LogLevel,
    #[serde(with = "humantime_serde")]
    pub commit_interval: Duration,
    #[serde(default)]
    pub show_anomalies: bool,
    pub stream: StreamSettings,
    pub playback: PlaybackSettings,
    #[serde(default)]
    pub classifier: ThresholdClassifier,
}

#[derive(Deserialize, Debug, Clone)]
pub struct StreamSettings {
    /// Websocket address of the live feed, frames are read from stdin when absent.
    pub url: Option<String>,
    #[serde(default = "default_backlog_capacity")]
    pub backlog_capacity: usize,
    #[serde(default = "default_max_frame_length")]
    pub max_frame_length: usize,
    #[serde(default)]
    pub merge_policy: MergePolicy,
}

#[derive(Deserialize, Debug, Clone)]
pub struct PlaybackSettings {
    #[serde(with = "humantime_serde")]
    pub tick_interval: Duration,
    #[serde(default)]
    pub autostart: bool,
    #[serde(default)]
    pub grouping: Grouping,
    #[serde(default)]
    pub palette: Palette,
    #[serde(default)]
    pub sources: Vec<PathBuf>,
}

fn default_backlog_capacity() -> usize {
    DEFAULT_BACKLOG_CAPACITY
}

fn default_max_frame_length() -> usize {
    DEFAULT_MAX_FRAME_LENGTH
}

impl Settings {
    /// Reads `config/<environment>.yml`, where the environment is taken from
    /// `APP_ENVIRONMENT`. Values can be overridden with `AIS_CONSUMER__` prefixed variables.
    pub fn new() -> Result<Settings> {
        let value = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "Local".into());
        let environment: Environment = match value.parse() {
            Ok(v) => v,
            Err(_) => return EnvironmentSnafu { value }.fail(),
        };

        Config::builder()
            .add_source(
                File::with_name(&format!("config/{}", environment.as_ref().to_lowercase()))
                    .required(true),
            )
            .add_source(config::Environment::with_prefix("AIS_CONSUMER").separator("__"))
            .set_override("environment", environment.as_ref())
            .context(ConfigSnafu)?
            .build()
            .context(ConfigSnafu)?
            .try_deserialize()
            .context(ConfigSnafu)
    }
}

#[cfg(feature = "test")]
mod test {
    use super::*;

    impl Settings {
        pub fn test_default() -> Settings {
            Settings {
                environment: Environment::Test,
                log_level: LogLevel::Debug,
                commit_interval: Duration::from_millis(5),
                show_anomalies: true,
                stream: StreamSettings {
                    url: None,
                    backlog_capacity: DEFAULT_BACKLOG_CAPACITY,
                    max_frame_length: DEFAULT_MAX_FRAME_LENGTH,
                    merge_policy: MergePolicy::LastReceived,
                },
                playback: PlaybackSettings {
                    tick_interval: Duration::from_millis(100),
                    autostart: false,
                    grouping: Grouping::BySource,
                    palette: Palette::default(),
                    sources: vec![],
                },
                classifier: ThresholdClassifier::default(),
            }
        }
    }
}
