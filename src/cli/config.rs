// ABOUTME: Configuration management for the muster application
// ABOUTME: Handles loading and merging configuration from files and environment variables

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Shell used by the command worker for script-mode tasks.
    #[serde(default = "default_shell")]
    pub shell: String,

    /// How often the scheduler polls the job status while paused.
    #[serde(with = "humantime_serde", default = "default_poll_interval")]
    pub poll_interval: Duration,

    /// Ask for confirmation before every dispatch, even without --confirm.
    #[serde(default)]
    pub confirm_tasks: bool,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

fn default_shell() -> String {
    "/bin/sh".to_string()
}

fn default_poll_interval() -> Duration {
    Duration::from_millis(100)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shell: default_shell(),
            poll_interval: default_poll_interval(),
            confirm_tasks: false,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file path or default locations
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => Self::find_config_file(),
        };

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let mut config: Config = serde_yaml::from_str(&contents)?;
            config.merge_env();
            Ok(config)
        } else {
            let mut config = Config::default();
            config.merge_env();
            Ok(config)
        }
    }

    fn find_config_file() -> PathBuf {
        let candidates = [
            PathBuf::from("muster.yaml"),
            PathBuf::from("muster.yml"),
            dirs_config_path(),
        ];

        candidates
            .iter()
            .find(|p| p.exists())
            .cloned()
            .unwrap_or_else(|| PathBuf::from("muster.yaml"))
    }

    fn merge_env(&mut self) {
        if let Ok(level) = std::env::var("MUSTER_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(shell) = std::env::var("MUSTER_SHELL") {
            self.shell = shell;
        }
    }
}

fn dirs_config_path() -> PathBuf {
    match std::env::var("HOME") {
        Ok(home) => PathBuf::from(home).join(".config").join("muster.yaml"),
        Err(_) => PathBuf::from("muster.yaml"),
    }
}
