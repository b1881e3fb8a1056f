use std::env;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Backend {
    pub base_url: String,
}

/// Intervals, in seconds, of the two recurring tasks of a monitored screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Polling {
    pub refresh_interval: u64,
    pub tick_interval: u64,
}

impl Polling {
    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs(self.refresh_interval)
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_secs(self.tick_interval)
    }

    /// Copy with every zero interval raised to one second.
    pub fn at_least_one_second(&self) -> Self {
        if self.refresh_interval == 0 || self.tick_interval == 0 {
            tracing::warn!("zero polling interval raised to one second");
        }

        Self {
            refresh_interval: self.refresh_interval.max(1),
            tick_interval: self.tick_interval.max(1),
        }
    }
}

impl Default for Polling {
    fn default() -> Self {
        Self {
            refresh_interval: 60,
            tick_interval: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub logger: Logger,
    pub backend: Backend,
    #[serde(default)]
    pub polling: Polling,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        let settings: Settings = Config::builder()
            .add_source(File::with_name("configs/default"))
            .add_source(File::with_name(&format!("configs/{run_mode}")).required(false))
            .add_source(Environment::default().separator("__"))
            .build()?
            .try_deserialize()?;

        settings.validate()
    }

    fn validate(mut self) -> Result<Self, ConfigError> {
        if self.polling.refresh_interval == 0 || self.polling.tick_interval == 0 {
            return Err(ConfigError::Message(
                "polling intervals must be at least one second".into(),
            ));
        }

        let trimmed = self.backend.base_url.trim_end_matches('/').len();
        self.backend.base_url.truncate(trimmed);

        Ok(self)
    }
}
