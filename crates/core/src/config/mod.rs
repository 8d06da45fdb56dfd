use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::Result;

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub render: RenderTiming,
    pub generate: GenerateSettings,
}

impl AppConfig {
    /// Reads a JSON configuration file. Missing sections fall back to their
    /// defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str(&raw)?;
        tracing::debug!(path = %path.as_ref().display(), "loaded application config");
        Ok(config)
    }
}

/// Pacing of the simulated render log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderTiming {
    /// Gap between consecutive log lines.
    pub log_interval_ms: u64,
    /// Delay between the last log line and the results.
    pub settle_ms: u64,
}

impl RenderTiming {
    pub fn log_interval(&self) -> Duration {
        Duration::from_millis(self.log_interval_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

impl Default for RenderTiming {
    fn default() -> Self {
        Self {
            log_interval_ms: 800,
            settle_ms: 800,
        }
    }
}

/// Configuration specific to the generate action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateSettings {
    /// How long the generate button stays busy after a trigger.
    pub busy_ms: u64,
    pub seed: Option<u64>,
}

impl GenerateSettings {
    pub fn busy_window(&self) -> Duration {
        Duration::from_millis(self.busy_ms)
    }
}

impl Default for GenerateSettings {
    fn default() -> Self {
        Self {
            busy_ms: 2_000,
            seed: None,
        }
    }
}
