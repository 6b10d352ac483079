//! # Client Configuration Module
//!
//! Tunables for the client, loadable from a JSON file. Every field has a
//! default so a partial file (or no file) is fine.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Where the analysis engine publishes its stream.
pub const DEFAULT_ENDPOINT: &str = "ws://127.0.0.1:1234";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Websocket URL of the analysis engine.
    pub endpoint: String,
    /// How long a beat keeps the indicator lit.
    pub beat_pulse_ms: u64,
    /// Redraw tick interval.
    pub redraw_interval_ms: u64,
    /// Number of inferences shown in the chart.
    pub inference_window: usize,
    /// Timeline scroll speed.
    pub timeline_px_per_ms: f32,
    pub reconnect: ReconnectPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            beat_pulse_ms: 100,
            redraw_interval_ms: 10,
            inference_window: 10,
            timeline_px_per_ms: 0.1,
            reconnect: ReconnectPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Loads a configuration from a JSON file.
    ///
    /// # Arguments
    /// * `path` - File path of the configuration (e.g., "chordscope.json")
    ///
    /// # Returns
    /// * `Ok(ClientConfig)` - Parsed configuration, missing fields defaulted
    /// * `Err(e)` - File I/O error or JSON error
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path)
            .with_context(|| format!("failed to open config {}", path.display()))?;
        let mut data = String::new();
        file.read_to_string(&mut data)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_json(&data).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Parses a configuration and checks its intervals.
    pub fn from_json(data: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(data)?;
        if config.redraw_interval_ms == 0 {
            bail!("redraw_interval_ms must be at least 1");
        }
        Ok(config)
    }

    pub fn beat_pulse(&self) -> Duration {
        Duration::from_millis(self.beat_pulse_ms)
    }

    pub fn redraw_interval(&self) -> Duration {
        Duration::from_millis(self.redraw_interval_ms.max(1))
    }
}

/// Reconnect-with-backoff settings for the connection worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectPolicy {
    pub enabled: bool,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    /// `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_delay_ms: 250,
            max_delay_ms: 5_000,
            max_attempts: None,
        }
    }
}

impl ReconnectPolicy {
    /// A policy that treats the first connection loss as final.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (zero-based), or `None` when the
    /// worker should give up.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if !self.enabled || self.max_attempts.is_some_and(|max| attempt >= max) {
            return None;
        }
        let factor = 1u64.checked_shl(attempt.min(32)).unwrap_or(u64::MAX);
        let delay = self
            .initial_delay_ms
            .saturating_mul(factor)
            .min(self.max_delay_ms);
        Some(Duration::from_millis(delay))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ClientConfig::from_json(r#"{"endpoint":"ws://10.0.0.2:9000"}"#).unwrap();
        assert_eq!(config.endpoint, "ws://10.0.0.2:9000");
        assert_eq!(config.beat_pulse(), Duration::from_millis(100));
        assert_eq!(config.inference_window, 10);
        assert!(config.reconnect.enabled);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(ClientConfig::from_json("{endpoint").is_err());
        assert!(ClientConfig::load("/definitely/not/here.json").is_err());
    }

    #[test]
    fn rejects_zero_redraw_interval() {
        let err = ClientConfig::from_json(r#"{"redraw_interval_ms":0}"#).unwrap_err();
        assert!(err.to_string().contains("redraw_interval_ms"));

        let built = ClientConfig {
            redraw_interval_ms: 0,
            ..ClientConfig::default()
        };
        assert_eq!(built.redraw_interval(), Duration::from_millis(1));
    }

    #[test]
    fn backoff_doubles_up_to_cap() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.delay_for(0), Some(Duration::from_millis(250)));
        assert_eq!(policy.delay_for(1), Some(Duration::from_millis(500)));
        assert_eq!(policy.delay_for(3), Some(Duration::from_millis(2_000)));
        assert_eq!(policy.delay_for(5), Some(Duration::from_millis(5_000)));
        assert_eq!(policy.delay_for(40), Some(Duration::from_millis(5_000)));
    }

    #[test]
    fn backoff_respects_limits() {
        let limited = ReconnectPolicy {
            max_attempts: Some(2),
            ..ReconnectPolicy::default()
        };
        assert!(limited.delay_for(1).is_some());
        assert_eq!(limited.delay_for(2), None);
        assert_eq!(ReconnectPolicy::disabled().delay_for(0), None);
    }
}
