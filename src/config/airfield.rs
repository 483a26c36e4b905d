//! Airfield and scheduler configuration structures.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_REPORT_CAPACITY: usize = 1024;

const fn default_drain_incoming() -> bool {
    true
}

const fn default_report_capacity() -> usize {
    DEFAULT_REPORT_CAPACITY
}

/// Airfield configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirfieldConfig {
    /// Number of gates, numbered `1..=gate_count`.
    pub gate_count: usize,
    /// Takeoff grants after which the scheduler loop ends.
    pub total_aircraft: usize,
    /// Pause after each scheduling step, in milliseconds. Readability only.
    #[serde(default)]
    pub step_delay_ms: u64,
    /// Bounded poll while the scheduler is blocked waiting for a signal.
    #[serde(default)]
    pub idle_poll_ms: Option<u64>,
    /// Move every still-incoming request to the waiting tier after each step.
    #[serde(default = "default_drain_incoming")]
    pub drain_incoming: bool,
    /// Bound of the in-memory report buffer.
    #[serde(default = "default_report_capacity")]
    pub report_capacity: usize,
}

impl Default for AirfieldConfig {
    fn default() -> Self {
        Self {
            gate_count: 3,
            total_aircraft: 6,
            step_delay_ms: 0,
            idle_poll_ms: None,
            drain_incoming: true,
            report_capacity: DEFAULT_REPORT_CAPACITY,
        }
    }
}

impl AirfieldConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.gate_count == 0 {
            return Err("gate_count must be greater than 0".into());
        }
        if u32::try_from(self.gate_count).is_err() {
            return Err("gate_count does not fit a gate number".into());
        }
        if self.total_aircraft == 0 {
            return Err("total_aircraft must be greater than 0".into());
        }
        if self.report_capacity == 0 {
            return Err("report_capacity must be greater than 0".into());
        }
        if self.idle_poll_ms == Some(0) {
            return Err("idle_poll_ms must be greater than 0 when set".into());
        }
        Ok(())
    }

    /// Per-step pause, if any.
    #[must_use]
    pub const fn step_delay(&self) -> Option<Duration> {
        if self.step_delay_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.step_delay_ms))
        }
    }

    /// Bounded poll interval, if any.
    #[must_use]
    pub fn idle_poll(&self) -> Option<Duration> {
        self.idle_poll_ms.map(Duration::from_millis)
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from `AIRFIELD_*` environment variables.
    ///
    /// A `.env` file is loaded first when present. Unset variables keep
    /// their [`Default`] values.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();
        let mut cfg = Self::default();
        if let Some(v) = env_var("AIRFIELD_GATE_COUNT")? {
            cfg.gate_count = v;
        }
        if let Some(v) = env_var("AIRFIELD_TOTAL_AIRCRAFT")? {
            cfg.total_aircraft = v;
        }
        if let Some(v) = env_var("AIRFIELD_STEP_DELAY_MS")? {
            cfg.step_delay_ms = v;
        }
        if let Some(v) = env_var("AIRFIELD_IDLE_POLL_MS")? {
            cfg.idle_poll_ms = Some(v);
        }
        if let Some(v) = env_var("AIRFIELD_DRAIN_INCOMING")? {
            cfg.drain_incoming = v;
        }
        if let Some(v) = env_var("AIRFIELD_REPORT_CAPACITY")? {
            cfg.report_capacity = v;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn env_var<T>(key: &str) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| format!("{key}: {e}")),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(format!("{key}: {e}")),
    }
}
