//! System configuration parameters
//!
//! Build-time tunables for ThermoGuard.  Operator-adjustable protection
//! settings live in [`ProtectionSettings`] and are persisted separately;
//! the values here only seed them on first boot.
//!
//! A JSON document in the `THERMOGUARD_CONFIG_JSON` environment variable
//! at build time replaces the defaults (missing fields keep theirs).

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::protection::settings::ProtectionSettings;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Protection ---
    /// Master switch.  When false the relays are never touched.
    pub protection_enabled: bool,
    /// First-boot lower bound (°C)
    pub default_min_c: f32,
    /// First-boot upper bound (°C)
    pub default_max_c: f32,
    /// First-boot hysteresis (°C)
    pub default_hysteresis_c: f32,
    /// First-boot sample gate
    pub default_min_samples: u16,
    /// First-boot reminder interval (milliseconds)
    pub default_renotify_interval_ms: u32,

    // --- Relays ---
    /// Minimum time between two relay changes (milliseconds)
    pub relay_min_switch_interval_ms: u64,
    /// Relay modules pulled low to energise
    pub relay_active_low: bool,

    // --- Timing ---
    /// Sensor read interval (milliseconds)
    pub sample_interval_ms: u64,
    /// Measurement report interval (milliseconds)
    pub report_interval_ms: u64,

    // --- Remote ---
    /// Sender ids allowed to issue commands.  Empty allows everyone.
    pub allowed_senders: Vec<String>,
    /// Broadcast once after boot.
    pub startup_message: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let p = ProtectionSettings::default();
        Self {
            protection_enabled: true,
            default_min_c: p.min_c,
            default_max_c: p.max_c,
            default_hysteresis_c: p.hysteresis_c,
            default_min_samples: p.min_samples,
            default_renotify_interval_ms: p.renotify_interval_ms,

            relay_min_switch_interval_ms: 5_000,
            relay_active_low: true,

            sample_interval_ms: 1_000,  // 1 Hz
            report_interval_ms: 10_000, // every 10 s

            allowed_senders: Vec::new(),
            startup_message: String::from("ThermoGuard started. Send 'config' for settings."),
        }
    }
}

impl SystemConfig {
    /// Parse a (possibly partial) JSON document and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build-time configuration, or defaults when none was provided.
    pub fn from_build_env() -> Result<Self, ConfigError> {
        match option_env!("THERMOGUARD_CONFIG_JSON") {
            Some(json) if !json.trim().is_empty() => Self::from_json(json),
            _ => Ok(Self::default()),
        }
    }

    /// Settings used when nothing valid is stored.
    pub fn default_protection(&self) -> ProtectionSettings {
        ProtectionSettings {
            min_c: self.default_min_c,
            max_c: self.default_max_c,
            hysteresis_c: self.default_hysteresis_c,
            min_samples: self.default_min_samples,
            renotify_interval_ms: self.default_renotify_interval_ms,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("sample_interval_ms must be > 0"));
        }
        if self.report_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("report_interval_ms must be > 0"));
        }
        if self.default_protection().validate().is_err() {
            return Err(ConfigError::ValidationFailed(
                "default protection settings are invalid",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The JSON document could not be parsed.
    Parse(String),
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "parse error: {e}"),
            Self::ValidationFailed(why) => write!(f, "invalid: {why}"),
        }
    }
}
