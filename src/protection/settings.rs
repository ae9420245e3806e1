//! Operator-tunable protection policy.
//!
//! [`ProtectionSettings`] is the only state an operator can change at
//! runtime.  Two layers of validation guard it:
//!
//! - the controller's single-field setters (field-specific messages,
//!   checked against the *current* values of the other fields), and
//! - [`ProtectionSettings::validate`], the whole-struct predicate that the
//!   command processor and the settings store apply afterwards.
//!
//! The second layer catches interactions the first cannot see, e.g. a
//! new band that is narrower than the existing hysteresis.

use core::fmt;

/// Inclusive bounds for `min_samples`.
pub const MIN_SAMPLES_RANGE: core::ops::RangeInclusive<u32> = 1..=3600;
/// Inclusive bounds for the re-notification interval, in seconds.
pub const RENOTIFY_SECS_RANGE: core::ops::RangeInclusive<u32> = 10..=86_400;
/// Inclusive bounds for the re-notification interval, in milliseconds.
pub const RENOTIFY_MS_RANGE: core::ops::RangeInclusive<u32> = 10_000..=86_400_000;

/// Temperature band, hysteresis and notification policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProtectionSettings {
    /// Lower edge of the safe band (°C).  At or below → heating.
    pub min_c: f32,
    /// Upper edge of the safe band (°C).  At or above → cooling.
    pub max_c: f32,
    /// Margin inside the band before an active relay is released (°C).
    pub hysteresis_c: f32,
    /// Samples required in the window before the first actuation.
    pub min_samples: u16,
    /// Interval between "still active" notifications.
    pub renotify_interval_ms: u32,
}

impl Default for ProtectionSettings {
    fn default() -> Self {
        Self {
            min_c: 20.0,
            max_c: 30.0,
            hysteresis_c: 1.0,
            min_samples: 5,
            renotify_interval_ms: 120_000,
        }
    }
}

impl ProtectionSettings {
    /// Width of the safe band.
    pub fn span(&self) -> f32 {
        self.max_c - self.min_c
    }

    /// Centre of the safe band.
    pub fn midpoint(&self) -> f32 {
        (self.min_c + self.max_c) * 0.5
    }

    /// Whole-struct check.  Comparisons are written so that NaN fails;
    /// infinities are refused outright.
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.min_c.is_finite() && self.max_c.is_finite() && self.hysteresis_c.is_finite()) {
            return Err(SettingsError::NotFinite);
        }
        if !(self.min_c < self.max_c) {
            return Err(SettingsError::MinNotBelowMax);
        }
        if !(self.hysteresis_c > 0.0 && self.hysteresis_c < self.span()) {
            return Err(SettingsError::HysteresisOutOfRange);
        }
        if !MIN_SAMPLES_RANGE.contains(&u32::from(self.min_samples)) {
            return Err(SettingsError::MinSamplesOutOfRange);
        }
        if !RENOTIFY_MS_RANGE.contains(&self.renotify_interval_ms) {
            return Err(SettingsError::RenotifyOutOfRange);
        }
        Ok(())
    }
}

/// Boolean form of [`ProtectionSettings::validate`].
///
/// Depends only on the fields of `settings`; no hidden state.
pub fn validate_protection_settings(settings: &ProtectionSettings) -> bool {
    settings.validate().is_ok()
}

/// Why a settings value was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsError {
    /// `min` must stay strictly below `max`.
    MinNotBelowMax,
    /// `max` must stay strictly above `min`.
    MaxNotAboveMin,
    /// Hysteresis must be positive and narrower than the band.
    HysteresisOutOfRange,
    MinSamplesOutOfRange,
    RenotifyOutOfRange,
    /// A temperature field is infinite or NaN.
    NotFinite,
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MinNotBelowMax => write!(f, "min must be lower than max"),
            Self::NotFinite => write!(f, "temperatures must be finite numbers"),
            Self::MaxNotAboveMin => write!(f, "max must be higher than min"),
            Self::HysteresisOutOfRange => {
                write!(f, "hysteresis must be positive and smaller than the band width")
            }
            Self::MinSamplesOutOfRange => write!(
                f,
                "minsamples must be between {} and {}",
                MIN_SAMPLES_RANGE.start(),
                MIN_SAMPLES_RANGE.end()
            ),
            Self::RenotifyOutOfRange => write!(
                f,
                "renotify must be between {} and {} seconds",
                RENOTIFY_SECS_RANGE.start(),
                RENOTIFY_SECS_RANGE.end()
            ),
        }
    }
}
