//! Persistent protection settings.
//!
//! Settings are stored as one fixed 30-byte little-endian record:
//!
//! ```text
//!   offset  size  field
//!   ──────  ────  ─────────────────────────
//!        0     4  signature  0x5450524F
//!        4     2  version    1
//!        6     2  reserved   0
//!        8     4  min_c      f32
//!       12     4  max_c      f32
//!       16     4  hysteresis f32
//!       20     2  min_samples
//!       22     4  renotify_interval_ms
//!       26     4  checksum over bytes 0..26
//! ```
//!
//! A record is accepted only if the length, signature, version and
//! checksum all match and the decoded settings pass
//! [`ProtectionSettings::validate`].  Anything else is reported as an
//! error and the caller keeps its defaults.

use core::fmt;

use log::{info, warn};

use crate::app::ports::{StorageError, StoragePort};

use super::settings::ProtectionSettings;

pub const STORE_NAMESPACE: &str = "thermoguard";
pub const STORE_KEY: &str = "protect";

pub const RECORD_SIGNATURE: u32 = 0x5450_524F;
pub const RECORD_VERSION: u16 = 1;
pub const RECORD_LEN: usize = 30;

const CHECKSUM_OFFSET: usize = RECORD_LEN - 4;

/// Why a stored record was not loaded or a record could not be saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// Nothing stored yet.
    NotFound,
    /// Stored blob has the wrong length.
    SizeMismatch(usize),
    BadSignature,
    VersionMismatch(u16),
    ChecksumMismatch,
    /// Record decoded cleanly but the settings are not valid.
    InvalidSettings,
    /// Backend failure.
    Io(StorageError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "no stored settings"),
            Self::SizeMismatch(n) => write!(f, "record is {n} bytes, expected {RECORD_LEN}"),
            Self::BadSignature => write!(f, "bad record signature"),
            Self::VersionMismatch(v) => {
                write!(f, "record version {v}, expected {RECORD_VERSION}")
            }
            Self::ChecksumMismatch => write!(f, "record checksum mismatch"),
            Self::InvalidSettings => write!(f, "stored settings failed validation"),
            Self::Io(e) => write!(f, "storage: {e}"),
        }
    }
}

impl From<StorageError> for StoreError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound => Self::NotFound,
            other => Self::Io(other),
        }
    }
}

/// Shift-xor checksum: `sum = (sum << 1) ^ byte`, wrapping.
pub fn checksum(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .fold(0u32, |sum, &b| (sum << 1) ^ u32::from(b))
}

/// Serialise settings into a complete record, checksum included.
pub fn encode(settings: &ProtectionSettings) -> [u8; RECORD_LEN] {
    let mut out = [0u8; RECORD_LEN];
    out[0..4].copy_from_slice(&RECORD_SIGNATURE.to_le_bytes());
    out[4..6].copy_from_slice(&RECORD_VERSION.to_le_bytes());
    // 6..8 reserved, left zero
    out[8..12].copy_from_slice(&settings.min_c.to_le_bytes());
    out[12..16].copy_from_slice(&settings.max_c.to_le_bytes());
    out[16..20].copy_from_slice(&settings.hysteresis_c.to_le_bytes());
    out[20..22].copy_from_slice(&settings.min_samples.to_le_bytes());
    out[22..26].copy_from_slice(&settings.renotify_interval_ms.to_le_bytes());
    let sum = checksum(&out[..CHECKSUM_OFFSET]);
    out[CHECKSUM_OFFSET..].copy_from_slice(&sum.to_le_bytes());
    out
}

/// Parse and verify a record.  Never panics on arbitrary input.
pub fn decode(bytes: &[u8]) -> Result<ProtectionSettings, StoreError> {
    if bytes.len() != RECORD_LEN {
        return Err(StoreError::SizeMismatch(bytes.len()));
    }
    let u16_at = |o: usize| u16::from_le_bytes([bytes[o], bytes[o + 1]]);
    let u32_at =
        |o: usize| u32::from_le_bytes([bytes[o], bytes[o + 1], bytes[o + 2], bytes[o + 3]]);

    if u32_at(0) != RECORD_SIGNATURE {
        return Err(StoreError::BadSignature);
    }
    let version = u16_at(4);
    if version != RECORD_VERSION {
        return Err(StoreError::VersionMismatch(version));
    }
    if u32_at(CHECKSUM_OFFSET) != checksum(&bytes[..CHECKSUM_OFFSET]) {
        return Err(StoreError::ChecksumMismatch);
    }

    let settings = ProtectionSettings {
        min_c: f32::from_bits(u32_at(8)),
        max_c: f32::from_bits(u32_at(12)),
        hysteresis_c: f32::from_bits(u32_at(16)),
        min_samples: u16_at(20),
        renotify_interval_ms: u32_at(22),
    };
    settings
        .validate()
        .map_err(|_| StoreError::InvalidSettings)?;
    Ok(settings)
}

/// Loads and saves [`ProtectionSettings`] through a [`StoragePort`].
pub struct SettingsStore<S: StoragePort> {
    storage: S,
}

impl<S: StoragePort> SettingsStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn load(&self) -> Result<ProtectionSettings, StoreError> {
        // One spare byte so an oversized blob shows up as a size mismatch.
        let mut buf = [0u8; RECORD_LEN + 1];
        let len = self.storage.read(STORE_NAMESPACE, STORE_KEY, &mut buf)?;
        if len != RECORD_LEN {
            warn!("SettingsStore: stored record has {} bytes", len);
            return Err(StoreError::SizeMismatch(len));
        }
        let settings = decode(&buf[..RECORD_LEN]).inspect_err(|e| {
            warn!("SettingsStore: rejecting stored record: {}", e);
        })?;
        info!("SettingsStore: loaded settings from storage");
        Ok(settings)
    }

    /// Persist `settings`.  Invalid settings are refused without writing.
    pub fn save(&mut self, settings: &ProtectionSettings) -> Result<(), StoreError> {
        if settings.validate().is_err() {
            return Err(StoreError::InvalidSettings);
        }
        let record = encode(settings);
        self.storage
            .write(STORE_NAMESPACE, STORE_KEY, &record)
            .map_err(|e| {
                warn!("SettingsStore: write failed: {}", e);
                StoreError::Io(e)
            })
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }
}
