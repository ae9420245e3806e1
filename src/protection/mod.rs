//! Temperature protection: policy, control law and persistence.

pub mod controller;
pub mod settings;
pub mod store;

pub use controller::{ProtectionController, ProtectionOutcome, ProtectionState};
pub use settings::{ProtectionSettings, SettingsError, validate_protection_settings};
pub use store::{SettingsStore, StoreError};
