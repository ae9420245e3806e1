//! ThermoGuard firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection.  All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

#[cfg(all(target_os = "espidf", not(feature = "espidf")))]
compile_error!("ESP-IDF builds need `--features espidf`");

pub mod app;
pub mod config;
pub mod error;
pub mod protection;
pub mod remote;
pub mod sensors;

pub mod adapters;
pub mod drivers;
pub mod pins;
