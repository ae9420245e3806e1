//! Application core: pure domain orchestration, zero I/O.
//!
//! Owns the control loop ([`service::ThermalService`]), the operator
//! command grammar and the outbound notifications.  All interaction with
//! hardware happens through **port traits** defined in [`ports`], keeping
//! this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
