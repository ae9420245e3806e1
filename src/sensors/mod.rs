//! Sensor subsystem: the IR thermometer driver and the windowed
//! statistics aggregator fed from it.

pub mod aggregator;
pub mod mlx90614;

pub use aggregator::{MeasurementAggregator, MeasurementStats};
pub use mlx90614::Mlx90614;
