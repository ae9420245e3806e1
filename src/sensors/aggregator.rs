//! Windowed measurement statistics.
//!
//! One [`MeasurementAggregator`] per measured quantity.  Samples are
//! accumulated until the caller flushes a report and calls [`reset`];
//! the aggregator never decides on its own when a window ends.
//!
//! [`reset`]: MeasurementAggregator::reset

/// Point-in-time snapshot of an aggregation window.
///
/// When `count == 0` every float field is `0.0` and carries no meaning.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeasurementStats {
    pub min: f32,
    pub max: f32,
    pub average: f32,
    pub last: f32,
    pub count: u32,
}

impl MeasurementStats {
    /// True if the snapshot holds at least one sample.
    pub fn is_valid(&self) -> bool {
        self.count > 0
    }
}

/// Running min / max / sum / last accumulator.
#[derive(Debug, Clone, Default)]
pub struct MeasurementAggregator {
    min: f32,
    max: f32,
    sum: f32,
    last: f32,
    count: u32,
}

impl MeasurementAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero all accumulators, starting a new window.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn add_sample(&mut self, value: f32) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            if value < self.min {
                self.min = value;
            }
            if value > self.max {
                self.max = value;
            }
        }
        self.sum += value;
        self.last = value;
        self.count = self.count.saturating_add(1);
    }

    pub fn has_samples(&self) -> bool {
        self.count > 0
    }

    pub fn stats(&self) -> MeasurementStats {
        if self.count == 0 {
            return MeasurementStats::default();
        }
        MeasurementStats {
            min: self.min,
            max: self.max,
            average: self.sum / self.count as f32,
            last: self.last,
            count: self.count,
        }
    }
}
