//! Step detection and counting
//!
//! A step is a deviation of the instantaneous magnitude from the smoothed
//! baseline that exceeds the threshold, outside the refractory window of
//! the previous step. The baseline is updated on every usable sample,
//! step or not, so slow drift such as device reorientation is tracked.

use pacer_hal::MotionReading;

use super::filter::FilterState;
use super::sample::MotionSample;
use crate::config::{CounterConfig, DetectorConfig};

/// Result of processing one sample
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepOutcome {
    /// A step was accepted on this sample
    pub step_detected: bool,
    /// Clamped magnitude of the sample (m/s²)
    pub magnitude: f32,
    /// Deviation from the updated baseline (m/s²)
    pub delta: f32,
}

/// Step detector using a low-pass magnitude baseline and a refractory window
#[derive(Debug, Clone)]
pub struct StepDetector {
    config: DetectorConfig,
    state: FilterState,
}

impl StepDetector {
    /// Create a new detector seeded with the configured gravity
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            state: FilterState::seeded(config.gravity),
        }
    }

    /// Get the detector configuration
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Get the current filter state
    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// Re-seed the filter (call whenever tracking starts)
    pub fn reset(&mut self) {
        self.state.reset(self.config.gravity);
    }

    /// Process one sample stamped with `now_ms`
    ///
    /// Samples with non-finite components are ignored without touching the
    /// filter.
    pub fn process(&mut self, sample: &MotionSample, now_ms: u64) -> StepOutcome {
        if !sample.is_finite() {
            return StepOutcome {
                step_detected: false,
                magnitude: 0.0,
                delta: 0.0,
            };
        }

        let magnitude = sample.magnitude().min(self.config.max_magnitude);
        let filtered = self.state.update(magnitude, self.config.smoothing_alpha);
        let delta = libm::fabsf(magnitude - filtered);

        let step_detected = delta > self.config.step_threshold
            && self
                .state
                .refractory_elapsed(now_ms, self.config.refractory_ms);

        if step_detected {
            self.state.last_step_at = Some(now_ms);
        }

        StepOutcome {
            step_detected,
            magnitude,
            delta,
        }
    }

    /// Resolve and process a platform reading
    ///
    /// Returns `None` if the reading carried no usable acceleration; the
    /// filter is left untouched in that case.
    pub fn process_reading(&mut self, reading: &MotionReading, now_ms: u64) -> Option<StepOutcome> {
        let sample = MotionSample::from_reading(reading)?;
        Some(self.process(&sample, now_ms))
    }
}

/// Externally visible step counter
///
/// Monotonically non-decreasing between resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepCounter {
    count: u32,
    config: CounterConfig,
}

impl StepCounter {
    /// Create a counter at its start value
    pub fn new(config: CounterConfig) -> Self {
        Self {
            count: config.start_value,
            config,
        }
    }

    /// Current count
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Add one step's worth of increment, returns the new count
    pub fn record_step(&mut self) -> u32 {
        self.count = self.count.saturating_add(self.config.step_increment);
        self.count
    }

    /// Return to the configured start value
    pub fn reset(&mut self) {
        self.count = self.config.start_value;
    }
}
