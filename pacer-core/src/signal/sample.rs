//! Motion samples resolved from platform readings

use pacer_hal::{Axes, MotionReading};

/// Instantaneous device-frame acceleration (m/s²), possibly including gravity
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl MotionSample {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Resolve a platform reading into a sample
    ///
    /// Prefers the gravity-inclusive triple and falls back to the linear one.
    /// A triple only counts if it reports at least one axis; absent axes are
    /// read as zero. Returns `None` when there is nothing usable, including
    /// non-finite axis values.
    pub fn from_reading(reading: &MotionReading) -> Option<Self> {
        let axes = reading
            .including_gravity
            .filter(Axes::any_present)
            .or_else(|| reading.linear.filter(Axes::any_present))?;

        let sample = Self {
            x: axes.x.unwrap_or(0.0),
            y: axes.y.unwrap_or(0.0),
            z: axes.z.unwrap_or(0.0),
        };

        sample.is_finite().then_some(sample)
    }

    /// Check all components are finite numbers
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Euclidean norm of the acceleration vector
    pub fn magnitude(&self) -> f32 {
        libm::sqrtf(self.x * self.x + self.y * self.y + self.z * self.z)
    }
}
