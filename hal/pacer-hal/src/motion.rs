//! Raw motion readings and the platform motion stream

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One acceleration triple as reported by the platform (m/s²)
///
/// Platforms are allowed to omit individual axes, so each one is optional.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Axes {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub z: Option<f32>,
}

impl Axes {
    /// Create a triple with all three axes present
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            z: Some(z),
        }
    }

    /// Check if at least one axis was reported
    pub fn any_present(&self) -> bool {
        self.x.is_some() || self.y.is_some() || self.z.is_some()
    }
}

/// A single motion event delivered by the platform
///
/// Most platforms report both a gravity-inclusive and a gravity-exclusive
/// reading; either may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotionReading {
    /// Acceleration including gravity
    pub including_gravity: Option<Axes>,
    /// Linear acceleration with gravity removed
    pub linear: Option<Axes>,
}

impl MotionReading {
    /// Reading with only the gravity-inclusive triple
    pub const fn including_gravity(axes: Axes) -> Self {
        Self {
            including_gravity: Some(axes),
            linear: None,
        }
    }

    /// Reading with only the gravity-exclusive triple
    pub const fn linear(axes: Axes) -> Self {
        Self {
            including_gravity: None,
            linear: Some(axes),
        }
    }

    /// Reading that carries no acceleration data at all
    pub const fn empty() -> Self {
        Self {
            including_gravity: None,
            linear: None,
        }
    }
}

/// Trait for the platform's raw motion stream
///
/// Readings are pushed to the engine by the platform while subscribed.
/// The engine guarantees it holds at most one subscription at a time, so
/// implementations do not need to reference-count.
pub trait MotionStream {
    /// Start delivering readings
    fn subscribe(&mut self);

    /// Stop delivering readings
    fn unsubscribe(&mut self);

    /// Check if readings are currently being delivered
    fn is_subscribed(&self) -> bool;
}
