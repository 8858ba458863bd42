//! Configuration type definitions
//!
//! Every tunable of the engine lives here. The defaults reproduce the
//! behaviour of a one-step-per-footfall counter with a 100 step goal; a
//! faster "demo" variant only needs a different increment and goal.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Standard gravity in m/s²
pub const STANDARD_GRAVITY: f32 = 9.81;

/// Default smoothing factor (weight kept from the previous estimate)
pub const DEFAULT_SMOOTHING_ALPHA: f32 = 0.8;

/// Default deviation threshold in m/s²
pub const DEFAULT_STEP_THRESHOLD: f32 = 1.1;

/// Default refractory interval between accepted steps
pub const DEFAULT_REFRACTORY_MS: u32 = 400;

/// Default magnitude clamp (16 g, a common accelerometer full scale)
pub const DEFAULT_MAX_MAGNITUDE: f32 = 16.0 * STANDARD_GRAVITY;

/// Default goal in counter units
pub const DEFAULT_GOAL_STEPS: u32 = 100;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Smoothing factor outside [0, 1)
    InvalidSmoothing,
    /// Threshold, gravity or magnitude clamp not a positive finite number
    InvalidThreshold,
    /// Refractory interval of zero
    InvalidRefractory,
    /// Per-step increment of zero
    InvalidIncrement,
    /// Goal of zero
    InvalidGoal,
    /// Stored config did not fit in the buffer
    Encode,
    /// Stored config bytes could not be decoded
    Decode,
    /// Stored config magic number mismatch
    BadMagic,
    /// Stored config written by a different format version
    VersionMismatch,
    /// Stored config checksum mismatch
    Checksum,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            ConfigError::InvalidSmoothing => "smoothing_alpha must be in [0, 1)",
            ConfigError::InvalidThreshold => {
                "gravity, step_threshold and max_magnitude must be positive"
            }
            ConfigError::InvalidRefractory => "refractory_ms must be greater than zero",
            ConfigError::InvalidIncrement => "step_increment must be greater than zero",
            ConfigError::InvalidGoal => "goal_steps must be greater than zero",
            ConfigError::Encode => "stored config does not fit in buffer",
            ConfigError::Decode => "stored config is malformed",
            ConfigError::BadMagic => "stored config has wrong magic number",
            ConfigError::VersionMismatch => "stored config version mismatch",
            ConfigError::Checksum => "stored config checksum mismatch",
        };
        f.write_str(msg)
    }
}

/// Signal filter and step detection tuning
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DetectorConfig {
    /// Baseline the filter is seeded with on every start (m/s²)
    pub gravity: f32,
    /// Weight retained from the previous filtered estimate
    ///
    /// Higher values adapt slower: smoother baseline, fewer false steps,
    /// more latency.
    pub smoothing_alpha: f32,
    /// Deviation from the baseline that counts as a step (m/s²)
    pub step_threshold: f32,
    /// Minimum time between two accepted steps
    pub refractory_ms: u32,
    /// Magnitudes above this are clamped before filtering (m/s²)
    pub max_magnitude: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            gravity: STANDARD_GRAVITY,
            smoothing_alpha: DEFAULT_SMOOTHING_ALPHA,
            step_threshold: DEFAULT_STEP_THRESHOLD,
            refractory_ms: DEFAULT_REFRACTORY_MS,
            max_magnitude: DEFAULT_MAX_MAGNITUDE,
        }
    }
}

/// Step counter policy
///
/// The increment is a presentation choice, not part of detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CounterConfig {
    /// Amount added per detected step
    pub step_increment: u32,
    /// Value the counter is reset to whenever tracking starts
    pub start_value: u32,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            step_increment: 1,
            start_value: 0,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    pub detector: DetectorConfig,
    pub counter: CounterConfig,
    /// Goal in counter units, used for progress and category
    pub goal_steps: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            detector: DetectorConfig::default(),
            counter: CounterConfig::default(),
            goal_steps: DEFAULT_GOAL_STEPS,
        }
    }
}

impl EngineConfig {
    /// Check every field is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.detector;

        if !(0.0..1.0).contains(&d.smoothing_alpha) {
            return Err(ConfigError::InvalidSmoothing);
        }

        for value in [d.gravity, d.step_threshold, d.max_magnitude] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidThreshold);
            }
        }

        if d.refractory_ms == 0 {
            return Err(ConfigError::InvalidRefractory);
        }

        if self.counter.step_increment == 0 {
            return Err(ConfigError::InvalidIncrement);
        }

        if self.goal_steps == 0 {
            return Err(ConfigError::InvalidGoal);
        }

        Ok(())
    }
}

/// Platform capabilities, resolved once by the shell at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Capabilities {
    /// The platform can deliver motion readings at all
    pub has_motion_api: bool,
    /// The platform requires an explicit consent request first
    pub has_consent_gate: bool,
}

impl Capabilities {
    /// Motion available behind a consent prompt
    pub const fn gated() -> Self {
        Self {
            has_motion_api: true,
            has_consent_gate: true,
        }
    }

    /// Motion available without any prompt
    pub const fn ungated() -> Self {
        Self {
            has_motion_api: true,
            has_consent_gate: false,
        }
    }

    /// No motion sensor API in this context
    pub const fn unsupported() -> Self {
        Self {
            has_motion_api: false,
            has_consent_gate: false,
        }
    }
}
