//! Signal filter and step counter
//!
//! Turns raw acceleration into a smoothed magnitude baseline and debounced
//! step events. Nothing here can fail: bad readings are dropped.

pub mod detector;
pub mod filter;
pub mod sample;

pub use detector::{StepCounter, StepDetector, StepOutcome};
pub use filter::FilterState;
pub use sample::MotionSample;
