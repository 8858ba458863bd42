//! Permission and tracking lifecycle
//!
//! Governs when the motion stream is subscribed and how the consent gate is
//! negotiated.

pub mod error;
pub mod tracker;

pub use error::TrackerError;
pub use tracker::{Action, Lifecycle, RequestTicket, Trigger};
