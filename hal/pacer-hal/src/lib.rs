//! Pacer Platform Abstraction Layer
//!
//! This crate defines the traits a host platform implements so the step
//! engine can run without knowing whether it sits in a browser, a mobile
//! runtime or a replay harness.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application shell (pacer-shell, etc.)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pacer-core (engine, lifecycle)         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pacer-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`motion::MotionStream`] - Subscribe/unsubscribe to raw motion readings
//! - [`consent::ConsentGate`] - Platform-mediated sensor permission
//! - [`clock::Clock`] - Monotonic millisecond time source

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod consent;
pub mod motion;

// Re-export key traits at crate root for convenience
pub use clock::Clock;
pub use consent::{ConsentError, ConsentGate, ConsentResponse};
pub use motion::{Axes, MotionReading, MotionStream};
