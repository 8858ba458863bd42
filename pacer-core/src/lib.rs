//! Board-agnostic core logic for the Pacer step engine
//!
//! This crate contains all logic that does not depend on a specific
//! platform:
//!
//! - Engine configuration and its persisted form
//! - Signal filter and step detector (low-pass magnitude, refractory debounce)
//! - Permission state machine for the platform consent gate
//! - Tracking lifecycle converging auto-start, gesture and manual triggers
//! - Goal progress and the step-derived activity category
//! - The [`Engine`] context object that ties them together

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod config;
pub mod engine;
pub mod lifecycle;
pub mod permission;
pub mod progress;
pub mod signal;

pub use engine::{Engine, EngineSnapshot};
