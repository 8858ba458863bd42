//! Host shell for the Pacer step engine
//!
//! Composes the board-agnostic engine with host implementations of the
//! platform traits:
//!
//! - [`channels`] - Event channel between platform callbacks and the controller
//! - [`controller`] - Event loop that drives the engine and awaits consent
//! - [`config`] - TOML / stored-blob configuration loading
//! - [`platform`] - Host clock, trace replay stream and scripted consent gate

#![deny(unsafe_code)]

pub mod channels;
pub mod config;
pub mod controller;
pub mod platform;

pub use controller::Controller;
