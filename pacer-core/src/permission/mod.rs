//! Permission state machine for the platform consent gate
//!
//! The machine is explicit, finite and deterministic: the next state is a
//! function of the current state and an event.

pub mod events;
pub mod machine;

pub use events::PermissionEvent;
pub use machine::PermissionState;
