//! Configuration types
//!
//! Engine tuning, platform capabilities, and the postcard-encoded stored form.

#[cfg(feature = "serde")]
pub mod stored;
pub mod types;

#[cfg(feature = "serde")]
pub use stored::*;
pub use types::*;
