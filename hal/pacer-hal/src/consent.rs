//! Consent gate abstraction
//!
//! Some platforms refuse to deliver motion data until the user has
//! explicitly allowed it, and some only show the prompt when the request
//! originates from a user gesture.

/// Decision returned by the platform for a consent request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConsentResponse {
    /// User or platform allowed motion access
    Granted,
    /// User or platform refused motion access
    Denied,
}

/// Errors raised by the request mechanism itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConsentError {
    /// The platform requires the request to originate from a user gesture
    GestureRequired,
    /// The request could not be completed (platform fault)
    Failed,
}

impl core::fmt::Display for ConsentError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConsentError::GestureRequired => f.write_str("consent request needs a user gesture"),
            ConsentError::Failed => f.write_str("consent request failed"),
        }
    }
}

/// Consent gate trait
///
/// Implementations wrap the platform's permission prompt. The future
/// resolves once the platform answers; the engine never issues a second
/// request while one is outstanding.
pub trait ConsentGate {
    /// Ask the platform for motion access
    fn request(
        &mut self,
    ) -> impl core::future::Future<Output = Result<ConsentResponse, ConsentError>>;
}
