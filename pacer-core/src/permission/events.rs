//! Events that drive permission transitions

use pacer_hal::{ConsentError, ConsentResponse};

/// Events that can trigger permission transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PermissionEvent {
    /// A consent request was sent to the platform
    RequestIssued,
    /// The platform has no consent gate; access is implicit
    GateAbsent,
    /// The outstanding request was abandoned (tracking stopped)
    RequestCancelled,

    // Platform responses
    /// User or platform allowed access
    Granted,
    /// User or platform refused access
    Denied,
    /// Request rejected because it did not come from a user gesture
    GestureRequired,
    /// The request mechanism itself failed
    RequestFailed,
}

impl PermissionEvent {
    /// Map a consent gate result to its event
    pub fn from_result(result: Result<ConsentResponse, ConsentError>) -> Self {
        match result {
            Ok(ConsentResponse::Granted) => PermissionEvent::Granted,
            Ok(ConsentResponse::Denied) => PermissionEvent::Denied,
            Err(ConsentError::GestureRequired) => PermissionEvent::GestureRequired,
            Err(ConsentError::Failed) => PermissionEvent::RequestFailed,
        }
    }
}
