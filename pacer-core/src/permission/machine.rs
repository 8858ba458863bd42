//! Permission state definition

use super::events::PermissionEvent;

/// Consent gate states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PermissionState {
    /// Nothing asked yet, or re-armed for a gesture retry
    #[default]
    Idle,
    /// A request is outstanding
    Pending,
    /// Motion access allowed
    Granted,
    /// Refused, or the request failed; only a manual retry leaves this state
    Denied,
}

impl PermissionState {
    /// Check if a new request may be issued from this state
    ///
    /// Never true while a request is outstanding.
    pub fn can_request(&self) -> bool {
        matches!(self, PermissionState::Idle | PermissionState::Denied)
    }

    /// Check if access has been granted
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionState::Granted)
    }

    /// Check if a request is outstanding
    pub fn is_pending(&self) -> bool {
        matches!(self, PermissionState::Pending)
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            PermissionState::Idle => "idle",
            PermissionState::Pending => "pending",
            PermissionState::Granted => "granted",
            PermissionState::Denied => "denied",
        }
    }

    /// Process an event and return the next state
    pub fn transition(self, event: PermissionEvent) -> Self {
        use PermissionEvent as E;
        use PermissionState as S;

        match (self, event) {
            // Issuing a request
            (S::Idle, E::RequestIssued) => S::Pending,
            (S::Denied, E::RequestIssued) => S::Pending,

            // Platform without a consent gate
            (S::Idle, E::GateAbsent) => S::Granted,

            // Platform responses
            (S::Pending, E::Granted) => S::Granted,
            (S::Pending, E::Denied) => S::Denied,
            // Not a user decision: back to idle so a gesture can retry
            (S::Pending, E::GestureRequired) => S::Idle,
            (S::Pending, E::RequestFailed) => S::Denied,

            // Abandoned request: a late answer will be discarded
            (S::Pending, E::RequestCancelled) => S::Idle,

            // Default: stay in current state
            _ => self,
        }
    }
}
