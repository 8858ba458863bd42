//! Blocking conditions surfaced to the user

/// Conditions that keep tracking from running
///
/// A gesture-required rejection is deliberately absent: it re-arms the
/// gesture retry and is never shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TrackerError {
    /// The platform has no motion sensor API; no retry path
    CapabilityMissing,
    /// The user or platform refused access; manual retry only
    ConsentDenied,
    /// The request mechanism failed; manual retry invited
    ConsentRequestFailed,
}

impl TrackerError {
    /// User-facing message
    pub fn message(&self) -> &'static str {
        match self {
            TrackerError::CapabilityMissing => {
                "Motion sensors are not available on this device."
            }
            TrackerError::ConsentDenied => {
                "Motion sensor access was denied. Tap retry to allow step tracking."
            }
            TrackerError::ConsentRequestFailed => {
                "Motion sensor permission request failed. Tap retry to try again."
            }
        }
    }

    /// Check if a manual retry can clear this condition
    pub fn is_retryable(&self) -> bool {
        !matches!(self, TrackerError::CapabilityMissing)
    }
}

impl core::fmt::Display for TrackerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}
