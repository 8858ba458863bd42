//! Time source

/// Monotonic millisecond clock
///
/// Used to stamp motion readings when the platform delivers them.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin
    fn now_ms(&self) -> u64;
}
