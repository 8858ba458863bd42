//! Low-pass magnitude filter state

/// Filter state owned by the step detector
///
/// Re-seeded every time tracking starts so a previous session's baseline
/// cannot produce spurious steps.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FilterState {
    /// Exponentially smoothed magnitude estimate (m/s²)
    pub filtered_magnitude: f32,
    /// Timestamp of the last accepted step, `None` before the first one
    pub last_step_at: Option<u64>,
}

impl FilterState {
    /// Fresh state seeded with the given baseline
    pub const fn seeded(gravity: f32) -> Self {
        Self {
            filtered_magnitude: gravity,
            last_step_at: None,
        }
    }

    /// Re-seed the baseline and forget the last step
    pub fn reset(&mut self, gravity: f32) {
        *self = Self::seeded(gravity);
    }

    /// Single-pole exponential update, returns the new estimate
    ///
    /// `filtered' = alpha * filtered + (1 - alpha) * magnitude`
    pub fn update(&mut self, magnitude: f32, alpha: f32) -> f32 {
        self.filtered_magnitude = alpha * self.filtered_magnitude + (1.0 - alpha) * magnitude;
        self.filtered_magnitude
    }

    /// Check if more than `refractory_ms` has passed since the last step
    ///
    /// Strict: exactly `refractory_ms` is still inside the window. A clock
    /// that went backwards never clears it.
    pub fn refractory_elapsed(&self, now_ms: u64, refractory_ms: u32) -> bool {
        match self.last_step_at {
            None => true,
            Some(last) => now_ms.saturating_sub(last) > refractory_ms as u64,
        }
    }
}
