//! Goal progress and the step-derived activity category
//!
//! Presentation and chat consume only these two values; neither feeds back
//! into detection.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Progress towards the configured goal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Progress {
    pub steps: u32,
    pub goal: u32,
}

impl Progress {
    pub fn new(steps: u32, goal: u32) -> Self {
        Self { steps, goal }
    }

    /// Percentage of the goal reached, capped at 100
    pub fn percent(&self) -> u8 {
        if self.goal == 0 {
            return 100;
        }
        let pct = (self.steps as u64 * 100) / self.goal as u64;
        pct.min(100) as u8
    }

    /// Check if the goal has been reached
    pub fn is_complete(&self) -> bool {
        self.steps >= self.goal
    }

    pub fn category(&self) -> ActivityCategory {
        ActivityCategory::from_progress(self)
    }
}

/// Coarse activity label derived from goal progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ActivityCategory {
    /// No steps yet
    Idle,
    /// Below a third of the goal
    Starting,
    /// Below two thirds of the goal
    Moving,
    /// Short of the goal
    Striding,
    /// Goal reached
    GoalReached,
}

impl ActivityCategory {
    pub fn from_progress(progress: &Progress) -> Self {
        if progress.steps == 0 {
            return ActivityCategory::Idle;
        }
        if progress.is_complete() {
            return ActivityCategory::GoalReached;
        }

        match progress.percent() {
            0..=33 => ActivityCategory::Starting,
            34..=66 => ActivityCategory::Moving,
            _ => ActivityCategory::Striding,
        }
    }

    /// Stable lowercase label
    pub fn label(&self) -> &'static str {
        match self {
            ActivityCategory::Idle => "idle",
            ActivityCategory::Starting => "starting",
            ActivityCategory::Moving => "moving",
            ActivityCategory::Striding => "striding",
            ActivityCategory::GoalReached => "goal_reached",
        }
    }
}

/// The two fields the chat collaborator sends alongside a user message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChatContext {
    pub steps: u32,
    pub category: ActivityCategory,
}

impl From<Progress> for ChatContext {
    fn from(progress: Progress) -> Self {
        Self {
            steps: progress.steps,
            category: progress.category(),
        }
    }
}
