//! Tracking lifecycle
//!
//! Decides when the motion stream is subscribed and negotiates the consent
//! gate. Four triggers can lead to tracking: auto-start on initialization,
//! the proactive request made at initialization, a one-shot retry armed for
//! the next user gesture, and the manual start/retry control. They all
//! funnel through [`Lifecycle::start_tracking`], a single check-and-set on
//! the tracking guard, so tracking starts at most once per session no
//! matter how they interleave.
//!
//! The lifecycle performs no I/O. Each operation returns an [`Action`] the
//! owner applies; consent requests come back as a [`RequestTicket`] that
//! must be handed to [`Lifecycle::resolve`] with the platform's answer.
//! Answers for any ticket other than the outstanding one are stale and
//! dropped.

use pacer_hal::{ConsentError, ConsentResponse};

use super::error::TrackerError;
use crate::config::Capabilities;
use crate::permission::{PermissionEvent, PermissionState};

/// What caused a consent request or a tracking start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Trigger {
    /// Initialization on a platform without a consent gate
    AutoStart,
    /// Request issued on initialization without a user gesture
    Proactive,
    /// Retry from inside a user gesture handler
    Gesture,
    /// The user pressed start/retry
    Manual,
}

/// Handle for one outstanding consent request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RequestTicket {
    id: u32,
    trigger: Trigger,
}

impl RequestTicket {
    /// Sequence number of the request
    pub fn id(&self) -> u32 {
        self.id
    }

    /// What caused the request
    pub fn trigger(&self) -> Trigger {
        self.trigger
    }
}

/// Side effect requested by the lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Nothing to do
    None,
    /// Reset the filter and counter, then subscribe to the motion stream
    StartTracking,
    /// Unsubscribe from the motion stream
    StopTracking,
    /// Ask the consent gate; resolve with this ticket
    RequestConsent(RequestTicket),
}

/// Permission and tracking lifecycle
#[derive(Debug, Clone)]
pub struct Lifecycle {
    capabilities: Capabilities,
    permission: PermissionState,
    initialized: bool,
    /// Tracking guard, distinct from permission
    tracking: bool,
    /// Number of times tracking actually started
    starts: u32,
    /// One-shot retry armed for the next user gesture
    gesture_armed: bool,
    outstanding: Option<RequestTicket>,
    next_ticket: u32,
    error: Option<TrackerError>,
    torn_down: bool,
}

impl Lifecycle {
    /// Create a lifecycle for the given platform capabilities
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            permission: PermissionState::Idle,
            initialized: false,
            tracking: false,
            starts: 0,
            gesture_armed: false,
            outstanding: None,
            next_ticket: 0,
            error: None,
            torn_down: false,
        }
    }

    pub fn permission(&self) -> PermissionState {
        self.permission
    }

    /// Check if the motion stream should be subscribed
    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    /// Number of times tracking has started in this lifecycle
    pub fn starts(&self) -> u32 {
        self.starts
    }

    /// Check if the next user gesture will retry the consent request
    pub fn is_gesture_armed(&self) -> bool {
        self.gesture_armed
    }

    /// The request currently awaiting a platform answer
    pub fn outstanding(&self) -> Option<RequestTicket> {
        self.outstanding
    }

    /// Condition currently blocking tracking, if any
    pub fn error(&self) -> Option<TrackerError> {
        self.error
    }

    /// Check if the manual retry control should be offered
    pub fn retry_available(&self) -> bool {
        self.usable()
            && !self.permission.is_granted()
            && self.error.map_or(true, |e| e.is_retryable())
    }

    /// Run the startup decision once
    ///
    /// - No motion API: surface [`TrackerError::CapabilityMissing`] and stop.
    /// - No consent gate: permission is implicit, start tracking.
    /// - Otherwise: issue the proactive consent request.
    pub fn initialize(&mut self) -> Action {
        if self.torn_down || self.initialized {
            return Action::None;
        }
        self.initialized = true;

        if !self.capabilities.has_motion_api {
            warn!("Motion API missing, tracking unavailable");
            self.error = Some(TrackerError::CapabilityMissing);
            return Action::None;
        }

        if !self.capabilities.has_consent_gate {
            self.apply(PermissionEvent::GateAbsent);
            return self.start_tracking(Trigger::AutoStart);
        }

        self.issue_request(Trigger::Proactive)
    }

    /// Manual start/retry entry point
    ///
    /// Idempotent while tracking and while a request is outstanding.
    pub fn start(&mut self) -> Action {
        if !self.usable() || self.tracking || self.permission.is_pending() {
            return Action::None;
        }

        if self.permission.is_granted() {
            return self.start_tracking(Trigger::Manual);
        }

        if !self.capabilities.has_consent_gate {
            self.apply(PermissionEvent::GateAbsent);
            return self.start_tracking(Trigger::Manual);
        }

        self.issue_request(Trigger::Manual)
    }

    /// A user touch or click was delivered
    ///
    /// Only acts when a gesture-required rejection armed the retry; the
    /// retry is consumed whether or not it leads to a request.
    pub fn on_user_gesture(&mut self) -> Action {
        if self.torn_down || !self.gesture_armed {
            return Action::None;
        }
        self.gesture_armed = false;

        if self.tracking {
            return Action::None;
        }

        if self.permission.is_granted() {
            return self.start_tracking(Trigger::Gesture);
        }

        self.issue_request(Trigger::Gesture)
    }

    /// Apply the platform's answer to a consent request
    pub fn resolve(
        &mut self,
        ticket: RequestTicket,
        result: Result<ConsentResponse, ConsentError>,
    ) -> Action {
        if self.torn_down || self.outstanding != Some(ticket) {
            debug!("Discarding stale consent answer for request {}", ticket.id);
            return Action::None;
        }
        self.outstanding = None;

        let event = PermissionEvent::from_result(result);
        self.apply(event);

        match event {
            PermissionEvent::Granted => {
                self.error = None;
                self.gesture_armed = false;
                self.start_tracking(ticket.trigger)
            }
            PermissionEvent::Denied => {
                self.error = Some(TrackerError::ConsentDenied);
                Action::None
            }
            PermissionEvent::GestureRequired => {
                debug!("Consent needs a user gesture, arming retry");
                self.error = None;
                self.gesture_armed = true;
                Action::None
            }
            PermissionEvent::RequestFailed => {
                self.error = Some(TrackerError::ConsentRequestFailed);
                Action::None
            }
            _ => Action::None,
        }
    }

    /// Stop tracking
    ///
    /// Abandons any outstanding request, so a late answer cannot restart
    /// tracking, and disarms the gesture retry.
    pub fn stop(&mut self) -> Action {
        if self.outstanding.take().is_some() {
            self.apply(PermissionEvent::RequestCancelled);
        }
        self.gesture_armed = false;

        if !self.tracking {
            return Action::None;
        }

        self.tracking = false;
        info!("Tracking stopped");
        Action::StopTracking
    }

    /// Tear the lifecycle down for good
    ///
    /// Every later operation is a no-op.
    pub fn teardown(&mut self) -> Action {
        let action = self.stop();
        self.torn_down = true;
        action
    }

    fn usable(&self) -> bool {
        !self.torn_down && self.capabilities.has_motion_api
    }

    fn apply(&mut self, event: PermissionEvent) {
        let next = self.permission.transition(event);
        if next != self.permission {
            trace!("Permission {:?} -> {:?}", self.permission, next);
        }
        self.permission = next;
    }

    fn issue_request(&mut self, trigger: Trigger) -> Action {
        if !self.permission.can_request() {
            return Action::None;
        }

        self.apply(PermissionEvent::RequestIssued);
        self.gesture_armed = false;

        let ticket = RequestTicket {
            id: self.next_ticket,
            trigger,
        };
        self.next_ticket = self.next_ticket.wrapping_add(1);
        self.outstanding = Some(ticket);

        debug!("Consent request {} issued ({:?})", ticket.id, trigger);
        Action::RequestConsent(ticket)
    }

    /// The single point where tracking starts
    fn start_tracking(&mut self, trigger: Trigger) -> Action {
        if self.torn_down || self.tracking {
            return Action::None;
        }

        self.tracking = true;
        self.starts = self.starts.saturating_add(1);
        info!("Tracking started ({:?})", trigger);
        Action::StartTracking
    }
}
