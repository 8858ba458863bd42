//! Engine context
//!
//! Owns everything that lives for one tracking session: the configuration,
//! the lifecycle, the detector, the counter and the motion stream. The shell
//! holds exactly one of these and feeds it platform events; there is no
//! module-level state.

use pacer_hal::{ConsentError, ConsentGate, ConsentResponse, MotionReading, MotionStream};

use crate::config::{Capabilities, ConfigError, EngineConfig};
use crate::lifecycle::{Action, Lifecycle, RequestTicket, TrackerError};
use crate::permission::PermissionState;
use crate::progress::{ActivityCategory, ChatContext, Progress};
use crate::signal::{StepCounter, StepDetector};

/// Point-in-time view of the engine for presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EngineSnapshot {
    pub steps: u32,
    pub permission: PermissionState,
    pub tracking: bool,
    pub error: Option<TrackerError>,
    pub retry_available: bool,
    pub progress: Progress,
    pub category: ActivityCategory,
}

impl EngineSnapshot {
    /// User-facing text for the current error, if any
    pub fn error_message(&self) -> Option<&'static str> {
        self.error.map(|e| e.message())
    }
}

/// Step engine bound to one motion stream
///
/// Operations that may need the consent gate return the [`RequestTicket`]
/// to perform; hand it to [`Engine::negotiate`] (or perform the request
/// yourself and call [`Engine::resolve_consent`]).
pub struct Engine<M: MotionStream> {
    config: EngineConfig,
    lifecycle: Lifecycle,
    detector: StepDetector,
    counter: StepCounter,
    stream: M,
}

impl<M: MotionStream> Engine<M> {
    /// Create an engine after validating `config`
    pub fn new(
        config: EngineConfig,
        capabilities: Capabilities,
        stream: M,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            config,
            lifecycle: Lifecycle::new(capabilities),
            detector: StepDetector::new(config.detector),
            counter: StepCounter::new(config.counter),
            stream,
        })
    }

    /// Run the startup decision
    pub fn initialize(&mut self) -> Option<RequestTicket> {
        let action = self.lifecycle.initialize();
        self.apply(action)
    }

    /// Manual start/retry
    pub fn start(&mut self) -> Option<RequestTicket> {
        let action = self.lifecycle.start();
        self.apply(action)
    }

    /// Deliver a user gesture; returns a ticket if a retry was armed
    pub fn on_user_gesture(&mut self) -> Option<RequestTicket> {
        let action = self.lifecycle.on_user_gesture();
        self.apply(action)
    }

    /// Apply the platform's answer for `ticket`
    pub fn resolve_consent(
        &mut self,
        ticket: RequestTicket,
        result: Result<ConsentResponse, ConsentError>,
    ) {
        let action = self.lifecycle.resolve(ticket, result);
        self.apply(action);
    }

    /// Perform the consent request for `ticket` and apply the answer
    pub async fn negotiate<G: ConsentGate>(&mut self, gate: &mut G, ticket: RequestTicket) {
        let result = gate.request().await;
        self.resolve_consent(ticket, result);
    }

    /// Feed one platform reading stamped with `now_ms`
    ///
    /// Returns true if a step was counted. Readings arriving while tracking
    /// is inactive are ignored.
    pub fn on_motion(&mut self, reading: &MotionReading, now_ms: u64) -> bool {
        if !self.lifecycle.is_tracking() {
            return false;
        }

        let Some(outcome) = self.detector.process_reading(reading, now_ms) else {
            return false;
        };

        if outcome.step_detected {
            let count = self.counter.record_step();
            trace!("Step at {} ms, count {}", now_ms, count);
        }

        outcome.step_detected
    }

    /// Stop tracking, abandoning any outstanding request
    pub fn stop(&mut self) {
        let action = self.lifecycle.stop();
        self.apply(action);
    }

    /// Release the subscription for good
    pub fn teardown(&mut self) {
        let action = self.lifecycle.teardown();
        self.apply(action);
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn stream(&self) -> &M {
        &self.stream
    }

    pub fn step_count(&self) -> u32 {
        self.counter.count()
    }

    pub fn permission(&self) -> PermissionState {
        self.lifecycle.permission()
    }

    pub fn is_tracking(&self) -> bool {
        self.lifecycle.is_tracking()
    }

    pub fn error(&self) -> Option<TrackerError> {
        self.lifecycle.error()
    }

    pub fn error_message(&self) -> Option<&'static str> {
        self.error().map(|e| e.message())
    }

    pub fn retry_available(&self) -> bool {
        self.lifecycle.retry_available()
    }

    pub fn progress(&self) -> Progress {
        Progress::new(self.counter.count(), self.config.goal_steps)
    }

    pub fn chat_context(&self) -> ChatContext {
        ChatContext::from(self.progress())
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let progress = self.progress();
        EngineSnapshot {
            steps: progress.steps,
            permission: self.permission(),
            tracking: self.is_tracking(),
            error: self.error(),
            retry_available: self.retry_available(),
            progress,
            category: progress.category(),
        }
    }

    fn apply(&mut self, action: Action) -> Option<RequestTicket> {
        match action {
            Action::None => None,
            Action::StartTracking => {
                self.detector.reset();
                self.counter.reset();
                self.stream.subscribe();
                None
            }
            Action::StopTracking => {
                self.stream.unsubscribe();
                None
            }
            Action::RequestConsent(ticket) => Some(ticket),
        }
    }
}

impl<M: MotionStream> Drop for Engine<M> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CounterConfig;
    use pacer_hal::Axes;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Stream that counts subscriptions through shared cells
    #[derive(Default, Clone)]
    struct MockStream {
        active: Rc<Cell<u32>>,
        subscribes: Rc<Cell<u32>>,
    }

    impl MotionStream for MockStream {
        fn subscribe(&mut self) {
            self.active.set(self.active.get() + 1);
            self.subscribes.set(self.subscribes.get() + 1);
        }

        fn unsubscribe(&mut self) {
            self.active.set(self.active.get().saturating_sub(1));
        }

        fn is_subscribed(&self) -> bool {
            self.active.get() > 0
        }
    }

    struct ScriptedGate {
        answers: Vec<Result<ConsentResponse, ConsentError>>,
        requests: u32,
    }

    impl ScriptedGate {
        fn new(answers: &[Result<ConsentResponse, ConsentError>]) -> Self {
            Self {
                answers: answers.iter().rev().copied().collect(),
                requests: 0,
            }
        }
    }

    impl ConsentGate for ScriptedGate {
        async fn request(&mut self) -> Result<ConsentResponse, ConsentError> {
            self.requests += 1;
            self.answers.pop().unwrap_or(Err(ConsentError::Failed))
        }
    }

    fn reading(magnitude: f32) -> MotionReading {
        MotionReading::including_gravity(Axes::new(0.0, 0.0, magnitude))
    }

    fn engine(capabilities: Capabilities) -> (Engine<MockStream>, MockStream) {
        let stream = MockStream::default();
        let engine = Engine::new(EngineConfig::default(), capabilities, stream.clone()).unwrap();
        (engine, stream)
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::default();
        config.goal_steps = 0;
        let result = Engine::new(config, Capabilities::ungated(), MockStream::default());
        assert_eq!(result.err(), Some(ConfigError::InvalidGoal));
    }

    #[test]
    fn test_ungated_counts_steps() {
        let (mut engine, stream) = engine(Capabilities::ungated());
        assert!(engine.initialize().is_none());
        assert!(engine.is_tracking());
        assert_eq!(stream.active.get(), 1);

        assert!(engine.on_motion(&reading(12.0), 1000));
        assert!(!engine.on_motion(&reading(12.0), 1100));
        assert_eq!(engine.step_count(), 1);
    }

    #[test]
    fn test_motion_ignored_when_not_tracking() {
        let (mut engine, _stream) = engine(Capabilities::gated());
        engine.initialize();
        assert!(!engine.on_motion(&reading(30.0), 0));
        assert_eq!(engine.step_count(), 0);
    }

    #[test]
    fn test_negotiate_grant() {
        let (mut engine, stream) = engine(Capabilities::gated());
        let mut gate = ScriptedGate::new(&[Ok(ConsentResponse::Granted)]);

        let ticket = engine.initialize().unwrap();
        embassy_futures::block_on(engine.negotiate(&mut gate, ticket));

        assert_eq!(gate.requests, 1);
        assert_eq!(engine.permission(), PermissionState::Granted);
        assert!(engine.is_tracking());
        assert_eq!(stream.active.get(), 1);
    }

    #[test]
    fn test_gesture_required_flow() {
        let (mut engine, stream) = engine(Capabilities::gated());
        let mut gate = ScriptedGate::new(&[
            Err(ConsentError::GestureRequired),
            Ok(ConsentResponse::Granted),
        ]);

        let ticket = engine.initialize().unwrap();
        embassy_futures::block_on(engine.negotiate(&mut gate, ticket));
        assert_eq!(engine.permission(), PermissionState::Idle);
        assert!(engine.error_message().is_none());
        assert!(!engine.is_tracking());

        let retry = engine.on_user_gesture().unwrap();
        embassy_futures::block_on(engine.negotiate(&mut gate, retry));
        assert!(engine.is_tracking());
        assert_eq!(stream.subscribes.get(), 1);
        assert_eq!(gate.requests, 2);
    }

    #[test]
    fn test_denied_snapshot() {
        let (mut engine, _stream) = engine(Capabilities::gated());
        let mut gate = ScriptedGate::new(&[Ok(ConsentResponse::Denied)]);

        let ticket = engine.initialize().unwrap();
        embassy_futures::block_on(engine.negotiate(&mut gate, ticket));

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.permission, PermissionState::Denied);
        assert!(!snapshot.tracking);
        assert!(snapshot.retry_available);
        assert_eq!(snapshot.error, Some(TrackerError::ConsentDenied));
        assert_eq!(
            snapshot.error_message(),
            Some(TrackerError::ConsentDenied.message())
        );
        assert_eq!(snapshot.category, ActivityCategory::Idle);
    }

    #[test]
    fn test_capability_missing_snapshot() {
        let (mut engine, stream) = engine(Capabilities::unsupported());
        assert!(engine.initialize().is_none());
        assert!(engine.start().is_none());

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.error, Some(TrackerError::CapabilityMissing));
        assert!(!snapshot.retry_available);
        assert_eq!(snapshot.permission, PermissionState::Idle);
        assert_eq!(stream.subscribes.get(), 0);
    }

    #[test]
    fn test_restart_reseeds_filter() {
        let (mut engine, _stream) = engine(Capabilities::ungated());
        engine.initialize();

        // Let the baseline settle near 12 m/s²
        for i in 0..60u64 {
            engine.on_motion(&reading(12.0), i * 20);
        }
        assert!(!engine.on_motion(&reading(11.3), 5000));

        engine.stop();
        engine.start();
        assert_eq!(engine.step_count(), 0);

        // Against a fresh 9.81 baseline the same sample is a step
        assert!(engine.on_motion(&reading(11.3), 5020));
        assert_eq!(engine.step_count(), 1);
    }

    #[test]
    fn test_restart_resets_counter() {
        let config = EngineConfig {
            counter: CounterConfig {
                step_increment: 1000,
                start_value: 0,
            },
            goal_steps: 10_000,
            ..EngineConfig::default()
        };
        let mut engine =
            Engine::new(config, Capabilities::ungated(), MockStream::default()).unwrap();
        engine.initialize();

        engine.on_motion(&reading(12.0), 0);
        assert_eq!(engine.step_count(), 1000);
        assert_eq!(engine.chat_context().category, ActivityCategory::Starting);

        engine.stop();
        // Count survives a stop until the next start
        assert_eq!(engine.step_count(), 1000);
        engine.start();
        assert_eq!(engine.step_count(), 0);
    }

    #[test]
    fn test_repeated_start_stop_no_leak() {
        let (mut engine, stream) = engine(Capabilities::ungated());
        engine.initialize();

        for _ in 0..10 {
            engine.start();
            engine.start();
            engine.stop();
            engine.stop();
            engine.start();
        }

        assert_eq!(stream.active.get(), 1);
        assert_eq!(stream.subscribes.get(), 11);
    }

    #[test]
    fn test_drop_releases_subscription() {
        let stream = MockStream::default();
        {
            let mut engine =
                Engine::new(EngineConfig::default(), Capabilities::ungated(), stream.clone())
                    .unwrap();
            engine.initialize();
            assert_eq!(stream.active.get(), 1);
        }
        assert_eq!(stream.active.get(), 0);
    }

    #[test]
    fn test_late_grant_after_teardown() {
        let (mut engine, stream) = engine(Capabilities::gated());
        let ticket = engine.initialize().unwrap();

        engine.teardown();
        engine.resolve_consent(ticket, Ok(ConsentResponse::Granted));

        assert!(!engine.is_tracking());
        assert_eq!(stream.subscribes.get(), 0);
    }
}
