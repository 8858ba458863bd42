//! Controller
//!
//! Drains the event channel into the engine. Whenever the engine hands back
//! a consent ticket the request is awaited inside the same handler, so a
//! retry triggered by a gesture is performed while that gesture is still
//! being handled.

use pacer_core::{Engine, EngineSnapshot};
use pacer_hal::{ConsentGate, MotionStream};
use tracing::{debug, info};

use crate::channels::{AppEvent, EventReceiver};

/// Host controller owning the engine and the consent gate
pub struct Controller<M: MotionStream, G: ConsentGate> {
    engine: Engine<M>,
    gate: G,
    events_handled: u32,
}

impl<M: MotionStream, G: ConsentGate> Controller<M, G> {
    pub fn new(engine: Engine<M>, gate: G) -> Self {
        Self {
            engine,
            gate,
            events_handled: 0,
        }
    }

    /// Run the startup decision, awaiting the proactive request if any
    pub async fn boot(&mut self) {
        info!("Controller booting");
        if let Some(ticket) = self.engine.initialize() {
            self.engine.negotiate(&mut self.gate, ticket).await;
        }

        let snapshot = self.engine.snapshot();
        info!(
            permission = snapshot.permission.label(),
            tracking = snapshot.tracking,
            "Boot complete"
        );
    }

    /// Handle one event, returns false once the controller has shut down
    pub async fn handle(&mut self, event: AppEvent) -> bool {
        self.events_handled = self.events_handled.saturating_add(1);

        let ticket = match event {
            AppEvent::Motion { reading, at_ms } => {
                self.engine.on_motion(&reading, at_ms);
                None
            }
            AppEvent::Gesture => self.engine.on_user_gesture(),
            AppEvent::RetryPressed => {
                debug!("Retry pressed");
                self.engine.start()
            }
            AppEvent::StopPressed => {
                debug!("Stop pressed");
                self.engine.stop();
                None
            }
            AppEvent::Shutdown => {
                info!("Shutting down");
                self.engine.teardown();
                return false;
            }
        };

        if let Some(ticket) = ticket {
            self.engine.negotiate(&mut self.gate, ticket).await;
        }

        true
    }

    /// Process events until [`AppEvent::Shutdown`]
    pub async fn run(&mut self, events: EventReceiver<'_>) {
        loop {
            let event = events.receive().await;
            if !self.handle(event).await {
                break;
            }
        }
    }

    pub fn engine(&self) -> &Engine<M> {
        &self.engine
    }

    pub fn gate(&self) -> &G {
        &self.gate
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        self.engine.snapshot()
    }

    pub fn events_handled(&self) -> u32 {
        self.events_handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::EventChannel;
    use crate::platform::{parse_trace, replay, ConsentScript, ReplayStream, ScriptedGate};
    use embassy_futures::block_on;
    use embassy_futures::join::join;
    use pacer_core::config::{Capabilities, EngineConfig};
    use pacer_core::permission::PermissionState;
    use pacer_core::progress::ActivityCategory;
    use pacer_hal::{Axes, MotionReading};

    fn controller(
        script: ConsentScript,
        capabilities: Capabilities,
    ) -> (Controller<ReplayStream, ScriptedGate>, ReplayStream) {
        let stream = ReplayStream::new();
        let engine = Engine::new(EngineConfig::default(), capabilities, stream.clone()).unwrap();
        (Controller::new(engine, ScriptedGate::new(script)), stream)
    }

    fn motion(magnitude: f32, at_ms: u64) -> AppEvent {
        AppEvent::Motion {
            reading: MotionReading::including_gravity(Axes::new(0.0, 0.0, magnitude)),
            at_ms,
        }
    }

    #[test]
    fn test_boot_grants_and_tracks() {
        let (mut controller, stream) = controller(ConsentScript::Grant, Capabilities::gated());
        block_on(controller.boot());

        assert!(controller.engine().is_tracking());
        assert!(stream.is_subscribed());
        assert_eq!(controller.gate().requests(), 1);
    }

    #[test]
    fn test_gesture_retry_inside_handler() {
        let (mut controller, stream) = controller(ConsentScript::Gesture, Capabilities::gated());
        block_on(controller.boot());
        assert_eq!(controller.snapshot().permission, PermissionState::Idle);
        assert!(!stream.is_subscribed());

        // Readings before consent are ignored
        assert!(block_on(controller.handle(motion(20.0, 0))));
        assert_eq!(controller.snapshot().steps, 0);

        block_on(controller.handle(AppEvent::Gesture));
        assert!(controller.engine().is_tracking());
        assert_eq!(controller.gate().requests(), 2);

        block_on(controller.handle(motion(12.0, 1000)));
        assert_eq!(controller.snapshot().steps, 1);
    }

    #[test]
    fn test_denied_then_retry_still_denied() {
        let (mut controller, _stream) = controller(ConsentScript::Deny, Capabilities::gated());
        block_on(controller.boot());
        block_on(controller.handle(AppEvent::Gesture));
        assert_eq!(controller.gate().requests(), 1);

        block_on(controller.handle(AppEvent::RetryPressed));
        assert_eq!(controller.gate().requests(), 2);
        assert!(controller.snapshot().retry_available);
        assert!(controller.snapshot().error_message().is_some());
    }

    #[test]
    fn test_stop_and_retry() {
        let (mut controller, stream) = controller(ConsentScript::Grant, Capabilities::ungated());
        block_on(controller.boot());
        block_on(controller.handle(motion(12.0, 0)));
        assert_eq!(controller.snapshot().steps, 1);

        block_on(controller.handle(AppEvent::StopPressed));
        assert!(!stream.is_subscribed());

        block_on(controller.handle(AppEvent::RetryPressed));
        assert!(stream.is_subscribed());
        assert_eq!(controller.snapshot().steps, 0);
        assert_eq!(stream.subscriptions(), 2);
        assert_eq!(controller.gate().requests(), 0);
    }

    #[test]
    fn test_run_until_shutdown() {
        let channel = EventChannel::new();
        let (mut controller, stream) = controller(ConsentScript::Grant, Capabilities::gated());
        block_on(controller.boot());

        let sender = channel.sender();
        let producer = async {
            for i in 0..100u64 {
                let magnitude = if (i / 5) % 2 == 0 { 9.81 } else { 11.81 };
                sender.send(motion(magnitude, i * 20)).await;
            }
            sender.send(AppEvent::Shutdown).await;
        };

        block_on(join(producer, controller.run(channel.receiver())));

        assert!(controller.snapshot().steps > 0);
        assert_eq!(controller.events_handled(), 101);
        assert!(!stream.is_subscribed());
        assert!(!controller.engine().is_tracking());
    }

    #[test]
    fn test_replay_walking_trace() {
        let records = parse_trace(include_str!("../traces/walk.csv")).unwrap();
        assert_eq!(records.len(), 500);

        let channel = EventChannel::new();
        let (mut controller, stream) = controller(ConsentScript::Gesture, Capabilities::gated());
        block_on(controller.boot());

        let sender = channel.sender();
        let producer = async {
            sender.send(AppEvent::Gesture).await;
            replay(&records, &sender).await;
            sender.send(AppEvent::Shutdown).await;
        };
        block_on(join(producer, controller.run(channel.receiver())));

        let snapshot = controller.snapshot();
        assert!(
            (15..=25).contains(&snapshot.steps),
            "counted {} steps",
            snapshot.steps
        );
        assert_eq!(snapshot.category, ActivityCategory::Starting);
        assert_eq!(controller.engine().lifecycle().starts(), 1);
        assert_eq!(stream.subscriptions(), 1);
        assert!(!stream.is_subscribed());
    }
}
