//! Event channel
//!
//! Platform callbacks push [`AppEvent`]s; the controller is the only
//! receiver. Everything runs on one thread, so the channel uses
//! `NoopRawMutex`.

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};

use pacer_hal::{Clock, MotionReading};
use tracing::trace;

/// Channel capacity for application events
pub const EVENT_CHANNEL_SIZE: usize = 32;

/// Events delivered to the controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppEvent {
    /// A motion reading stamped on arrival
    Motion { reading: MotionReading, at_ms: u64 },
    /// The user touched or clicked anywhere
    Gesture,
    /// The start/retry control was pressed
    RetryPressed,
    /// The stop control was pressed
    StopPressed,
    /// The view is going away
    Shutdown,
}

pub type EventChannel = Channel<NoopRawMutex, AppEvent, EVENT_CHANNEL_SIZE>;
pub type EventSender<'a> = Sender<'a, NoopRawMutex, AppEvent, EVENT_CHANNEL_SIZE>;
pub type EventReceiver<'a> = Receiver<'a, NoopRawMutex, AppEvent, EVENT_CHANNEL_SIZE>;

/// Motion callback adapter
///
/// Stamps each reading with the clock and pushes it without waiting; a
/// reading that finds the channel full is dropped.
pub struct MotionFeed<'a, C: Clock> {
    sender: EventSender<'a>,
    clock: C,
    dropped: u32,
}

impl<'a, C: Clock> MotionFeed<'a, C> {
    pub fn new(sender: EventSender<'a>, clock: C) -> Self {
        Self {
            sender,
            clock,
            dropped: 0,
        }
    }

    /// Deliver one platform reading, returns false if it was dropped
    pub fn on_reading(&mut self, reading: MotionReading) -> bool {
        let at_ms = self.clock.now_ms();
        match self.sender.try_send(AppEvent::Motion { reading, at_ms }) {
            Ok(()) => true,
            Err(_) => {
                self.dropped = self.dropped.saturating_add(1);
                trace!("Event channel full, reading dropped");
                false
            }
        }
    }

    /// Number of readings lost to a full channel
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use pacer_hal::Axes;

    struct StepClock {
        now: Cell<u64>,
    }

    impl Clock for StepClock {
        fn now_ms(&self) -> u64 {
            let now = self.now.get();
            self.now.set(now + 20);
            now
        }
    }

    #[test]
    fn test_feed_stamps_readings() {
        let channel = EventChannel::new();
        let mut feed = MotionFeed::new(channel.sender(), StepClock { now: Cell::new(100) });
        let reading = MotionReading::including_gravity(Axes::new(0.0, 0.0, 9.81));

        assert!(feed.on_reading(reading));
        assert!(feed.on_reading(reading));

        let receiver = channel.receiver();
        assert_eq!(
            receiver.try_receive().ok(),
            Some(AppEvent::Motion { reading, at_ms: 100 })
        );
        assert_eq!(
            receiver.try_receive().ok(),
            Some(AppEvent::Motion { reading, at_ms: 120 })
        );
    }

    #[test]
    fn test_feed_drops_when_full() {
        let channel = EventChannel::new();
        let mut feed = MotionFeed::new(channel.sender(), StepClock { now: Cell::new(0) });
        let reading = MotionReading::empty();

        for _ in 0..EVENT_CHANNEL_SIZE {
            assert!(feed.on_reading(reading));
        }
        assert!(!feed.on_reading(reading));
        assert_eq!(feed.dropped(), 1);
    }
}
