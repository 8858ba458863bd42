//! Trace replay
//!
//! A trace is plain text, one reading per line:
//!
//! ```text
//! # t_ms,x,y,z[,lx,ly,lz]
//! 0,0.1,0.2,9.8
//! 20,,,9.9
//! 40,,,,0.0,0.0,1.5
//! ```
//!
//! The first triple is gravity-inclusive, the optional second one linear.
//! Empty fields are axes the platform did not report.

use std::cell::Cell;
use std::rc::Rc;

use pacer_hal::{Axes, MotionReading, MotionStream};
use tracing::{debug, warn};

use crate::channels::{AppEvent, EventSender};

/// Motion stream whose subscription state is shared with the replay driver
#[derive(Debug, Clone, Default)]
pub struct ReplayStream {
    subscribed: Rc<Cell<bool>>,
    subscriptions: Rc<Cell<u32>>,
}

impl ReplayStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of subscriptions taken
    pub fn subscriptions(&self) -> u32 {
        self.subscriptions.get()
    }
}

impl MotionStream for ReplayStream {
    fn subscribe(&mut self) {
        if self.subscribed.replace(true) {
            warn!("Replay stream subscribed twice");
            return;
        }
        self.subscriptions.set(self.subscriptions.get() + 1);
    }

    fn unsubscribe(&mut self) {
        self.subscribed.set(false);
    }

    fn is_subscribed(&self) -> bool {
        self.subscribed.get()
    }
}

/// One timestamped reading from a trace
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceRecord {
    pub at_ms: u64,
    pub reading: MotionReading,
}

/// What was wrong with a trace line
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TraceErrorKind {
    /// Neither 4 nor 7 comma-separated fields
    #[error("expected t_ms,x,y,z or t_ms,x,y,z,lx,ly,lz")]
    FieldCount,
    /// Timestamp is not an unsigned integer
    #[error("invalid timestamp")]
    Timestamp,
    /// Axis value is not a number
    #[error("invalid axis value")]
    Axis,
}

/// Malformed trace line
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("trace line {line}: {kind}")]
pub struct TraceError {
    /// 1-based line number
    pub line: usize,
    pub kind: TraceErrorKind,
}

/// Parse a whole trace
pub fn parse_trace(text: &str) -> Result<Vec<TraceRecord>, TraceError> {
    let mut records = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let error = |kind| TraceError {
            line: index + 1,
            kind,
        };

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != 4 && fields.len() != 7 {
            return Err(error(TraceErrorKind::FieldCount));
        }

        let at_ms = fields[0]
            .parse::<u64>()
            .map_err(|_| error(TraceErrorKind::Timestamp))?;

        let including_gravity =
            parse_axes(&fields[1..4]).ok_or_else(|| error(TraceErrorKind::Axis))?;
        let linear = match fields.get(4..7) {
            Some(axes) => parse_axes(axes).ok_or_else(|| error(TraceErrorKind::Axis))?,
            None => None,
        };

        records.push(TraceRecord {
            at_ms,
            reading: MotionReading {
                including_gravity,
                linear,
            },
        });
    }

    Ok(records)
}

/// Parse three axis fields; `Some(None)` when none is reported
fn parse_axes(fields: &[&str]) -> Option<Option<Axes>> {
    let mut values = [None; 3];
    for (slot, field) in values.iter_mut().zip(fields) {
        if !field.is_empty() {
            *slot = Some(field.parse::<f32>().ok()?);
        }
    }

    let axes = Axes {
        x: values[0],
        y: values[1],
        z: values[2],
    };
    Some(axes.any_present().then_some(axes))
}

/// Push every record into the event channel, waiting when it is full
pub async fn replay(records: &[TraceRecord], sender: &EventSender<'_>) {
    for record in records {
        sender
            .send(AppEvent::Motion {
                reading: record.reading,
                at_ms: record.at_ms,
            })
            .await;
    }
    debug!(readings = records.len(), "Replay finished");
}
