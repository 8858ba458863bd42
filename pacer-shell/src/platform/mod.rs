//! Host implementations of the platform traits

pub mod clock;
pub mod gate;
pub mod replay;

pub use clock::HostClock;
pub use gate::{ConsentScript, ScriptedGate};
pub use replay::{parse_trace, replay, ReplayStream, TraceError, TraceErrorKind, TraceRecord};
