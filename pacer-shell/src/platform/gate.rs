//! Scripted consent gate
//!
//! Stands in for the platform permission prompt when replaying traces.

use pacer_hal::{ConsentError, ConsentGate, ConsentResponse};
use tracing::debug;

/// How the scripted prompt answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentScript {
    /// Every request is granted
    Grant,
    /// Every request is refused
    Deny,
    /// The first request needs a gesture, later ones are granted
    Gesture,
    /// The request mechanism fails every time
    Fail,
}

/// Consent gate answering from a fixed script
#[derive(Debug, Clone)]
pub struct ScriptedGate {
    script: ConsentScript,
    requests: u32,
}

impl ScriptedGate {
    pub fn new(script: ConsentScript) -> Self {
        Self {
            script,
            requests: 0,
        }
    }

    /// Number of requests performed so far
    pub fn requests(&self) -> u32 {
        self.requests
    }

    fn answer(&self) -> Result<ConsentResponse, ConsentError> {
        match self.script {
            ConsentScript::Grant => Ok(ConsentResponse::Granted),
            ConsentScript::Deny => Ok(ConsentResponse::Denied),
            ConsentScript::Gesture if self.requests == 1 => Err(ConsentError::GestureRequired),
            ConsentScript::Gesture => Ok(ConsentResponse::Granted),
            ConsentScript::Fail => Err(ConsentError::Failed),
        }
    }
}

impl ConsentGate for ScriptedGate {
    async fn request(&mut self) -> Result<ConsentResponse, ConsentError> {
        self.requests += 1;
        let answer = self.answer();
        debug!("Scripted consent request {}", self.requests);
        answer
    }
}
