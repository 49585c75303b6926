use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

use trellis_di::Context;

use crate::errors::SequenceError;

/// Execution phase of one unit of work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Created,
    RouteResolved,
    ArgsParsed,
    Invoked,
    Responded,
    Errored,
    Rejected,
}

/// Per-unit-of-work state
///
/// Owns the request-scoped child context, the phase, and the terminal-action
/// guard. Two concurrent units of work never share a scope.
pub struct RequestScope {
    context: Context,
    phase: Mutex<Phase>,
    terminated: AtomicBool,
}

impl RequestScope {
    pub fn new(context: Context) -> RequestScope {
        RequestScope {
            context,
            phase: Mutex::new(Phase::Created),
            terminated: AtomicBool::new(false),
        }
    }

    /// The request-scoped context; elements written here are gone when the
    /// unit of work ends
    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn phase(&self) -> Phase {
        *self.phase.lock().unwrap()
    }

    pub fn advance(&self, phase: Phase) {
        tracing::debug!("{}: phase {:?}", self.context.name(), phase);
        *self.phase.lock().unwrap() = phase;
    }

    /// Mark the unit of work terminal
    ///
    /// The pipeline is terminal once send or reject has run exactly once; a
    /// second terminal action is a contract violation, not a double-written
    /// response.
    pub fn terminate(&self) -> Result<(), SequenceError> {
        if self.terminated.swap(true, Ordering::SeqCst) {
            tracing::error!("{}: terminal action ran twice", self.context.name());
            return Err(SequenceError::AlreadyTerminated);
        }
        Ok(())
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }
}
