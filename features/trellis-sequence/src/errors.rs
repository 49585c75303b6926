use thiserror::Error;

use trellis_di::{DynError, ResolveError};

/// Errors surfacing from the pipeline's control logic
///
/// Action failures do not appear here: the pipeline routes them to the
/// reject action, whose response is the failure representation the transport
/// sees.
#[derive(Error, Debug)]
pub enum SequenceError {
    /// A terminal action ran twice for one unit of work
    #[error("send or reject already ran for this unit of work")]
    AlreadyTerminated,

    /// Resolving the sequence or one of its actions failed
    #[error(transparent)]
    Resolution(#[from] ResolveError),

    /// The reject action itself failed; no response exists for this unit
    #[error("reject action failed: {0}")]
    Reject(DynError),
}
