//! Trellis Sequence - the ordered, extensible pipeline handling one unit of
//! work on top of `trellis-di` contexts.
//!
//! Per incoming request the [SequenceEngine] creates a child context, binds
//! the request under [keys::REQUEST] and resolves the [Sequence] binding
//! from it. The default sequence runs find-route, parse-args, invoke and
//! send in document order, writes each produced element back into the
//! request context, and routes any action failure to the reject action -
//! the transport never sees a raw error.
//!
//! Trellis Sequence consists of the following components:
//!
//! 1. contracts - the transport-opaque Request/Response/Route/Args data
//! 2. keys - well-known binding keys and the namespacing convention
//! 3. actions - action contracts plus the default implementations
//! 4. sequence - the Sequence trait, default pipeline and engine
//! 5. scope - per-unit-of-work state and the terminal-action guard
//! 6. router - the narrow route-lookup collaborator contract

pub mod actions;
pub mod contracts;
pub mod errors;
pub mod keys;
pub mod router;
pub mod scope;
pub mod sequence;

pub use actions::{
    Controller, FindRoute, InvokeMethod, MissingArgument, NoRouteMatch, ParseArgs, Reject,
    SendResponse,
};
pub use contracts::{Args, Request, Response, Route};
pub use errors::SequenceError;
pub use router::{RouteTable, Router};
pub use scope::{Phase, RequestScope};
pub use sequence::{bind_default_actions, reject_with, DefaultSequence, Sequence, SequenceEngine};
