//! Well-known binding keys.
//!
//! Keys are plain strings namespaced by a per-component prefix
//! ("sequence.", "request.", "controllers."). The prefix convention is
//! documented, not machine-checked: two components binding the same
//! unprefixed key silently shadow each other, last write wins.

/// The pipeline handling each unit of work, as `Arc<dyn Sequence>`
pub const SEQUENCE: &str = "sequence.handler";

/// Route lookup action, as `Arc<dyn FindRoute>`
pub const FIND_ROUTE: &str = "sequence.actions.find_route";
/// Argument extraction action, as `Arc<dyn ParseArgs>`
pub const PARSE_ARGS: &str = "sequence.actions.parse_args";
/// Controller invocation action, as `Arc<dyn InvokeMethod>`
pub const INVOKE: &str = "sequence.actions.invoke";
/// Success terminal action, as `Arc<dyn SendResponse>`
pub const SEND: &str = "sequence.actions.send";
/// Failure terminal action, as `Arc<dyn Reject>`
pub const REJECT: &str = "sequence.actions.reject";

/// Route lookup collaborator, as `Arc<dyn Router>`
pub const ROUTER: &str = "sequence.router";

/// The current [crate::Request], bound into each per-request context
pub const REQUEST: &str = "request.current";
/// Element: the matched [crate::Route], written after find-route
pub const ROUTE: &str = "request.route";
/// Element: the parsed [crate::Args], written after parse-args
pub const ARGS: &str = "request.args";
/// Element: the invocation result, written after invoke
pub const RESULT: &str = "request.result";

/// Cooperative stop signal installed by a running server
pub const STOP_SIGNAL: &str = "server.stop";

/// Controller binding key for a registered controller name
pub fn controller(name: &str) -> String {
    format!("controllers.{name}")
}

/// Component instance binding key
pub fn component(name: &str) -> String {
    format!("components.{name}")
}

/// Repository binding key for an application-wide data-access object
pub fn repository(name: &str) -> String {
    format!("repositories.{name}")
}
