use std::collections::HashMap;

use crate::contracts::{Request, Route};

/// Route lookup collaborator
///
/// Real matching (path patterns, URL parsing, verb semantics) lives outside
/// the core; the pipeline only needs this narrow contract.
pub trait Router: Send + Sync + 'static {
    fn route(&self, request: &Request) -> Option<Route>;
}

/// Exact method+path table - the in-tree stand-in for an external router
///
/// Does no pattern matching on purpose.
#[derive(Default)]
pub struct RouteTable {
    routes: HashMap<(String, String), Route>,
}

impl RouteTable {
    pub fn new() -> RouteTable {
        RouteTable::default()
    }

    pub fn with(mut self, method: &str, path: &str, route: Route) -> RouteTable {
        self.routes.insert((method.to_string(), path.to_string()), route);
        self
    }
}

impl Router for RouteTable {
    fn route(&self, request: &Request) -> Option<Route> {
        self.routes
            .get(&(request.method.clone(), request.path.clone()))
            .cloned()
    }
}
