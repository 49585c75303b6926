//! Application lifecycle: fail-fast startup, server start/stop and the
//! cooperative stop signal.

use std::sync::Arc;

use futures::{executor::block_on, future::BoxFuture, FutureExt};
use serde_json::{json, Value as JsonValue};
use trellis_di::{Binding, DependencyRequest, DynError, Factory, Injected};
use trellis_sequence::{keys, Args, Controller, Request, Route, RouteTable, Router};
use trellis_app::{Application, InProcessServer, LifecycleError, Server, StopSignal};

struct PingController;
impl Controller for PingController {
    fn call<'a>(
        &'a self,
        _operation: &'a str,
        _args: Args,
    ) -> BoxFuture<'a, Result<JsonValue, DynError>> {
        async move { Ok(json!("pong")) }.boxed()
    }
}
struct PingControllerFactory;
impl Factory for PingControllerFactory {
    type Provides = Arc<dyn Controller>;
    fn dependencies() -> Vec<DependencyRequest> {
        Vec::new()
    }
    fn create(_deps: Injected) -> Result<Self::Provides, DynError> {
        Ok(Arc::new(PingController))
    }
}

fn routed_server(app: &Application) -> Arc<InProcessServer> {
    let server = InProcessServer::new(app.context(), "main");
    let router: Arc<dyn Router> = Arc::new(RouteTable::new().with(
        "GET",
        "/ping",
        Route::new(keys::controller("ping"), "ping"),
    ));
    server.context().bind(Binding::constant(keys::ROUTER, router));
    server
        .context()
        .bind(Binding::class::<PingControllerFactory>(keys::controller("ping")));
    server
}

#[test]
fn started_application_serves_and_stops() {
    let app = Application::new();
    let server = routed_server(&app);
    app.add_server("main", server.clone());

    block_on(app.start()).unwrap();
    assert!(server.is_running());
    assert!(app.server("main").is_some());
    assert!(app.server("other").is_none());

    let response = block_on(server.dispatch(Request::new("GET", "/ping"))).unwrap();
    assert_eq!(response.body, json!("pong"));

    block_on(app.stop()).unwrap();
    assert!(!server.is_running());
}

struct Needy;
impl Factory for Needy {
    type Provides = u32;
    fn dependencies() -> Vec<DependencyRequest> {
        vec![DependencyRequest::direct("missing.dependency")]
    }
    fn create(_deps: Injected) -> Result<u32, DynError> {
        Ok(0)
    }
}

#[test]
fn unresolvable_wiring_fails_at_startup_not_first_request() {
    let app = Application::new();
    app.context().bind(Binding::class::<Needy>("needy"));

    let err = block_on(app.start()).unwrap_err();
    assert!(matches!(err, LifecycleError::Wiring(_)));
}

#[test]
fn a_server_without_its_router_collaborator_fails_to_start() {
    let app = Application::new();
    // default actions need keys::ROUTER; nothing binds it
    let server = InProcessServer::new(app.context(), "bare");
    app.add_server("bare", server);

    let err = block_on(app.start()).unwrap_err();
    assert!(matches!(err, LifecycleError::Server { .. }));
}

#[test]
fn stopping_releases_cooperative_background_work() {
    let app = Application::new();
    let server = routed_server(&app);
    app.add_server("main", server.clone());

    block_on(app.start()).unwrap();

    // a component's polling loop would hold a clone of this signal
    let signal = (*server
        .context()
        .require::<StopSignal>(keys::STOP_SIGNAL)
        .unwrap())
    .clone();
    assert!(!signal.is_stopped());

    block_on(app.stop()).unwrap();
    assert!(signal.is_stopped());
    // observers waiting on the signal wake up instead of hanging
    block_on(signal.stopped());
}

#[test]
fn servers_restart_with_a_fresh_stop_signal() {
    let app = Application::new();
    let server = routed_server(&app);

    block_on(server.start()).unwrap();
    let first = (*server
        .context()
        .require::<StopSignal>(keys::STOP_SIGNAL)
        .unwrap())
    .clone();
    block_on(server.stop()).unwrap();
    assert!(first.is_stopped());

    block_on(server.start()).unwrap();
    let second = (*server
        .context()
        .require::<StopSignal>(keys::STOP_SIGNAL)
        .unwrap())
    .clone();
    assert!(!second.is_stopped());
}
