//! Minimal end-to-end assembly: a component with a provider and a
//! controller, a route table, one in-process server, two requests.

use std::sync::Arc;

use futures::{executor::block_on, future::BoxFuture, FutureExt};
use serde_json::{json, Value as JsonValue};
use trellis::{
    keys, Application, Args, Binding, Component, Controller, ControllerRegistration,
    DependencyRequest, DynError, Factory, Injected, InProcessServer, Producing, Provider, Request,
    Route, RouteTable, Router,
};

/// Provides the greeting prefix, as if it came from somewhere slow
struct PrefixProvider {
    app_name: Arc<String>,
}

impl Factory for PrefixProvider {
    type Provides = PrefixProvider;

    fn dependencies() -> Vec<DependencyRequest> {
        vec![DependencyRequest::direct("greeter.app_name")]
    }

    fn create(deps: Injected) -> Result<PrefixProvider, DynError> {
        Ok(PrefixProvider {
            app_name: deps.value::<String>("greeter.app_name")?,
        })
    }
}

impl Provider for PrefixProvider {
    type Out = String;

    fn value(&self) -> Producing<String> {
        let app_name = self.app_name.clone();
        Producing::Deferred(async move { Ok(format!("[{app_name}] hello")) }.boxed())
    }
}

struct GreetController {
    prefix: Arc<String>,
}

impl Controller for GreetController {
    fn call<'a>(
        &'a self,
        _operation: &'a str,
        args: Args,
    ) -> BoxFuture<'a, Result<JsonValue, DynError>> {
        async move {
            let name = args.0.first().and_then(|v| v.as_str()).unwrap_or("world");
            Ok(json!(format!("{} {}", self.prefix, name)))
        }
        .boxed()
    }
}

struct GreetControllerFactory;
impl Factory for GreetControllerFactory {
    type Provides = Arc<dyn Controller>;

    fn dependencies() -> Vec<DependencyRequest> {
        vec![DependencyRequest::direct("greeter.prefix")]
    }

    fn create(deps: Injected) -> Result<Self::Provides, DynError> {
        Ok(Arc::new(GreetController {
            prefix: deps.value::<String>("greeter.prefix")?,
        }))
    }
}

struct GreeterComponent;

impl Factory for GreeterComponent {
    type Provides = GreeterComponent;

    fn dependencies() -> Vec<DependencyRequest> {
        Vec::new()
    }

    fn create(_deps: Injected) -> Result<GreeterComponent, DynError> {
        Ok(GreeterComponent)
    }
}

impl Component for GreeterComponent {
    fn controllers(&self) -> Vec<ControllerRegistration> {
        vec![ControllerRegistration::of::<GreetControllerFactory>("greet")]
    }

    fn providers(&self) -> Vec<Binding> {
        vec![Binding::provider::<PrefixProvider>("greeter.prefix")]
    }
}

fn main() {
    let app = Application::new();
    app.context()
        .bind(Binding::constant("greeter.app_name", "greeter".to_string()));

    block_on(app.mount::<GreeterComponent>()).expect("mount failed");

    let server = InProcessServer::new(app.context(), "main");
    let router: Arc<dyn Router> = Arc::new(RouteTable::new().with(
        "GET",
        "/greet",
        Route::new(keys::controller("greet"), "greet").with_args(&["name"]),
    ));
    server.context().bind(Binding::constant(keys::ROUTER, router));
    app.add_server("main", server.clone());

    block_on(app.start()).expect("start failed");

    let ok = block_on(server.dispatch(Request::new("GET", "/greet").with_param("name", json!("ada"))));
    println!("{:?}", ok);

    let rejected = block_on(server.dispatch(Request::new("GET", "/missing")));
    println!("{:?}", rejected);

    block_on(app.stop()).expect("stop failed");
}
