//! Built-in pipeline actions and their contracts.
//!
//! Every action is an ordinary binding (`Arc<dyn …>` product of a
//! [Factory]), resolved per unit of work from the request-scoped context.
//! Shadow a key from [crate::keys] to replace an action without touching
//! the others.

use std::sync::Arc;

use futures::{future::BoxFuture, FutureExt};
use serde_json::Value as JsonValue;
use thiserror::Error;
use trellis_di::{DependencyRequest, DynError, Factory, Injected, ResolveError};

use crate::{
    contracts::{Args, Request, Response, Route},
    keys,
    router::Router,
    scope::{Phase, RequestScope},
};

/// Route lookup step
pub trait FindRoute: Send + Sync {
    fn find_route(&self, request: &Request) -> Result<Route, DynError>;
}

/// Argument extraction step
pub trait ParseArgs: Send + Sync {
    fn parse_args(&self, request: &Request, route: &Route) -> Result<Args, DynError>;
}

/// Controller invocation step
pub trait InvokeMethod: Send + Sync {
    fn invoke<'a>(
        &'a self,
        scope: &'a RequestScope,
        route: &'a Route,
        args: Args,
    ) -> BoxFuture<'a, Result<JsonValue, DynError>>;
}

/// Success terminal step; must call [RequestScope::terminate]
pub trait SendResponse: Send + Sync {
    fn send(&self, scope: &RequestScope, result: JsonValue) -> Result<Response, DynError>;
}

/// Failure terminal step; must call [RequestScope::terminate]
///
/// The response it builds is the only failure representation the transport
/// ever sees.
pub trait Reject: Send + Sync {
    fn reject(&self, scope: &RequestScope, error: DynError) -> Result<Response, DynError>;
}

/// Operation endpoint behind a controller binding
pub trait Controller: Send + Sync {
    fn call<'a>(
        &'a self,
        operation: &'a str,
        args: Args,
    ) -> BoxFuture<'a, Result<JsonValue, DynError>>;
}

#[derive(Error, Debug)]
#[error("no route for {method} {path}")]
pub struct NoRouteMatch {
    pub method: String,
    pub path: String,
}

#[derive(Error, Debug)]
#[error("request has no value for argument '{name}'")]
pub struct MissingArgument {
    pub name: String,
}

// ###################################################################
// Default implementations

/// Asks the injected router collaborator
pub struct DefaultFindRoute {
    router: Arc<dyn Router>,
}

impl FindRoute for DefaultFindRoute {
    fn find_route(&self, request: &Request) -> Result<Route, DynError> {
        match self.router.route(request) {
            Some(route) => {
                tracing::debug!("matched {} {} -> {}", request.method, request.path, route.controller);
                Ok(route)
            }
            None => Err(Box::new(NoRouteMatch {
                method: request.method.clone(),
                path: request.path.clone(),
            })),
        }
    }
}

pub struct DefaultFindRouteFactory;
impl Factory for DefaultFindRouteFactory {
    type Provides = Arc<dyn FindRoute>;

    fn dependencies() -> Vec<DependencyRequest> {
        vec![DependencyRequest::direct(keys::ROUTER)]
    }

    fn create(deps: Injected) -> Result<Self::Provides, DynError> {
        let router = deps.cloned::<Arc<dyn Router>>(keys::ROUTER)?;
        Ok(Arc::new(DefaultFindRoute { router }))
    }
}

/// Pulls the route's named arguments from request params, then body fields
///
/// Schema validation is an external concern; absent arguments fail, present
/// ones pass through untouched.
pub struct DefaultParseArgs;

impl ParseArgs for DefaultParseArgs {
    fn parse_args(&self, request: &Request, route: &Route) -> Result<Args, DynError> {
        let mut args = Vec::with_capacity(route.args.len());
        for name in &route.args {
            let value = request.params.get(name).cloned().or_else(|| {
                request
                    .body
                    .as_ref()
                    .and_then(|body| body.get(name))
                    .cloned()
            });
            match value {
                Some(value) => args.push(value),
                None => return Err(Box::new(MissingArgument { name: name.clone() })),
            }
        }
        Ok(Args(args))
    }
}

pub struct DefaultParseArgsFactory;
impl Factory for DefaultParseArgsFactory {
    type Provides = Arc<dyn ParseArgs>;

    fn dependencies() -> Vec<DependencyRequest> {
        Vec::new()
    }

    fn create(_deps: Injected) -> Result<Self::Provides, DynError> {
        Ok(Arc::new(DefaultParseArgs))
    }
}

/// Resolves the matched controller from the request scope and calls it
pub struct DefaultInvoke;

impl InvokeMethod for DefaultInvoke {
    fn invoke<'a>(
        &'a self,
        scope: &'a RequestScope,
        route: &'a Route,
        args: Args,
    ) -> BoxFuture<'a, Result<JsonValue, DynError>> {
        async move {
            let controller = scope
                .context()
                .get::<Arc<dyn Controller>>(&route.controller)
                .await?;
            controller.call(&route.operation, args).await
        }
        .boxed()
    }
}

pub struct DefaultInvokeFactory;
impl Factory for DefaultInvokeFactory {
    type Provides = Arc<dyn InvokeMethod>;

    fn dependencies() -> Vec<DependencyRequest> {
        Vec::new()
    }

    fn create(_deps: Injected) -> Result<Self::Provides, DynError> {
        Ok(Arc::new(DefaultInvoke))
    }
}

/// Wraps the invocation result in a 200 response
pub struct DefaultSend;

impl SendResponse for DefaultSend {
    fn send(&self, scope: &RequestScope, result: JsonValue) -> Result<Response, DynError> {
        scope.terminate()?;
        scope.advance(Phase::Responded);
        Ok(Response::ok(result))
    }
}

pub struct DefaultSendFactory;
impl Factory for DefaultSendFactory {
    type Provides = Arc<dyn SendResponse>;

    fn dependencies() -> Vec<DependencyRequest> {
        Vec::new()
    }

    fn create(_deps: Injected) -> Result<Self::Provides, DynError> {
        Ok(Arc::new(DefaultSend))
    }
}

/// Maps the failure to a status code and an error body
pub struct DefaultReject;

impl DefaultReject {
    fn status_for(error: &DynError) -> u16 {
        if error.downcast_ref::<NoRouteMatch>().is_some() {
            return 404;
        }
        if let Some(ResolveError::NotFound { .. }) = error.downcast_ref::<ResolveError>() {
            return 404;
        }
        if error.downcast_ref::<MissingArgument>().is_some() {
            return 400;
        }
        500
    }
}

impl Reject for DefaultReject {
    fn reject(&self, scope: &RequestScope, error: DynError) -> Result<Response, DynError> {
        scope.terminate()?;
        let status = Self::status_for(&error);
        tracing::debug!("{}: rejected with {}: {}", scope.context().name(), status, error);
        Ok(Response::error(status, error.to_string()))
    }
}

pub struct DefaultRejectFactory;
impl Factory for DefaultRejectFactory {
    type Provides = Arc<dyn Reject>;

    fn dependencies() -> Vec<DependencyRequest> {
        Vec::new()
    }

    fn create(_deps: Injected) -> Result<Self::Provides, DynError> {
        Ok(Arc::new(DefaultReject))
    }
}
