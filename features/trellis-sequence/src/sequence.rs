//! The pipeline itself: an ordered set of actions handling one unit of
//! work, each action resolved from the per-request context.
//!
//! Actions resolve in a first phase, before any of them runs; values an
//! action needs from a sibling that has not run yet must come through a
//! deferred getter, invoked only after the producer's turn. The default
//! pipeline also writes every element it produces back into the request
//! context under the [crate::keys] element keys, so custom actions can
//! reach them without changing the built-in steps.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use futures::{future::BoxFuture, FutureExt};
use trellis_di::{Binding, Context, DependencyRequest, DynError, Factory, Injected};

use crate::{
    actions::{
        DefaultFindRouteFactory, DefaultInvokeFactory, DefaultParseArgsFactory,
        DefaultRejectFactory, DefaultSendFactory, FindRoute, InvokeMethod, ParseArgs, Reject,
        SendResponse,
    },
    contracts::{Request, Response},
    errors::SequenceError,
    keys,
    scope::{Phase, RequestScope},
};

/// The ordered pipeline handling one unit of work
pub trait Sequence: Send + Sync {
    fn handle<'a>(
        &'a self,
        scope: &'a RequestScope,
        request: Request,
    ) -> BoxFuture<'a, Result<Response, SequenceError>>;
}

/// Built-in pipeline: find-route, parse-args, invoke, send
///
/// Any action error transitions to the reject action instead of proceeding;
/// the transport never sees a raw failure. A custom Sequence replaces this
/// binding wholesale and may declare additional actions as further
/// dependencies, invoking them wherever its control logic chooses.
pub struct DefaultSequence {
    find_route: Arc<dyn FindRoute>,
    parse_args: Arc<dyn ParseArgs>,
    invoke: Arc<dyn InvokeMethod>,
    send: Arc<dyn SendResponse>,
    reject: Arc<dyn Reject>,
}

impl DefaultSequence {
    async fn run(&self, scope: &RequestScope, request: &Request) -> Result<Response, DynError> {
        let ctx = scope.context();

        let route = self.find_route.find_route(request)?;
        ctx.bind(Binding::constant(keys::ROUTE, route.clone()));
        scope.advance(Phase::RouteResolved);

        let args = self.parse_args.parse_args(request, &route)?;
        ctx.bind(Binding::constant(keys::ARGS, args.clone()));
        scope.advance(Phase::ArgsParsed);

        let result = self.invoke.invoke(scope, &route, args).await?;
        ctx.bind(Binding::constant(keys::RESULT, result.clone()));
        scope.advance(Phase::Invoked);

        self.send.send(scope, result)
    }
}

impl Sequence for DefaultSequence {
    fn handle<'a>(
        &'a self,
        scope: &'a RequestScope,
        request: Request,
    ) -> BoxFuture<'a, Result<Response, SequenceError>> {
        async move {
            match self.run(scope, &request).await {
                Ok(response) => Ok(response),
                Err(error) => reject_with(self.reject.as_ref(), scope, error),
            }
        }
        .boxed()
    }
}

/// Route an action failure to the reject action
///
/// Terminal-guard violations pass through unchanged: they are contract
/// errors, not unit-of-work failures, and feeding them back into reject
/// would trip the guard a second time.
pub fn reject_with(
    reject: &dyn Reject,
    scope: &RequestScope,
    error: DynError,
) -> Result<Response, SequenceError> {
    if let Some(SequenceError::AlreadyTerminated) = error.downcast_ref::<SequenceError>() {
        return Err(SequenceError::AlreadyTerminated);
    }

    scope.advance(Phase::Errored);
    tracing::debug!("{}: action failed: {}", scope.context().name(), error);

    let response = match reject.reject(scope, error) {
        Ok(response) => response,
        Err(error) => {
            return Err(match error.downcast::<SequenceError>() {
                Ok(sequence_error) => *sequence_error,
                Err(error) => SequenceError::Reject(error),
            })
        }
    };
    scope.advance(Phase::Rejected);
    Ok(response)
}

pub struct DefaultSequenceFactory;
impl Factory for DefaultSequenceFactory {
    type Provides = Arc<dyn Sequence>;

    fn dependencies() -> Vec<DependencyRequest> {
        vec![
            DependencyRequest::direct(keys::FIND_ROUTE),
            DependencyRequest::direct(keys::PARSE_ARGS),
            DependencyRequest::direct(keys::INVOKE),
            DependencyRequest::direct(keys::SEND),
            DependencyRequest::direct(keys::REJECT),
        ]
    }

    fn create(deps: Injected) -> Result<Self::Provides, DynError> {
        Ok(Arc::new(DefaultSequence {
            find_route: deps.cloned::<Arc<dyn FindRoute>>(keys::FIND_ROUTE)?,
            parse_args: deps.cloned::<Arc<dyn ParseArgs>>(keys::PARSE_ARGS)?,
            invoke: deps.cloned::<Arc<dyn InvokeMethod>>(keys::INVOKE)?,
            send: deps.cloned::<Arc<dyn SendResponse>>(keys::SEND)?,
            reject: deps.cloned::<Arc<dyn Reject>>(keys::REJECT)?,
        }))
    }
}

/// Bind the default sequence and actions onto a context
///
/// Everything is transient: actions resolve fresh per unit of work, so an
/// action may hold unit-scoped state without leaking across concurrent
/// units. Shadow any key afterwards to customize.
pub fn bind_default_actions(context: &Context) {
    context.bind(Binding::class::<DefaultSequenceFactory>(keys::SEQUENCE));
    context.bind(Binding::class::<DefaultFindRouteFactory>(keys::FIND_ROUTE));
    context.bind(Binding::class::<DefaultParseArgsFactory>(keys::PARSE_ARGS));
    context.bind(Binding::class::<DefaultInvokeFactory>(keys::INVOKE));
    context.bind(Binding::class::<DefaultSendFactory>(keys::SEND));
    context.bind(Binding::class::<DefaultRejectFactory>(keys::REJECT));
}

/// Creates the per-request child context and runs the bound sequence
pub struct SequenceEngine {
    parent: Context,
    counter: AtomicU64,
}

impl SequenceEngine {
    pub fn new(parent: Context) -> SequenceEngine {
        SequenceEngine {
            parent,
            counter: AtomicU64::new(0),
        }
    }

    pub fn parent(&self) -> &Context {
        &self.parent
    }

    /// Handle one unit of work in a dedicated child context
    pub async fn handle(&self, request: Request) -> Result<Response, SequenceError> {
        let id = self.counter.fetch_add(1, Ordering::Relaxed);
        let scope = RequestScope::new(self.parent.child(format!("request-{id}")));
        scope
            .context()
            .bind(Binding::constant(keys::REQUEST, request.clone()));

        tracing::debug!("request-{id}: {} {}", request.method, request.path);

        // Phase 1: resolve the pipeline (and with it, every action's
        // non-deferred dependency). Phase 2: execute.
        let sequence = scope
            .context()
            .get::<Arc<dyn Sequence>>(keys::SEQUENCE)
            .await?;
        sequence.handle(&scope, request).await
    }
}
