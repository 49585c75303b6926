use std::sync::{Arc, Mutex};

use futures::{future::BoxFuture, FutureExt};
use trellis_di::{Binding, BindingGraph, Context, DynError, Factory};
use trellis_sequence::{
    bind_default_actions, keys, Request, Response, Sequence, SequenceEngine, SequenceError,
};

use crate::signal::{StopHandle, StopSignal};

/// A protocol server owned by an application
///
/// Owns a child context of the application's root. The surrounding
/// application creates and holds server instances; see
/// [crate::Application::add_server].
pub trait Server: Send + Sync + 'static {
    fn start(&self) -> BoxFuture<'_, Result<(), DynError>>;
    fn stop(&self) -> BoxFuture<'_, Result<(), DynError>>;
}

/// Transport-less server: a sequence engine over its own child context
///
/// Units of work come in through [InProcessServer::dispatch] instead of a
/// listener; everything else - per-request contexts, the bound sequence,
/// the stop signal - behaves like a listening server would.
pub struct InProcessServer {
    context: Context,
    engine: SequenceEngine,
    stop: Mutex<Option<StopHandle>>,
}

impl InProcessServer {
    /// Creates the `server.<name>` child context and binds the default
    /// sequence and actions onto it
    pub fn new(parent: &Context, name: &str) -> Arc<InProcessServer> {
        let context = parent.child(format!("server.{name}"));
        bind_default_actions(&context);
        Arc::new(InProcessServer {
            engine: SequenceEngine::new(context.clone()),
            context,
            stop: Mutex::new(None),
        })
    }

    /// The server-scoped context; bind route tables, controllers or action
    /// shadows here
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Replace the sequence binding with a custom pipeline
    pub fn set_sequence<F>(&self)
    where
        F: Factory<Provides = Arc<dyn Sequence>>,
    {
        self.context.bind(Binding::class::<F>(keys::SEQUENCE));
    }

    pub fn is_running(&self) -> bool {
        self.stop.lock().unwrap().is_some()
    }

    /// Handle one unit of work
    pub async fn dispatch(&self, request: Request) -> Result<Response, SequenceError> {
        self.engine.handle(request).await
    }
}

impl Server for InProcessServer {
    fn start(&self) -> BoxFuture<'_, Result<(), DynError>> {
        async move {
            // Unsatisfiable wiring fails the start, not the first request
            BindingGraph::from_context(&self.context).check()?;

            let (handle, signal) = StopSignal::new();
            self.context.bind(Binding::constant(keys::STOP_SIGNAL, signal));
            *self.stop.lock().unwrap() = Some(handle);
            tracing::debug!("{} started", self.context.name());
            Ok(())
        }
        .boxed()
    }

    fn stop(&self) -> BoxFuture<'_, Result<(), DynError>> {
        async move {
            if let Some(handle) = self.stop.lock().unwrap().take() {
                handle.trigger();
                tracing::debug!("{} stopped", self.context.name());
            }
            Ok(())
        }
        .boxed()
    }
}
