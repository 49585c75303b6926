//! Trellis - a hierarchical dependency-injection container with an ordered,
//! extensible request pipeline on top.
//!
//! The pieces live in three feature crates, re-exported here:
//!
//! 1. `trellis-di` - contexts, bindings, the resolver and deferred handles
//! 2. `trellis-sequence` - the per-request pipeline and its built-in actions
//! 3. `trellis-app` - applications, components, servers and lifecycle
//!
//! ```no_run
//! use std::sync::Arc;
//! use trellis::{Application, Binding, InProcessServer, RouteTable, Router, keys};
//!
//! # async fn assemble() {
//! let app = Application::new();
//! let server = InProcessServer::new(app.context(), "main");
//! let router: Arc<dyn Router> = Arc::new(RouteTable::new());
//! server.context().bind(Binding::constant(keys::ROUTER, router));
//! app.add_server("main", server);
//! app.start().await.unwrap();
//! # }
//! ```

pub use trellis_di::{
    BindError, Binding, BindingGraph, BindingScope, Context, DependencyRequest, DynError, Factory,
    Getter, GraphError, GraphErrors, Injectable, Injected, Producing, Provider, ResolutionMode,
    ResolveError, Setter, TypeInfo, Value, ValueOrFuture,
};

pub use trellis_sequence::keys;
pub use trellis_sequence::{
    bind_default_actions, reject_with, Args, Controller, DefaultSequence, FindRoute, InvokeMethod,
    MissingArgument, NoRouteMatch, ParseArgs, Phase, Reject, Request, RequestScope, Response,
    Route, RouteTable, Router, SendResponse, Sequence, SequenceEngine, SequenceError,
};

pub use trellis_app::{
    Application, Component, ContributesRepositories, ControllerRegistration, InProcessServer,
    LifecycleError, MountError, MountHook, RepositoryMountHook, Server, StopHandle, StopSignal,
};
