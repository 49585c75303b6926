//! Trellis DI - hierarchical binding contexts with uniform sync/async
//! resolution.
//!
//! A [Context] maps string keys to [Binding]s and optionally references a
//! parent context; lookups walk the chain to the nearest definition. A
//! binding is a constant, a class constructed by a [Factory], or a
//! [Provider] whose `value()` computation may be asynchronous. Resolution
//! returns a direct value when the reachable dependency graph is fully
//! synchronous and a shared future otherwise - an async node never blocks a
//! cooperative runtime and is never silently dropped.
//!
//! Deferred [Getter]/[Setter] handles postpone the lookup or write to
//! invocation time. They are the one legal way to reference a key produced
//! later in a scope's lifetime, which is what breaks ordering cycles between
//! pipeline steps built on top of this crate.
//!
//! Trellis DI consists of the following components:
//!
//! 1. Context - the binding registry tree and resolution entry points
//! 2. Binding - key, declared type, scope and production source
//! 3. Factory / Provider - user construction hooks
//! 4. Getter / Setter - deferred handles
//! 5. BindingGraph - wiring-time validation (missing keys, eager cycles)

pub mod binding;
pub mod context;
pub mod deferred;
pub mod errors;
pub mod factory;
pub mod graph;
pub mod injected;
mod resolver;
pub mod types;

pub use binding::{Binding, BindingScope, DependencyRequest, ResolutionMode};
pub use context::Context;
pub use deferred::{Getter, Setter};
pub use errors::{BindError, ResolveError};
pub use factory::{Factory, Provider};
pub use graph::{BindingGraph, GraphError, GraphErrors};
pub use injected::Injected;
pub use types::{DynError, Injectable, Producing, TypeInfo, Value, ValueOrFuture};
