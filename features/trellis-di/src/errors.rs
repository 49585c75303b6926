use std::sync::Arc;

use thiserror::Error;

use crate::{binding::ResolutionMode, types::DynError};

/// Errors when registering a binding
#[derive(Error, Debug, Clone)]
pub enum BindError {
    /// The key is already bound at this context level (strict mode only)
    #[error("'{key}' is already bound in context '{context}'")]
    Duplicate { key: String, context: String },
}

/// Errors when resolving a binding key
///
/// All variants are Clone so cached resolutions can hand the same error to
/// every waiter.
#[derive(Error, Debug, Clone)]
pub enum ResolveError {
    /// The key is not bound anywhere in the context chain
    #[error("'{key}' is not bound in context '{context}' or any of its ancestors")]
    NotFound { key: String, context: String },

    /// Eager resolution revisited a key currently being resolved
    #[error("circular dependency through [{}] - break one edge with a deferred getter", chain.join(" -> "))]
    Cycle { chain: Vec<String> },

    /// A constructor or provider computation failed
    #[error("producing '{key}' failed: {error}")]
    Production { key: String, error: Arc<DynError> },

    /// The value bound under the key is not of the requested type
    #[error("'{key}' holds '{actual}' but '{expected}' was requested")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// The dependency graph below the key contains an asynchronous provider
    #[error("'{key}' needs an asynchronous provider - use the async resolution contract")]
    RequiresAsync { key: String },

    /// A dependency slot was accessed with a different mode than declared
    #[error("'{key}' was declared as {declared:?} but accessed as {accessed:?}")]
    ModeMismatch {
        key: String,
        declared: ResolutionMode,
        accessed: ResolutionMode,
    },

    /// The accessed key is not among the declared dependency slots
    #[error("'{key}' is not among the declared dependencies")]
    UndeclaredDependency { key: String },
}

impl ResolveError {
    pub(crate) fn production(key: &str, error: DynError) -> ResolveError {
        ResolveError::Production {
            key: key.into(),
            error: Arc::new(error),
        }
    }
}
