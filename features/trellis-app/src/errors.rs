use thiserror::Error;

use trellis_di::{DynError, GraphErrors, ResolveError};

/// Errors while mounting a component
#[derive(Error, Debug)]
pub enum MountError {
    /// The component instance could not be constructed; nothing was
    /// registered
    #[error("mounting '{component}' failed: {error}")]
    Component {
        component: &'static str,
        error: ResolveError,
    },
}

/// Errors during application startup or shutdown
#[derive(Error, Debug)]
pub enum LifecycleError {
    /// The binding graph is unsatisfiable; nothing was started
    #[error(transparent)]
    Wiring(#[from] GraphErrors),

    /// A server failed to start or stop
    #[error("server '{name}' failed: {error}")]
    Server { name: String, error: DynError },
}
