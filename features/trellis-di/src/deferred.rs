use std::{marker::PhantomData, sync::Arc};

use crate::{binding::Binding, context::Context, errors::ResolveError, types::Injectable};

/// Deferred lookup handle for a binding key
///
/// Resolution happens when [Getter::get] is invoked, not when the handle is
/// injected, so the handle tolerates the key appearing only later in the
/// origin context's lifetime. Invoked before the key is ever written it
/// fails with [ResolveError::NotFound].
///
/// The container enforces no ordering between the producer of the key and
/// this handle; invoke it only after program logic guarantees the producer
/// has run.
pub struct Getter<T: Injectable> {
    origin: Context,
    key: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Injectable> Clone for Getter<T> {
    fn clone(&self) -> Self {
        Getter {
            origin: self.origin.clone(),
            key: self.key.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Injectable> Getter<T> {
    pub(crate) fn new(origin: Context, key: String) -> Getter<T> {
        Getter {
            origin,
            key,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Perform the lookup now
    pub async fn get(&self) -> Result<Arc<T>, ResolveError> {
        self.origin.get::<T>(&self.key).await
    }

    /// Perform the lookup now, without awaiting
    ///
    /// Fails with [ResolveError::RequiresAsync] when the key's dependency
    /// graph contains an asynchronous provider.
    pub fn require(&self) -> Result<Arc<T>, ResolveError> {
        self.origin.require::<T>(&self.key)
    }
}

impl<T: Injectable> std::fmt::Debug for Getter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Getter").field(&self.key).finish()
    }
}

/// Deferred write handle for a binding key
///
/// Invoking [Setter::set] binds a constant on the origin context - never its
/// parents - making the value visible to any later lookup for the key in
/// that scope.
pub struct Setter<T: Injectable> {
    origin: Context,
    key: String,
    _marker: PhantomData<fn(T)>,
}

impl<T: Injectable> Clone for Setter<T> {
    fn clone(&self) -> Self {
        Setter {
            origin: self.origin.clone(),
            key: self.key.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Injectable> Setter<T> {
    pub(crate) fn new(origin: Context, key: String) -> Setter<T> {
        Setter {
            origin,
            key,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Write the value; last write wins within the origin context
    pub fn set(&self, value: T) {
        self.origin.bind(Binding::constant(self.key.clone(), value));
    }
}

impl<T: Injectable> std::fmt::Debug for Setter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Setter").field(&self.key).finish()
    }
}
