use std::{
    any::{Any, TypeId},
    sync::Arc,
};

use futures::{
    future::{BoxFuture, Shared},
    FutureExt,
};

use crate::errors::ResolveError;

/// Boxed error for constructor and provider failures
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// We assume that a multithreaded async runtime may drive resolution,
/// so anything injectable needs to be Send + Sync + 'static.
pub trait Injectable: Send + Sync + 'static {}
impl<T: Send + Sync + 'static> Injectable for T {}

/// Type name and type id of a bound value
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct TypeInfo {
    pub type_name: &'static str,
    pub type_id: TypeId,
}
impl std::fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}
impl TypeInfo {
    pub fn of<T: 'static + ?Sized>() -> TypeInfo {
        TypeInfo {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }
}

/// A resolved value, tagged with the type it was produced as
#[derive(Clone)]
pub struct Value {
    pub info: TypeInfo,
    value: Arc<dyn Any + Send + Sync>,
}

impl Value {
    pub fn new<T: Injectable>(value: T) -> Self {
        Value {
            info: TypeInfo::of::<T>(),
            value: Arc::new(value),
        }
    }

    /// On failure returns the name of the type actually held
    pub fn downcast<T: Injectable>(&self) -> Result<Arc<T>, &'static str> {
        match Arc::downcast::<T>(self.value.clone()) {
            Ok(downcasted) => Ok(downcasted),
            Err(_) => Err(self.info.type_name),
        }
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Value").field(&self.info.type_name).finish()
    }
}

/// A resolution future any number of callers can await
pub type SharedResolution = Shared<BoxFuture<'static, Result<Value, ResolveError>>>;

/// Result of resolving a binding key
///
/// `Value` only when the entire reachable dependency graph is synchronous;
/// as soon as one node is asynchronous the whole resolution is a future.
#[derive(Clone)]
pub enum ValueOrFuture {
    Value(Value),
    Future(SharedResolution),
}

impl ValueOrFuture {
    pub(crate) fn deferred(
        future: BoxFuture<'static, Result<Value, ResolveError>>,
    ) -> ValueOrFuture {
        ValueOrFuture::Future(future.shared())
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ValueOrFuture::Value(_))
    }

    /// Await the resolution, whichever shape it has
    pub async fn resolved(self) -> Result<Value, ResolveError> {
        match self {
            ValueOrFuture::Value(value) => Ok(value),
            ValueOrFuture::Future(future) => future.await,
        }
    }

    /// Take the value without awaiting
    ///
    /// Succeeds exactly when the resolution completes without suspending:
    /// direct values, warm caches, and deferred computations that finish on
    /// their first poll. Anything that actually suspends fails with
    /// [ResolveError::RequiresAsync]; a synchronous caller must never block
    /// a cooperative runtime waiting for it.
    pub fn now(self, key: &str) -> Result<Value, ResolveError> {
        match self {
            ValueOrFuture::Value(value) => Ok(value),
            ValueOrFuture::Future(future) => match future.now_or_never() {
                Some(result) => result,
                None => Err(ResolveError::RequiresAsync { key: key.into() }),
            },
        }
    }
}

/// Output of a provider computation
///
/// A deferred computation must own everything it needs; clone injected
/// dependencies into the future rather than borrowing from the provider.
pub enum Producing<T> {
    Ready(Result<T, DynError>),
    Deferred(BoxFuture<'static, Result<T, DynError>>),
}

impl<T> Producing<T> {
    pub fn ok(value: T) -> Producing<T> {
        Producing::Ready(Ok(value))
    }
}
