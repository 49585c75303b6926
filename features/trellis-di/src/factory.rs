use std::marker::PhantomData;

use futures::{future::BoxFuture, FutureExt};

use crate::{
    binding::DependencyRequest,
    injected::Injected,
    types::{DynError, Injectable, Producing, TypeInfo, Value},
};

/// A factory providing instances of its product type
///
/// Registered as a class binding. The factory is usually a unit struct kept
/// separate from the product, which lets the product be a trait object
/// (`type Provides = Arc<dyn Action>`) just as well as a concrete type.
pub trait Factory: Send + Sync + 'static {
    type Provides: Injectable;

    /// TypeInfo of the product
    fn supplies() -> TypeInfo {
        TypeInfo::of::<Self::Provides>()
    }

    /// Dependency slots the factory requires, resolved relative to the
    /// context the binding is defined in
    fn dependencies() -> Vec<DependencyRequest>;

    /// Constructs the product from the resolved slots
    fn create(deps: Injected) -> Result<Self::Provides, DynError>;
}

/// An injectable object whose sole externally visible behaviour is producing
/// a value, possibly asynchronously
///
/// The provider itself is constructed like any class; constructor parameters
/// are injectable keys.
pub trait Provider: Injectable {
    type Out: Injectable;

    /// Compute the provided value
    fn value(&self) -> Producing<Self::Out>;
}

/// Object-safe wrapper over [Factory], allowing dynamic dispatch
pub(crate) trait DynFactory: Send + Sync {
    fn supplies(&self) -> TypeInfo;
    fn dependencies(&self) -> Vec<DependencyRequest>;
    fn create(&self, deps: Injected) -> Result<Value, DynError>;
}

pub(crate) struct ClassFactory<F>(PhantomData<fn() -> F>);

impl<F> ClassFactory<F> {
    pub(crate) fn new() -> Self {
        ClassFactory(PhantomData)
    }
}

impl<F: Factory> DynFactory for ClassFactory<F> {
    fn supplies(&self) -> TypeInfo {
        F::supplies()
    }

    fn dependencies(&self) -> Vec<DependencyRequest> {
        F::dependencies()
    }

    fn create(&self, deps: Injected) -> Result<Value, DynError> {
        F::create(deps).map(Value::new)
    }
}

/// What a provider binding produced: a value, or the provider's still-running
/// computation
pub(crate) enum Produced {
    Ready(Value),
    Deferred(BoxFuture<'static, Result<Value, DynError>>),
}

/// Object-safe wrapper constructing a provider and invoking its computation
pub(crate) trait DynProvider: Send + Sync {
    fn provider_info(&self) -> TypeInfo;
    fn supplies(&self) -> TypeInfo;
    fn dependencies(&self) -> Vec<DependencyRequest>;
    fn produce(&self, deps: Injected) -> Result<Produced, DynError>;
}

pub(crate) struct ProviderFactory<F>(PhantomData<fn() -> F>);

impl<F> ProviderFactory<F> {
    pub(crate) fn new() -> Self {
        ProviderFactory(PhantomData)
    }
}

impl<F> DynProvider for ProviderFactory<F>
where
    F: Factory,
    F::Provides: Provider,
{
    fn provider_info(&self) -> TypeInfo {
        TypeInfo::of::<F::Provides>()
    }

    fn supplies(&self) -> TypeInfo {
        TypeInfo::of::<<F::Provides as Provider>::Out>()
    }

    fn dependencies(&self) -> Vec<DependencyRequest> {
        F::dependencies()
    }

    fn produce(&self, deps: Injected) -> Result<Produced, DynError> {
        let provider = F::create(deps)?;
        match provider.value() {
            Producing::Ready(result) => result.map(Value::new).map(Produced::Ready),
            Producing::Deferred(future) => Ok(Produced::Deferred(
                async move { future.await.map(Value::new) }.boxed(),
            )),
        }
    }
}
