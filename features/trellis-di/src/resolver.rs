//! The resolution algorithm.
//!
//! Lookup walks the requesting context's parent chain to the nearest
//! definition. Constructor dependencies resolve relative to the context the
//! binding is *defined* in; deferred handles capture the context the
//! top-level resolution *started* from. Everything up to awaiting an
//! asynchronous provider happens on the caller's stack, which is what makes
//! eager cycle detection possible.

use futures::FutureExt;

use crate::{
    binding::{Binding, BindingScope, BindingSource, DependencyRequest, ResolutionMode},
    context::Context,
    errors::ResolveError,
    factory::Produced,
    injected::{Injected, Slot},
    types::{SharedResolution, Value, ValueOrFuture},
};

use std::sync::Arc;

/// One in-flight resolution chain
///
/// Carries the origin context for deferred handles and the call-stack of
/// keys currently being resolved.
#[derive(Clone)]
struct Session {
    origin: Context,
    path: Vec<String>,
}

impl Session {
    fn root(origin: &Context) -> Session {
        Session {
            origin: origin.clone(),
            path: Vec::new(),
        }
    }

    fn descend(&self, key: &str) -> Session {
        let mut path = self.path.clone();
        path.push(key.to_string());
        Session {
            origin: self.origin.clone(),
            path,
        }
    }
}

pub(crate) fn resolve(context: &Context, key: &str) -> Result<ValueOrFuture, ResolveError> {
    resolve_in(context, key, &Session::root(context))
}

fn resolve_in(base: &Context, key: &str, session: &Session) -> Result<ValueOrFuture, ResolveError> {
    // Cycle check before anything else. A cached slot must never be polled
    // re-entrantly from inside its own construction.
    if session.path.iter().any(|entry| entry == key) {
        let mut chain = session.path.clone();
        chain.push(key.to_string());
        return Err(ResolveError::Cycle { chain });
    }

    let Some((owning, binding)) = base.find(key) else {
        return Err(ResolveError::NotFound {
            key: key.into(),
            context: base.name().into(),
        });
    };

    let cache_in = match binding.scope() {
        BindingScope::Transient => None,
        BindingScope::Singleton => Some(owning.clone()),
        BindingScope::Context => Some(base.clone()),
    };
    let session = session.descend(key);

    let Some(cache_ctx) = cache_in else {
        return produce(&owning, &binding, &session);
    };

    // Install-or-reuse a shared slot under the cache lock. The construction
    // body runs on first poll, after the lock is released, so recursive
    // resolution never re-enters the lock. Concurrent first access awaits
    // the same slot: at most one construction, even for a failing one.
    let slot: SharedResolution = {
        let mut cache = cache_ctx.0.cache.lock().unwrap();
        match cache.get(key) {
            Some(slot) => {
                tracing::debug!("cache hit for '{}' in context '{}'", key, cache_ctx.name());
                slot.clone()
            }
            None => {
                let owning = owning.clone();
                let binding = binding.clone();
                let session = session.clone();
                let slot = async move {
                    match produce(&owning, &binding, &session)? {
                        ValueOrFuture::Value(value) => Ok(value),
                        ValueOrFuture::Future(future) => future.await,
                    }
                }
                .boxed()
                .shared();
                cache.insert(key.to_string(), slot.clone());
                slot
            }
        }
    };

    // A completed slot keeps the synchronous contract intact
    match slot.clone().now_or_never() {
        Some(Ok(value)) => Ok(ValueOrFuture::Value(value)),
        Some(Err(error)) => Err(error),
        None => Ok(ValueOrFuture::Future(slot)),
    }
}

/// Run a binding's producer, dependencies first
fn produce(
    owning: &Context,
    binding: &Arc<Binding>,
    session: &Session,
) -> Result<ValueOrFuture, ResolveError> {
    let key = binding.key();
    match &binding.source {
        BindingSource::Constant(value) => Ok(ValueOrFuture::Value(value.clone())),

        BindingSource::Class(factory) => {
            tracing::debug!("constructing '{}' in context '{}'", key, owning.name());
            match resolve_dependencies(owning, factory.dependencies(), session)? {
                Deps::Ready(injected) => factory
                    .create(injected)
                    .map(ValueOrFuture::Value)
                    .map_err(|error| ResolveError::production(key, error)),
                Deps::Pending(deps) => {
                    let factory = factory.clone();
                    let key = key.to_string();
                    Ok(ValueOrFuture::deferred(
                        async move {
                            let injected = deps.await?;
                            factory
                                .create(injected)
                                .map_err(|error| ResolveError::production(&key, error))
                        }
                        .boxed(),
                    ))
                }
            }
        }

        BindingSource::Provider(provider) => {
            tracing::debug!(
                "constructing provider '{}' for '{}' in context '{}'",
                provider.provider_info(),
                key,
                owning.name()
            );
            match resolve_dependencies(owning, provider.dependencies(), session)? {
                Deps::Ready(injected) => {
                    match provider
                        .produce(injected)
                        .map_err(|error| ResolveError::production(key, error))?
                    {
                        Produced::Ready(value) => Ok(ValueOrFuture::Value(value)),
                        Produced::Deferred(future) => {
                            let key = key.to_string();
                            Ok(ValueOrFuture::deferred(
                                async move {
                                    future
                                        .await
                                        .map_err(|error| ResolveError::production(&key, error))
                                }
                                .boxed(),
                            ))
                        }
                    }
                }
                Deps::Pending(deps) => {
                    let provider = provider.clone();
                    let key = key.to_string();
                    Ok(ValueOrFuture::deferred(
                        async move {
                            let injected = deps.await?;
                            match provider
                                .produce(injected)
                                .map_err(|error| ResolveError::production(&key, error))?
                            {
                                Produced::Ready(value) => Ok(value),
                                Produced::Deferred(future) => future
                                    .await
                                    .map_err(|error| ResolveError::production(&key, error)),
                            }
                        }
                        .boxed(),
                    ))
                }
            }
        }
    }
}

enum EagerSlot {
    Value(Value),
    Future(SharedResolution),
    Handle(Context),
    Missing,
}

enum Deps {
    Ready(Injected),
    Pending(futures::future::BoxFuture<'static, Result<Injected, ResolveError>>),
}

/// Resolve the declared dependency slots of a constructor
///
/// Every slot resolves eagerly on this stack; only *awaiting* asynchronous
/// results is deferred. Deferred handles never touch the target key's
/// binding and never extend the resolution path.
fn resolve_dependencies(
    base: &Context,
    requests: Vec<DependencyRequest>,
    session: &Session,
) -> Result<Deps, ResolveError> {
    let mut slots = Vec::with_capacity(requests.len());
    let mut pending = false;

    for request in requests {
        let slot = match request.mode {
            ResolutionMode::Getter | ResolutionMode::Setter => {
                EagerSlot::Handle(session.origin.clone())
            }
            ResolutionMode::Direct => match resolve_in(base, &request.key, session) {
                Ok(ValueOrFuture::Value(value)) => EagerSlot::Value(value),
                Ok(ValueOrFuture::Future(future)) => {
                    pending = true;
                    EagerSlot::Future(future)
                }
                // Only the slot's own key being unbound makes it absent; a
                // nested lookup failure still propagates
                Err(ResolveError::NotFound { ref key, .. })
                    if request.optional && *key == request.key =>
                {
                    EagerSlot::Missing
                }
                Err(error) => return Err(error),
            },
        };
        slots.push((request, slot));
    }

    if !pending {
        let slots = slots
            .into_iter()
            .map(|(request, slot)| (request, finish_slot(slot)))
            .collect();
        return Ok(Deps::Ready(Injected::new(slots)));
    }

    Ok(Deps::Pending(
        async move {
            let mut ready = Vec::with_capacity(slots.len());
            for (request, slot) in slots {
                let slot = match slot {
                    EagerSlot::Future(future) => Slot::Value(future.await?),
                    other => finish_slot(other),
                };
                ready.push((request, slot));
            }
            Ok(Injected::new(ready))
        }
        .boxed(),
    ))
}

fn finish_slot(slot: EagerSlot) -> Slot {
    match slot {
        EagerSlot::Value(value) => Slot::Value(value),
        EagerSlot::Handle(origin) => Slot::Handle(origin),
        EagerSlot::Missing => Slot::Missing,
        EagerSlot::Future(_) => unreachable!("pending slot in a ready set"),
    }
}
