use std::{any::type_name, sync::Arc};

use crate::{
    binding::{DependencyRequest, ResolutionMode},
    context::Context,
    deferred::{Getter, Setter},
    errors::ResolveError,
    types::{Injectable, Value},
};

pub(crate) enum Slot {
    /// A resolved direct dependency
    Value(Value),
    /// Origin context a deferred handle is minted over
    Handle(Context),
    /// An absent optional dependency
    Missing,
}

/// The resolved dependency slots handed to [crate::Factory::create]
///
/// Accessors check the declared resolution mode of each slot, so a factory
/// cannot read a getter slot as a value or vice versa.
pub struct Injected {
    slots: Vec<(DependencyRequest, Slot)>,
}

impl Injected {
    pub(crate) fn new(slots: Vec<(DependencyRequest, Slot)>) -> Injected {
        Injected { slots }
    }

    fn slot(&self, key: &str, accessed: ResolutionMode) -> Result<&(DependencyRequest, Slot), ResolveError> {
        let entry = self
            .slots
            .iter()
            .find(|(request, _)| request.key == key)
            .ok_or_else(|| ResolveError::UndeclaredDependency { key: key.into() })?;
        if entry.0.mode != accessed {
            return Err(ResolveError::ModeMismatch {
                key: key.into(),
                declared: entry.0.mode,
                accessed,
            });
        }
        Ok(entry)
    }

    /// The resolved value of a direct slot
    pub fn value<T: Injectable>(&self, key: &str) -> Result<Arc<T>, ResolveError> {
        match self.slot(key, ResolutionMode::Direct)? {
            (_, Slot::Value(value)) => downcast(key, value),
            (request, Slot::Missing) => Err(ResolveError::NotFound {
                key: request.key.clone(),
                context: "injection".into(),
            }),
            _ => unreachable!("direct slot resolved to a handle"),
        }
    }

    /// The resolved value of an optional direct slot, or None when absent
    pub fn maybe_value<T: Injectable>(&self, key: &str) -> Result<Option<Arc<T>>, ResolveError> {
        match self.slot(key, ResolutionMode::Direct)? {
            (_, Slot::Value(value)) => downcast(key, value).map(Some),
            (_, Slot::Missing) => Ok(None),
            _ => unreachable!("direct slot resolved to a handle"),
        }
    }

    /// Clone of the resolved value; convenient for `Arc<dyn Trait>` products
    pub fn cloned<T: Injectable + Clone>(&self, key: &str) -> Result<T, ResolveError> {
        self.value::<T>(key).map(|value| (*value).clone())
    }

    /// Deferred lookup handle for a getter slot
    pub fn getter<T: Injectable>(&self, key: &str) -> Result<Getter<T>, ResolveError> {
        match self.slot(key, ResolutionMode::Getter)? {
            (request, Slot::Handle(origin)) => Ok(Getter::new(origin.clone(), request.key.clone())),
            _ => unreachable!("getter slot resolved to a value"),
        }
    }

    /// Deferred write handle for a setter slot
    pub fn setter<T: Injectable>(&self, key: &str) -> Result<Setter<T>, ResolveError> {
        match self.slot(key, ResolutionMode::Setter)? {
            (request, Slot::Handle(origin)) => Ok(Setter::new(origin.clone(), request.key.clone())),
            _ => unreachable!("setter slot resolved to a value"),
        }
    }
}

fn downcast<T: Injectable>(key: &str, value: &Value) -> Result<Arc<T>, ResolveError> {
    value.downcast().map_err(|actual| ResolveError::TypeMismatch {
        key: key.into(),
        expected: type_name::<T>(),
        actual,
    })
}
