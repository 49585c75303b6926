use std::{
    any::type_name,
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, RwLock},
};

use crate::{
    binding::Binding,
    deferred::{Getter, Setter},
    errors::{BindError, ResolveError},
    resolver,
    types::{Injectable, SharedResolution, Value, ValueOrFuture},
};

/// A hierarchical registry of bindings with parent-chain lookup
///
/// Contexts form a tree: one per logical scope (application, server,
/// unit of work). A child shadows a parent binding by re-registering the
/// same key; lookups resolve to the nearest definition. Children never
/// mutate ancestors.
///
/// Cloning a Context clones the handle, not the registry.
#[derive(Clone)]
pub struct Context(pub(crate) Arc<ContextInner>);

pub(crate) struct ContextInner {
    name: String,
    parent: Option<Context>,
    bindings: RwLock<HashMap<String, Arc<Binding>>>,
    /// Cached singleton and context-scope resolutions
    pub(crate) cache: Mutex<HashMap<String, SharedResolution>>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bindings = self.0.bindings.read().unwrap();
        let mut map = f.debug_struct("Context");
        map.field("name", &self.0.name);
        for (key, binding) in bindings.iter() {
            map.field(key, &binding.type_info().type_name);
        }
        map.finish()
    }
}

impl Context {
    /// A root context with no parent
    pub fn new(name: impl Into<String>) -> Context {
        Context(Arc::new(ContextInner {
            name: name.into(),
            parent: None,
            bindings: RwLock::new(HashMap::new()),
            cache: Mutex::new(HashMap::new()),
        }))
    }

    /// A child scope; lookups fall through to this context when a key is
    /// absent in the child
    pub fn child(&self, name: impl Into<String>) -> Context {
        Context(Arc::new(ContextInner {
            name: name.into(),
            parent: Some(self.clone()),
            bindings: RwLock::new(HashMap::new()),
            cache: Mutex::new(HashMap::new()),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn parent(&self) -> Option<&Context> {
        self.0.parent.as_ref()
    }

    /// Register or replace a binding at this context level
    ///
    /// Last write wins here; an ancestor binding under the same key is
    /// shadowed, not mutated. Any cached resolution for the key at this
    /// level is dropped.
    pub fn bind(&self, binding: Binding) {
        let key = binding.key().to_string();
        let shadowed = {
            let mut bindings = self.0.bindings.write().unwrap();
            bindings.insert(key.clone(), Arc::new(binding)).is_some()
        };
        self.0.cache.lock().unwrap().remove(&key);
        if shadowed {
            tracing::debug!("rebound '{}' in context '{}'", key, self.0.name);
        } else {
            tracing::debug!("bound '{}' in context '{}'", key, self.0.name);
        }
    }

    /// Register a binding, failing if the key is already bound at this level
    pub fn bind_strict(&self, binding: Binding) -> Result<(), BindError> {
        let mut bindings = self.0.bindings.write().unwrap();
        if bindings.contains_key(binding.key()) {
            return Err(BindError::Duplicate {
                key: binding.key().into(),
                context: self.0.name.clone(),
            });
        }
        bindings.insert(binding.key().to_string(), Arc::new(binding));
        Ok(())
    }

    /// Whether the key is bound here or in any ancestor
    pub fn contains(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    /// Whether the key is bound at this context level
    pub fn contains_local(&self, key: &str) -> bool {
        self.0.bindings.read().unwrap().contains_key(key)
    }

    /// Nearest definition walking from this context to the root
    pub(crate) fn find(&self, key: &str) -> Option<(Context, Arc<Binding>)> {
        let mut current = self.clone();
        loop {
            let found = current.0.bindings.read().unwrap().get(key).cloned();
            if let Some(binding) = found {
                return Some((current, binding));
            }
            let next = current.0.parent.clone();
            match next {
                Some(parent) => current = parent,
                None => return None,
            }
        }
    }

    /// Snapshot of the bindings declared at this level
    pub fn local_bindings(&self) -> Vec<Arc<Binding>> {
        self.0.bindings.read().unwrap().values().cloned().collect()
    }

    /// Resolve a key to a value or to the future producing it
    ///
    /// The result is a direct value exactly when the entire reachable
    /// dependency graph is synchronous.
    pub fn resolve(&self, key: &str) -> Result<ValueOrFuture, ResolveError> {
        resolver::resolve(self, key)
    }

    /// Resolve and await, downcasting to the requested type
    pub async fn get<T: Injectable>(&self, key: &str) -> Result<Arc<T>, ResolveError> {
        let value = self.resolve(key)?.resolved().await?;
        downcast(key, &value)
    }

    /// Resolve without awaiting
    ///
    /// Fails with [ResolveError::RequiresAsync] when the key's dependency
    /// graph contains an asynchronous provider; never blocks.
    pub fn require<T: Injectable>(&self, key: &str) -> Result<Arc<T>, ResolveError> {
        let value = self.resolve(key)?.now(key)?;
        downcast(key, &value)
    }

    /// Mint a deferred lookup handle over this context
    ///
    /// The key's binding is not touched; it need not exist yet.
    pub fn getter<T: Injectable>(&self, key: impl Into<String>) -> Getter<T> {
        Getter::new(self.clone(), key.into())
    }

    /// Mint a deferred write handle over this context
    pub fn setter<T: Injectable>(&self, key: impl Into<String>) -> Setter<T> {
        Setter::new(self.clone(), key.into())
    }
}

fn downcast<T: Injectable>(key: &str, value: &Value) -> Result<Arc<T>, ResolveError> {
    value.downcast().map_err(|actual| ResolveError::TypeMismatch {
        key: key.into(),
        expected: type_name::<T>(),
        actual,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::Binding;

    #[test]
    fn nearest_definition_wins() {
        let root = Context::new("root");
        root.bind(Binding::constant("greeting", "hello".to_string()));

        let child = root.child("child");
        assert_eq!(*child.require::<String>("greeting").unwrap(), "hello");

        child.bind(Binding::constant("greeting", "hi".to_string()));
        assert_eq!(*child.require::<String>("greeting").unwrap(), "hi");
        // the shadow is local; the parent still sees its own value
        assert_eq!(*root.require::<String>("greeting").unwrap(), "hello");
    }

    #[test]
    fn missing_key_is_an_error() {
        let root = Context::new("root");
        let err = root.require::<String>("nope").unwrap_err();
        assert!(matches!(err, ResolveError::NotFound { .. }));
    }

    #[test]
    fn strict_mode_rejects_duplicates() {
        let root = Context::new("root");
        root.bind_strict(Binding::constant("n", 1_u32)).unwrap();
        let err = root.bind_strict(Binding::constant("n", 2_u32)).unwrap_err();
        assert!(matches!(err, BindError::Duplicate { .. }));
        // non-strict rebinding at the same level is last-write-wins
        root.bind(Binding::constant("n", 3_u32));
        assert_eq!(*root.require::<u32>("n").unwrap(), 3);
    }

    #[test]
    fn wrong_type_is_reported_not_cast() {
        let root = Context::new("root");
        root.bind(Binding::constant("n", 1_u32));
        let err = root.require::<String>("n").unwrap_err();
        assert!(matches!(err, ResolveError::TypeMismatch { .. }));
    }
}
