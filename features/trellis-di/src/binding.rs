use std::{fmt, sync::Arc};

use crate::{
    factory::{ClassFactory, DynFactory, DynProvider, Factory, Provider, ProviderFactory},
    types::{Injectable, TypeInfo, Value},
};

/// Lifetime and sharing policy of a resolved value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BindingScope {
    /// New instance per resolution
    #[default]
    Transient,
    /// One instance, cached in the context that defines the binding and
    /// shared with every descendant
    Singleton,
    /// One instance per requesting context
    Context,
}

/// How a dependency slot wants its key resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionMode {
    /// Resolve the value before construction
    Direct,
    /// Inject a handle that performs the lookup when invoked
    Getter,
    /// Inject a handle that writes the key when invoked
    Setter,
}

/// One constructor dependency slot
#[derive(Debug, Clone)]
pub struct DependencyRequest {
    pub key: String,
    pub mode: ResolutionMode,
    pub optional: bool,
}

impl DependencyRequest {
    pub fn direct(key: impl Into<String>) -> DependencyRequest {
        DependencyRequest {
            key: key.into(),
            mode: ResolutionMode::Direct,
            optional: false,
        }
    }

    pub fn getter(key: impl Into<String>) -> DependencyRequest {
        DependencyRequest {
            key: key.into(),
            mode: ResolutionMode::Getter,
            optional: false,
        }
    }

    pub fn setter(key: impl Into<String>) -> DependencyRequest {
        DependencyRequest {
            key: key.into(),
            mode: ResolutionMode::Setter,
            optional: false,
        }
    }

    /// An absent optional slot injects nothing instead of failing
    pub fn optional(mut self) -> DependencyRequest {
        self.optional = true;
        self
    }
}

pub(crate) enum BindingSource {
    Constant(Value),
    Class(Arc<dyn DynFactory>),
    Provider(Arc<dyn DynProvider>),
}

/// A named, typed slot in a context describing how to produce a value
///
/// Keys are plain strings; prefix them per component ("sequence.", "mail.")
/// to avoid cross-component collisions. The convention is documented, not
/// machine-checked.
pub struct Binding {
    key: String,
    info: TypeInfo,
    scope: BindingScope,
    pub(crate) source: BindingSource,
}

impl Binding {
    /// A fixed value, returned as-is on every resolution
    pub fn constant<T: Injectable>(key: impl Into<String>, value: T) -> Binding {
        Binding {
            key: key.into(),
            info: TypeInfo::of::<T>(),
            scope: BindingScope::Transient,
            source: BindingSource::Constant(Value::new(value)),
        }
    }

    /// A class constructed by its factory with injected dependencies
    pub fn class<F: Factory>(key: impl Into<String>) -> Binding {
        let factory = Arc::new(ClassFactory::<F>::new());
        Binding {
            key: key.into(),
            info: factory.supplies(),
            scope: BindingScope::Transient,
            source: BindingSource::Class(factory),
        }
    }

    /// A provider: the factory's product is constructed with injected
    /// dependencies, then its `value()` computation yields the bound value
    pub fn provider<F>(key: impl Into<String>) -> Binding
    where
        F: Factory,
        F::Provides: Provider,
    {
        let provider = Arc::new(ProviderFactory::<F>::new());
        Binding {
            key: key.into(),
            info: provider.supplies(),
            scope: BindingScope::Transient,
            source: BindingSource::Provider(provider),
        }
    }

    pub fn in_scope(mut self, scope: BindingScope) -> Binding {
        self.scope = scope;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn type_info(&self) -> TypeInfo {
        self.info
    }

    pub fn scope(&self) -> BindingScope {
        self.scope
    }

    /// Declared dependency slots of the underlying constructor
    pub fn dependencies(&self) -> Vec<DependencyRequest> {
        match &self.source {
            BindingSource::Constant(_) => Vec::new(),
            BindingSource::Class(factory) => factory.dependencies(),
            BindingSource::Provider(provider) => provider.dependencies(),
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.source {
            BindingSource::Constant(_) => "constant",
            BindingSource::Class(_) => "class",
            BindingSource::Provider(_) => "provider",
        };
        f.debug_struct("Binding")
            .field("key", &self.key)
            .field("kind", &kind)
            .field("type", &self.info.type_name)
            .field("scope", &self.scope)
            .finish()
    }
}
