use trellis_di::{Binding, Context, Factory};
use trellis_sequence::keys;

/// Controller registered with the application when a component mounts
pub struct ControllerRegistration {
    pub name: String,
    pub binding: Binding,
}

impl ControllerRegistration {
    /// Class-bind a controller factory under `controllers.<name>`
    pub fn of<F: Factory>(name: &str) -> ControllerRegistration {
        ControllerRegistration {
            name: name.to_string(),
            binding: Binding::class::<F>(keys::controller(name)),
        }
    }
}

/// A bundle of controllers and providers registered into a context as a unit
///
/// Components are themselves class bindings: implement [Factory] for the
/// component so it can receive configuration through injection, then mount
/// it with [crate::Application::mount].
pub trait Component: Send + Sync + 'static {
    /// Controllers to register with the owning application
    fn controllers(&self) -> Vec<ControllerRegistration> {
        Vec::new()
    }

    /// Provider and constant bindings to register on the owning context
    ///
    /// Keys collide last-mount-wins; prefix them per the key convention.
    fn providers(&self) -> Vec<Binding> {
        Vec::new()
    }

    /// Capability accessor for repository contribution
    ///
    /// Components without repositories keep the default. Contributed
    /// repositories are only registered when a [RepositoryMountHook] is
    /// installed - an explicit extension, not built-in behaviour.
    fn repository_source(&self) -> Option<&dyn ContributesRepositories> {
        None
    }
}

/// Capability: a component contributing application-wide data-access
/// bindings
pub trait ContributesRepositories {
    fn repositories(&self) -> Vec<Binding>;
}

/// Post-mount extension point
///
/// Hooks run after a component's own controllers and providers are
/// registered, with the mounted instance in hand.
pub trait MountHook: Send + Sync {
    fn component_mounted(&self, root: &Context, component: &dyn Component);
}

/// Registers component-contributed repositories on the root context so they
/// are visible application-wide, not just within the component's own scope
pub struct RepositoryMountHook;

impl MountHook for RepositoryMountHook {
    fn component_mounted(&self, root: &Context, component: &dyn Component) {
        let Some(source) = component.repository_source() else {
            return;
        };
        for binding in source.repositories() {
            tracing::debug!("registering repository '{}'", binding.key());
            root.bind(binding);
        }
    }
}
