use std::{
    any::type_name,
    sync::{Arc, RwLock},
};

use trellis_di::{Binding, BindingGraph, Context, Factory};
use trellis_sequence::keys;

use crate::{
    component::{Component, MountHook},
    errors::{LifecycleError, MountError},
    server::Server,
};

/// Owns the root context, the controller registry, mount hooks and servers
///
/// One Application per process is the normal shape; nothing prevents more.
pub struct Application {
    root: Context,
    controllers: RwLock<Vec<String>>,
    servers: RwLock<Vec<(String, Arc<dyn Server>)>>,
    hooks: RwLock<Vec<Box<dyn MountHook>>>,
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

impl Application {
    pub fn new() -> Application {
        Application {
            root: Context::new("application"),
            controllers: RwLock::new(Vec::new()),
            servers: RwLock::new(Vec::new()),
            hooks: RwLock::new(Vec::new()),
        }
    }

    /// The application-level root context
    pub fn context(&self) -> &Context {
        &self.root
    }

    /// Install a post-mount extension hook; applies to later mounts only
    pub fn add_mount_hook(&self, hook: impl MountHook + 'static) {
        self.hooks.write().unwrap().push(Box::new(hook));
    }

    /// Binding keys of every registered controller, in registration order
    pub fn controllers(&self) -> Vec<String> {
        self.controllers.read().unwrap().clone()
    }

    /// Mount a component
    ///
    /// The component class is instantiated through the container, so it may
    /// receive configuration by injection. Mounting is atomic: the fallible
    /// instantiation completes before the first controller or provider
    /// registration becomes visible, and registration itself cannot fail.
    /// Provider keys collide last-mount-wins at the root level.
    pub async fn mount<F>(&self) -> Result<(), MountError>
    where
        F: Factory,
        F::Provides: Component,
    {
        let component_name = short_type_name::<F::Provides>();
        let key = keys::component(component_name);
        self.root.bind(Binding::class::<F>(key.clone()));

        let component: Arc<F::Provides> =
            self.root.get(&key).await.map_err(|error| MountError::Component {
                component: component_name,
                error,
            })?;

        tracing::debug!("mounting component '{component_name}'");

        for registration in component.controllers() {
            tracing::debug!("registering controller '{}'", registration.name);
            self.root.bind(registration.binding);
            self.controllers
                .write()
                .unwrap()
                .push(keys::controller(&registration.name));
        }

        for binding in component.providers() {
            self.root.bind(binding);
        }

        for hook in self.hooks.read().unwrap().iter() {
            hook.component_mounted(&self.root, component.as_ref());
        }

        Ok(())
    }

    pub fn add_server(&self, name: impl Into<String>, server: Arc<dyn Server>) {
        self.servers.write().unwrap().push((name.into(), server));
    }

    pub fn server(&self, name: &str) -> Option<Arc<dyn Server>> {
        self.servers
            .read()
            .unwrap()
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, server)| server.clone())
    }

    /// Validate the wiring, then start servers in registration order
    ///
    /// An unresolvable dependency fails here, not lazily at first request.
    pub async fn start(&self) -> Result<(), LifecycleError> {
        BindingGraph::from_context(&self.root).check()?;

        let servers = self.servers.read().unwrap().clone();
        for (name, server) in servers {
            tracing::debug!("starting server '{name}'");
            server
                .start()
                .await
                .map_err(|error| LifecycleError::Server { name, error })?;
        }
        Ok(())
    }

    /// Stop servers in reverse registration order
    pub async fn stop(&self) -> Result<(), LifecycleError> {
        let mut servers = self.servers.read().unwrap().clone();
        servers.reverse();
        for (name, server) in servers {
            tracing::debug!("stopping server '{name}'");
            server
                .stop()
                .await
                .map_err(|error| LifecycleError::Server { name, error })?;
        }
        Ok(())
    }
}

/// Last path segment of a type name, for component binding keys
fn short_type_name<T>() -> &'static str {
    let name = type_name::<T>();
    name.rsplit("::").next().unwrap_or(name)
}
