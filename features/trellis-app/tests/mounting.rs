//! Component mounting: DI-constructed components, atomicity on failure,
//! last-mount-wins shadowing and the repository extension hook.

use std::sync::Arc;

use futures::{executor::block_on, future::BoxFuture, FutureExt};
use serde_json::{json, Value as JsonValue};
use trellis_di::{Binding, DependencyRequest, DynError, Factory, Injected};
use trellis_sequence::{keys, Args, Controller};
use trellis_app::{
    Application, Component, ContributesRepositories, ControllerRegistration, MountError,
    RepositoryMountHook,
};

// ###################################################################
// A component receiving configuration through injection

struct MailController;
impl Controller for MailController {
    fn call<'a>(
        &'a self,
        _operation: &'a str,
        _args: Args,
    ) -> BoxFuture<'a, Result<JsonValue, DynError>> {
        async move { Ok(json!("mail sent")) }.boxed()
    }
}
struct MailControllerFactory;
impl Factory for MailControllerFactory {
    type Provides = Arc<dyn Controller>;
    fn dependencies() -> Vec<DependencyRequest> {
        Vec::new()
    }
    fn create(_deps: Injected) -> Result<Self::Provides, DynError> {
        Ok(Arc::new(MailController))
    }
}

struct MailComponent {
    tag: Arc<String>,
}

impl Factory for MailComponent {
    type Provides = MailComponent;

    fn dependencies() -> Vec<DependencyRequest> {
        vec![DependencyRequest::direct("mail.tag")]
    }

    fn create(deps: Injected) -> Result<MailComponent, DynError> {
        Ok(MailComponent {
            tag: deps.value::<String>("mail.tag")?,
        })
    }
}

impl Component for MailComponent {
    fn controllers(&self) -> Vec<ControllerRegistration> {
        vec![ControllerRegistration::of::<MailControllerFactory>("mail")]
    }

    fn providers(&self) -> Vec<Binding> {
        vec![Binding::constant(
            "mail.signature",
            format!("sent by {}", self.tag),
        )]
    }
}

#[test]
fn a_component_is_constructed_through_the_container() {
    let app = Application::new();
    app.context()
        .bind(Binding::constant("mail.tag", "relay-1".to_string()));

    block_on(app.mount::<MailComponent>()).unwrap();

    // providers registered with the component's injected configuration
    let signature = app.context().require::<String>("mail.signature").unwrap();
    assert_eq!(*signature, "sent by relay-1");

    // controllers registered under the convention key
    assert_eq!(app.controllers(), vec![keys::controller("mail")]);
    assert!(app.context().contains(&keys::controller("mail")));
}

#[test]
fn mounting_fails_atomically_when_construction_fails() {
    let app = Application::new();
    // "mail.tag" is unbound, so the component constructor fails

    let err = block_on(app.mount::<MailComponent>()).unwrap_err();
    assert!(matches!(err, MountError::Component { .. }));

    // no partial registration is visible
    assert!(!app.context().contains("mail.signature"));
    assert!(!app.context().contains(&keys::controller("mail")));
    assert!(app.controllers().is_empty());
}

// ###################################################################
// Key collisions between components

struct FirstGreeter;
impl Factory for FirstGreeter {
    type Provides = FirstGreeter;
    fn dependencies() -> Vec<DependencyRequest> {
        Vec::new()
    }
    fn create(_deps: Injected) -> Result<FirstGreeter, DynError> {
        Ok(FirstGreeter)
    }
}
impl Component for FirstGreeter {
    fn providers(&self) -> Vec<Binding> {
        // unprefixed on purpose; see the key namespacing convention
        vec![Binding::constant("greeting", "first".to_string())]
    }
}

struct SecondGreeter;
impl Factory for SecondGreeter {
    type Provides = SecondGreeter;
    fn dependencies() -> Vec<DependencyRequest> {
        Vec::new()
    }
    fn create(_deps: Injected) -> Result<SecondGreeter, DynError> {
        Ok(SecondGreeter)
    }
}
impl Component for SecondGreeter {
    fn providers(&self) -> Vec<Binding> {
        vec![Binding::constant("greeting", "second".to_string())]
    }
}

#[test]
fn colliding_provider_keys_shadow_last_mount_wins() {
    let app = Application::new();
    block_on(app.mount::<FirstGreeter>()).unwrap();
    block_on(app.mount::<SecondGreeter>()).unwrap();

    // same context level, so this is a replacement, not a child shadow
    let greeting = app.context().require::<String>("greeting").unwrap();
    assert_eq!(*greeting, "second");
}

// ###################################################################
// Repository contribution through the explicit extension hook

struct AuditLog {
    entries: &'static str,
}

struct AuditComponent;
impl Factory for AuditComponent {
    type Provides = AuditComponent;
    fn dependencies() -> Vec<DependencyRequest> {
        Vec::new()
    }
    fn create(_deps: Injected) -> Result<AuditComponent, DynError> {
        Ok(AuditComponent)
    }
}
impl ContributesRepositories for AuditComponent {
    fn repositories(&self) -> Vec<Binding> {
        vec![Binding::constant(
            keys::repository("audit"),
            AuditLog { entries: "audit" },
        )]
    }
}
impl Component for AuditComponent {
    fn repository_source(&self) -> Option<&dyn ContributesRepositories> {
        Some(self)
    }
}

#[test]
fn repositories_register_only_through_the_mount_hook() {
    let without_hook = Application::new();
    block_on(without_hook.mount::<AuditComponent>()).unwrap();
    assert!(!without_hook.context().contains(&keys::repository("audit")));

    let with_hook = Application::new();
    with_hook.add_mount_hook(RepositoryMountHook);
    block_on(with_hook.mount::<AuditComponent>()).unwrap();

    // visible application-wide, from any descendant context
    let child = with_hook.context().child("server.sub");
    let log = child.require::<AuditLog>(&keys::repository("audit")).unwrap();
    assert_eq!(log.entries, "audit");
}
