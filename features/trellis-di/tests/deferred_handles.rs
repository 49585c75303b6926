//! Deferred getter/setter handles: call-time lookup, local writes, no
//! eager touching of the target binding.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use futures::executor::block_on;
use trellis_di::{
    Binding, Context, DependencyRequest, DynError, Factory, Getter, Injected, Producing, Provider,
    ResolveError, Setter,
};

#[test]
fn getter_before_any_write_fails_with_not_found() {
    let root = Context::new("root");
    let request = root.child("request");

    let getter: Getter<String> = request.getter("request.user");
    let err = block_on(getter.get()).unwrap_err();
    assert!(matches!(err, ResolveError::NotFound { .. }));
}

#[test]
fn setter_then_getter_round_trips_the_exact_value() {
    let root = Context::new("root");
    let request = root.child("request");

    let setter: Setter<Arc<String>> = request.setter("request.user");
    let getter: Getter<Arc<String>> = request.getter("request.user");

    let user = Arc::new("alice".to_string());
    setter.set(user.clone());

    let read = block_on(getter.get()).unwrap();
    // identity, not just equality
    assert!(Arc::ptr_eq(&*read, &user));
}

#[test]
fn setter_writes_the_origin_context_never_parents() {
    let root = Context::new("root");
    let request = root.child("request");

    let setter: Setter<u32> = request.setter("request.flag");
    setter.set(7);

    assert!(request.contains_local("request.flag"));
    assert!(!root.contains("request.flag"));

    // a sibling unit of work sees nothing
    let other = root.child("other-request");
    assert!(matches!(
        other.require::<u32>("request.flag").unwrap_err(),
        ResolveError::NotFound { .. }
    ));
}

#[test]
fn getter_lookup_walks_the_chain_at_call_time() {
    let root = Context::new("root");
    let request = root.child("request");
    let getter: Getter<String> = request.getter("app.motd");

    // bound in the parent only after the handle was minted
    root.bind(Binding::constant("app.motd", "hi".to_string()));
    assert_eq!(*getter.require().unwrap(), "hi");

    // a later local shadow takes over
    request.bind(Binding::constant("app.motd", "hello".to_string()));
    assert_eq!(*getter.require().unwrap(), "hello");
}

// ###################################################################
// Handle injection

struct ExpensiveProvider;
impl Factory for ExpensiveProvider {
    type Provides = ExpensiveProvider;

    fn dependencies() -> Vec<DependencyRequest> {
        vec![DependencyRequest::direct("expensive.constructions")]
    }

    fn create(deps: Injected) -> Result<ExpensiveProvider, DynError> {
        deps.value::<AtomicUsize>("expensive.constructions")?
            .fetch_add(1, Ordering::SeqCst);
        Ok(ExpensiveProvider)
    }
}
impl Provider for ExpensiveProvider {
    type Out = String;

    fn value(&self) -> Producing<String> {
        Producing::ok("built".to_string())
    }
}

/// Holds a getter for the expensive binding without resolving it
struct LazyConsumer {
    expensive: Getter<String>,
}

impl Factory for LazyConsumer {
    type Provides = LazyConsumer;

    fn dependencies() -> Vec<DependencyRequest> {
        vec![DependencyRequest::getter("expensive.value")]
    }

    fn create(deps: Injected) -> Result<LazyConsumer, DynError> {
        Ok(LazyConsumer {
            expensive: deps.getter::<String>("expensive.value")?,
        })
    }
}

#[test]
fn handle_construction_does_not_resolve_the_target() {
    let root = Context::new("root");
    root.bind(Binding::constant("expensive.constructions", AtomicUsize::new(0)));
    root.bind(Binding::provider::<ExpensiveProvider>("expensive.value"));
    root.bind(Binding::class::<LazyConsumer>("consumer"));

    let consumer = root.require::<LazyConsumer>("consumer").unwrap();
    let constructions = root.require::<AtomicUsize>("expensive.constructions").unwrap();
    assert_eq!(constructions.load(Ordering::SeqCst), 0);

    // only invoking the handle runs the provider
    let value = consumer.expensive.require().unwrap();
    assert_eq!(*value, "built");
    assert_eq!(constructions.load(Ordering::SeqCst), 1);
}

/// Writer/reader pair whose dependency edges would be a cycle if both were
/// direct; the deferred edges make the wiring legal and the ordering a
/// caller decision
struct Writer {
    out: Setter<String>,
}
impl Factory for Writer {
    type Provides = Writer;

    fn dependencies() -> Vec<DependencyRequest> {
        vec![DependencyRequest::setter("element.shared")]
    }

    fn create(deps: Injected) -> Result<Writer, DynError> {
        Ok(Writer {
            out: deps.setter::<String>("element.shared")?,
        })
    }
}

struct Reader {
    input: Getter<String>,
}
impl Factory for Reader {
    type Provides = Reader;

    fn dependencies() -> Vec<DependencyRequest> {
        vec![DependencyRequest::getter("element.shared")]
    }

    fn create(deps: Injected) -> Result<Reader, DynError> {
        Ok(Reader {
            input: deps.getter::<String>("element.shared")?,
        })
    }
}

#[test]
fn deferred_edges_bridge_values_across_siblings() {
    let root = Context::new("root");
    root.bind(Binding::class::<Writer>("writer"));
    root.bind(Binding::class::<Reader>("reader"));

    let request = root.child("request");
    // both resolve up front, before the element exists
    let writer = block_on(request.get::<Writer>("writer")).unwrap();
    let reader = block_on(request.get::<Reader>("reader")).unwrap();

    assert!(block_on(reader.input.get()).is_err());
    writer.out.set("produced".to_string());
    assert_eq!(*block_on(reader.input.get()).unwrap(), "produced");
}
