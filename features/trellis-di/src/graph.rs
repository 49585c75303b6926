use std::collections::{BTreeMap, HashSet};

use thiserror::Error;

use crate::{
    binding::{DependencyRequest, ResolutionMode},
    context::Context,
};

/// Graph of a context chain's bindings and their declared dependency edges
///
/// Validates wiring before anything runs: direct edges must be satisfiable
/// and must not form a cycle. Deferred (getter/setter) edges are exempt from
/// both checks - they reference keys that may only exist later in a scope's
/// lifetime, and they are the one legal way to close a dependency loop.
pub struct BindingGraph {
    map: BTreeMap<String, GraphEntry>,
}

struct GraphEntry {
    key: String,
    dependencies: Vec<DependencyRequest>,
}

impl BindingGraph {
    /// Collect every binding visible from `context`, nearest definition wins
    pub fn from_context(context: &Context) -> Self {
        let mut chain = Vec::new();
        let mut current = Some(context.clone());
        while let Some(ctx) = current {
            current = ctx.parent().cloned();
            chain.push(ctx);
        }

        // Root-first, so child shadows overwrite ancestor entries
        let mut map = BTreeMap::new();
        for ctx in chain.into_iter().rev() {
            for binding in ctx.local_bindings() {
                map.insert(
                    binding.key().to_string(),
                    GraphEntry {
                        key: binding.key().to_string(),
                        dependencies: binding.dependencies(),
                    },
                );
            }
        }

        BindingGraph { map }
    }

    /// Validate the graph
    ///
    /// Returns every issue found, not just the first
    pub fn check(&self) -> Result<(), GraphErrors> {
        let mut checked = HashSet::new();
        let mut errors = Vec::new();
        for entry in self.map.values() {
            let mut dependency_chain = Vec::new();
            check_recurse(self, &mut checked, &mut errors, &mut dependency_chain, entry);
        }

        if !errors.is_empty() {
            return Err(GraphErrors { errors });
        }

        return Ok(());

        fn check_recurse(
            graph: &BindingGraph,
            checked: &mut HashSet<String>,
            errors: &mut Vec<GraphError>,
            dependency_chain: &mut Vec<String>,
            entry: &GraphEntry,
        ) {
            if dependency_chain.contains(&entry.key) {
                let from = dependency_chain.first().expect("must have entries").clone();
                dependency_chain.push(entry.key.clone());

                errors.push(GraphError::CircularDependency {
                    from,
                    chain: dependency_chain.clone(),
                });
            }

            // Skip other checks if already checked
            if !checked.insert(entry.key.clone()) {
                return;
            }

            dependency_chain.push(entry.key.clone());

            for dependency in &entry.dependencies {
                if dependency.mode != ResolutionMode::Direct {
                    // Deferred edges resolve at invocation time; neither the
                    // missing check nor the cycle walk applies
                    continue;
                }

                let Some(next_entry) = graph.map.get(&dependency.key) else {
                    if !dependency.optional {
                        errors.push(GraphError::MissingDependency {
                            dependency: dependency.key.clone(),
                            required_by: entry.key.clone(),
                        });
                    }
                    continue;
                };

                check_recurse(graph, checked, errors, dependency_chain, next_entry);
            }

            dependency_chain.pop();
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum GraphError {
    #[error("'{required_by}' needs '{dependency}' but nothing binds it")]
    MissingDependency {
        dependency: String,
        required_by: String,
    },
    #[error("circular dependency from '{from}' through [{}] - break one edge with a deferred getter", chain.join(" -> "))]
    CircularDependency { from: String, chain: Vec<String> },
}

#[derive(Error, Debug, Clone)]
pub struct GraphErrors {
    pub errors: Vec<GraphError>,
}

impl std::fmt::Display for GraphErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut display = Vec::new();
        display.push("the binding graph had one or more errors:".to_string());
        for error in &self.errors {
            display.push(format!("- {}", error));
        }
        f.write_str(&display.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        binding::{Binding, DependencyRequest},
        factory::Factory,
        injected::Injected,
        types::DynError,
    };

    struct NeedsMissing;
    impl Factory for NeedsMissing {
        type Provides = u32;
        fn dependencies() -> Vec<DependencyRequest> {
            vec![DependencyRequest::direct("not.bound")]
        }
        fn create(_deps: Injected) -> Result<u32, DynError> {
            Ok(0)
        }
    }

    struct NeedsMissingLazily;
    impl Factory for NeedsMissingLazily {
        type Provides = u32;
        fn dependencies() -> Vec<DependencyRequest> {
            vec![DependencyRequest::getter("not.bound.yet")]
        }
        fn create(_deps: Injected) -> Result<u32, DynError> {
            Ok(0)
        }
    }

    struct Ping;
    impl Factory for Ping {
        type Provides = u32;
        fn dependencies() -> Vec<DependencyRequest> {
            vec![DependencyRequest::direct("pong")]
        }
        fn create(_deps: Injected) -> Result<u32, DynError> {
            Ok(0)
        }
    }

    struct Pong;
    impl Factory for Pong {
        type Provides = u32;
        fn dependencies() -> Vec<DependencyRequest> {
            vec![DependencyRequest::direct("ping")]
        }
        fn create(_deps: Injected) -> Result<u32, DynError> {
            Ok(0)
        }
    }

    struct PongDeferred;
    impl Factory for PongDeferred {
        type Provides = u32;
        fn dependencies() -> Vec<DependencyRequest> {
            vec![DependencyRequest::getter("ping")]
        }
        fn create(_deps: Injected) -> Result<u32, DynError> {
            Ok(0)
        }
    }

    #[test]
    fn missing_direct_dependency_is_reported() {
        let ctx = Context::new("root");
        ctx.bind(Binding::class::<NeedsMissing>("needy"));

        let err = BindingGraph::from_context(&ctx).check().unwrap_err();
        assert!(matches!(
            err.errors.as_slice(),
            [GraphError::MissingDependency { .. }]
        ));
    }

    #[test]
    fn missing_deferred_dependency_is_fine() {
        let ctx = Context::new("root");
        ctx.bind(Binding::class::<NeedsMissingLazily>("needy"));

        BindingGraph::from_context(&ctx).check().unwrap();
    }

    #[test]
    fn direct_cycle_is_rejected() {
        let ctx = Context::new("root");
        ctx.bind(Binding::class::<Ping>("ping"));
        ctx.bind(Binding::class::<Pong>("pong"));

        let err = BindingGraph::from_context(&ctx).check().unwrap_err();
        assert!(err
            .errors
            .iter()
            .any(|e| matches!(e, GraphError::CircularDependency { .. })));
    }

    #[test]
    fn deferred_edge_breaks_the_cycle() {
        let ctx = Context::new("root");
        ctx.bind(Binding::class::<Ping>("ping"));
        ctx.bind(Binding::class::<PongDeferred>("pong"));

        BindingGraph::from_context(&ctx).check().unwrap();
    }

    #[test]
    fn child_shadow_replaces_the_ancestor_entry() {
        let root = Context::new("root");
        root.bind(Binding::class::<NeedsMissing>("needy"));
        let child = root.child("child");
        child.bind(Binding::constant("needy", 7_u32));

        // seen from the child, the shadowing constant has no dependencies
        BindingGraph::from_context(&child).check().unwrap();
        assert!(BindingGraph::from_context(&root).check().is_err());
    }
}
