//! Backend registration and dependency resolution.

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use weave_common::{Ident, Interner};

use crate::backend::BackendDescriptor;
use crate::error::DriverError;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// The set of backends a compiler knows about.
///
/// Names are interned on registration; descriptors are kept in registration
/// order, which is also the order [`descriptors`](Self::descriptors) lists
/// them in. Resolution works on interned names and only turns them back into
/// strings for error reports.
#[derive(Debug, Default)]
pub struct BackendRegistry {
    interner: Interner,
    descriptors: Vec<BackendDescriptor>,
    idents: Vec<Ident>,
    by_name: HashMap<Ident, usize>,
}

impl BackendRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a backend. Fails if the name is already taken.
    pub fn register(&mut self, descriptor: BackendDescriptor) -> Result<(), DriverError> {
        let ident = self.interner.get_or_intern(descriptor.name());
        if self.by_name.contains_key(&ident) {
            return Err(DriverError::DuplicateBackend(descriptor.name().to_string()));
        }
        tracing::trace!(backend = descriptor.name(), "registered backend");
        self.by_name.insert(ident, self.descriptors.len());
        self.idents.push(ident);
        self.descriptors.push(descriptor);
        Ok(())
    }

    /// Looks up a descriptor by name.
    pub fn get(&self, name: &str) -> Option<&BackendDescriptor> {
        self.index_of(name).map(|i| &self.descriptors[i])
    }

    /// Iterates over descriptors in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &BackendDescriptor> {
        self.descriptors.iter()
    }

    /// Returns the number of registered backends.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        let ident = self.interner.get(name)?;
        self.by_name.get(&ident).copied()
    }

    fn name_of(&self, index: usize) -> &str {
        self.interner.resolve(self.idents[index])
    }

    /// Expands `requested` into an execution plan.
    ///
    /// Every backend appears once, after all of its dependencies. Requested
    /// names keep their relative order; dependencies are visited in declared
    /// order just before the first backend that needs them.
    pub fn collect_required_backends<S: AsRef<str>>(
        &self,
        requested: &[S],
    ) -> Result<Vec<&BackendDescriptor>, DriverError> {
        let mut marks: HashMap<usize, Mark> = HashMap::new();
        let mut path: Vec<usize> = Vec::new();
        let mut order: Vec<usize> = Vec::new();
        for name in requested {
            self.visit(name.as_ref(), None, &mut marks, &mut path, &mut order)?;
        }
        Ok(order.into_iter().map(|i| &self.descriptors[i]).collect())
    }

    fn visit(
        &self,
        name: &str,
        required_by: Option<&str>,
        marks: &mut HashMap<usize, Mark>,
        path: &mut Vec<usize>,
        order: &mut Vec<usize>,
    ) -> Result<(), DriverError> {
        let index = self
            .index_of(name)
            .ok_or_else(|| DriverError::UnknownBackend {
                name: name.to_string(),
                required_by: required_by.map(str::to_string),
            })?;
        match marks.get(&index) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => {
                let start = path.iter().position(|&i| i == index).unwrap_or(0);
                let cycle: Vec<String> = path[start..]
                    .iter()
                    .chain(std::iter::once(&index))
                    .map(|&i| self.name_of(i).to_string())
                    .collect();
                return Err(DriverError::CyclicDependency { cycle });
            }
            None => {}
        }

        marks.insert(index, Mark::Visiting);
        path.push(index);
        let descriptor = &self.descriptors[index];
        for dep in descriptor.dependencies() {
            self.visit(dep, Some(descriptor.name()), marks, path, order)?;
        }
        path.pop();
        marks.insert(index, Mark::Done);
        order.push(index);
        Ok(())
    }

    /// Checks the whole registry: every declared dependency is registered
    /// and the dependency graph is acyclic.
    pub fn validate(&self) -> Result<(), DriverError> {
        let mut graph: DiGraph<usize, ()> = DiGraph::new();
        let nodes: Vec<NodeIndex> = (0..self.descriptors.len())
            .map(|i| graph.add_node(i))
            .collect();
        for (i, descriptor) in self.descriptors.iter().enumerate() {
            for dep in descriptor.dependencies() {
                let target = self
                    .index_of(dep)
                    .ok_or_else(|| DriverError::UnknownBackend {
                        name: dep.clone(),
                        required_by: Some(descriptor.name().to_string()),
                    })?;
                graph.add_edge(nodes[target], nodes[i], ());
            }
        }

        match toposort(&graph, None) {
            Ok(_) => Ok(()),
            Err(cycle) => {
                // Resolve from the offending node to report the full cycle.
                let start = self.name_of(graph[cycle.node_id()]);
                match self.collect_required_backends(&[start]) {
                    Err(err @ DriverError::CyclicDependency { .. }) => Err(err),
                    _ => Err(DriverError::CyclicDependency {
                        cycle: vec![start.to_string(), start.to_string()],
                    }),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Backend, CompilerContext};
    use crate::error::CompileError;

    struct Nop;

    impl Backend for Nop {
        fn generate(&mut self, _ctx: &CompilerContext<'_>) -> Result<(), CompileError> {
            Ok(())
        }
    }

    fn desc(name: &str, deps: &[&str]) -> BackendDescriptor {
        BackendDescriptor::new(name, |_| Ok(Box::new(Nop))).requires(deps)
    }

    fn registry() -> BackendRegistry {
        let mut r = BackendRegistry::new();
        r.register(desc("abi-header", &[])).unwrap();
        r.register(desc("abi-source", &["abi-header"])).unwrap();
        r.register(desc("cpp-common", &["abi-header"])).unwrap();
        r.register(desc("cpp-user", &["cpp-common"])).unwrap();
        r.register(desc("cpp-author", &["cpp-common", "abi-source"]))
            .unwrap();
        r.register(desc("ani-bridge", &["cpp-user"])).unwrap();
        r
    }

    fn names(plan: &[&BackendDescriptor]) -> Vec<String> {
        plan.iter().map(|d| d.name().to_string()).collect()
    }

    #[test]
    fn dependencies_come_first() {
        let r = registry();
        let plan = r.collect_required_backends(&["ani-bridge"]).unwrap();
        assert_eq!(
            names(&plan),
            vec!["abi-header", "cpp-common", "cpp-user", "ani-bridge"]
        );
    }

    #[test]
    fn resolution_is_idempotent() {
        let r = registry();
        let one = names(&r.collect_required_backends(&["ani-bridge"]).unwrap());
        let two = names(
            &r.collect_required_backends(&["ani-bridge", "cpp-user"])
                .unwrap(),
        );
        let three = names(
            &r.collect_required_backends(&["ani-bridge", "cpp-user", "ani-bridge"])
                .unwrap(),
        );
        assert_eq!(one, two);
        assert_eq!(one, three);
    }

    #[test]
    fn requested_order_is_kept_for_unrelated_backends() {
        let r = registry();
        let plan = r
            .collect_required_backends(&["abi-source", "cpp-author", "cpp-user"])
            .unwrap();
        assert_eq!(
            names(&plan),
            vec!["abi-header", "abi-source", "cpp-common", "cpp-author", "cpp-user"]
        );
    }

    #[test]
    fn diamond_appears_once() {
        let r = registry();
        let plan = r
            .collect_required_backends(&["cpp-author", "ani-bridge"])
            .unwrap();
        let n = names(&plan);
        assert_eq!(n.iter().filter(|x| *x == "abi-header").count(), 1);
        assert_eq!(n.iter().filter(|x| *x == "cpp-common").count(), 1);
        for (i, d) in plan.iter().enumerate() {
            for dep in d.dependencies() {
                let pos = n.iter().position(|x| x == dep).unwrap();
                assert!(pos < i, "{dep} must precede {}", d.name());
            }
        }
    }

    #[test]
    fn empty_request_is_empty_plan() {
        let r = registry();
        let empty: [&str; 0] = [];
        assert!(r.collect_required_backends(&empty).unwrap().is_empty());
    }

    #[test]
    fn duplicate_registration_rejected() {
        let mut r = registry();
        let err = r.register(desc("cpp-user", &[])).unwrap_err();
        assert_eq!(err, DriverError::DuplicateBackend("cpp-user".into()));
        assert_eq!(r.len(), 6);
    }

    #[test]
    fn unknown_direct_request() {
        let r = registry();
        let err = r.collect_required_backends(&["cpp-usr"]).unwrap_err();
        assert_eq!(
            err,
            DriverError::UnknownBackend {
                name: "cpp-usr".into(),
                required_by: None,
            }
        );
    }

    #[test]
    fn unknown_dependency_names_requester() {
        let mut r = BackendRegistry::new();
        r.register(desc("ani-bridge", &["cpp-user"])).unwrap();
        let err = r.collect_required_backends(&["ani-bridge"]).unwrap_err();
        assert_eq!(
            err,
            DriverError::UnknownBackend {
                name: "cpp-user".into(),
                required_by: Some("ani-bridge".into()),
            }
        );
        assert_eq!(r.validate(), Err(err));
    }

    #[test]
    fn cycles_are_reported() {
        let mut r = BackendRegistry::new();
        r.register(desc("a", &["b"])).unwrap();
        r.register(desc("b", &["c"])).unwrap();
        r.register(desc("c", &["a"])).unwrap();
        let err = r.collect_required_backends(&["a"]).unwrap_err();
        assert_eq!(
            err,
            DriverError::CyclicDependency {
                cycle: vec!["a".into(), "b".into(), "c".into(), "a".into()],
            }
        );
        assert!(matches!(
            r.validate(),
            Err(DriverError::CyclicDependency { .. })
        ));
    }

    #[test]
    fn cycle_starts_where_resolution_entered_it() {
        let mut r = BackendRegistry::new();
        r.register(desc("front", &["b"])).unwrap();
        r.register(desc("a", &["b"])).unwrap();
        r.register(desc("b", &["c"])).unwrap();
        r.register(desc("c", &["a"])).unwrap();
        assert_eq!(
            r.collect_required_backends(&["front"]).unwrap_err(),
            DriverError::CyclicDependency {
                cycle: vec!["b".into(), "c".into(), "a".into(), "b".into()],
            }
        );
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let mut r = BackendRegistry::new();
        r.register(desc("loop", &["loop"])).unwrap();
        assert_eq!(
            r.collect_required_backends(&["loop"]).unwrap_err(),
            DriverError::CyclicDependency {
                cycle: vec!["loop".into(), "loop".into()],
            }
        );
    }

    #[test]
    fn valid_registry_validates() {
        assert!(registry().validate().is_ok());
        assert_eq!(registry().get("cpp-user").unwrap().name(), "cpp-user");
        assert!(registry().get("nope").is_none());
    }
}
