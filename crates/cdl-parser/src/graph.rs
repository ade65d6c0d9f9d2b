//! Service dependency graph using `petgraph`.
//!
//! Builds a directed graph from the `@name` references between service
//! definitions and resolves an order in which they can be constructed.

use std::collections::HashMap;

use cdl_common::error::{CdlError, Result};
use petgraph::graph::NodeIndex;

use crate::parser::ast::ScopeNode;

/// A dependency graph of services.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// Internal petgraph representation.
    graph: petgraph::Graph<String, ()>,
    /// Node lookup by service name.
    indices: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Creates an empty dependency graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph of every service defined in `scope`.
    ///
    /// References to services the scope does not define are external and
    /// add no edge.
    #[must_use]
    pub fn from_scope(scope: &ScopeNode) -> Self {
        let mut graph = Self::new();
        for service in scope.services() {
            let _ = graph.add_service(service.name());
        }
        for service in scope.services() {
            let dependent = graph.add_service(service.name());
            for reference in service.service_references() {
                if let Some(&dependency) = graph.indices.get(reference.name()) {
                    graph.add_dependency(dependent, dependency);
                }
            }
        }
        graph
    }

    /// Adds a service node, returning the existing one for a known name.
    pub fn add_service(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.indices.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_owned());
        let _ = self.indices.insert(name.to_owned(), idx);
        idx
    }

    /// Adds a dependency edge: `dependent` depends on `dependency`.
    ///
    /// The edge points from `dependency` to `dependent` so that a
    /// topological sort yields dependencies first.
    pub fn add_dependency(&mut self, dependent: NodeIndex, dependency: NodeIndex) {
        let _ = self.graph.add_edge(dependency, dependent, ());
    }

    /// Number of services in the graph.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns `true` if the graph has no services.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Returns the services ordered so that dependencies come first.
    ///
    /// # Errors
    ///
    /// Returns a semantic error naming a service on the cycle if the graph
    /// contains one.
    pub fn resolve_order(&self) -> Result<Vec<String>> {
        match petgraph::algo::toposort(&self.graph, None) {
            Ok(indices) => Ok(indices
                .iter()
                .filter_map(|&idx| self.graph.node_weight(idx).cloned())
                .collect()),
            Err(cycle) => {
                let name = self
                    .graph
                    .node_weight(cycle.node_id())
                    .map_or("<unknown>", String::as_str);
                Err(CdlError::Semantic {
                    message: format!("cyclic dependency detected involving service \"{name}\""),
                })
            }
        }
    }
}
