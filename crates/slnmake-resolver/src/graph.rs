//! Project dependency graph and build ordering.

use std::collections::{BTreeSet, HashMap};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use slnmake_util::errors::AssemblyError;

/// A node of the project graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectNode {
    pub identifier: String,
    pub name: String,
}

/// Dependency graph between assembled projects.
///
/// An edge `a -> b` means `a` depends on `b`. Node indices follow insertion
/// order, which the assembler keeps equal to declaration order.
#[derive(Debug, Clone, Default)]
pub struct ProjectGraph {
    graph: DiGraph<ProjectNode, ()>,
    indices: HashMap<String, NodeIndex>,
}

impl ProjectGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a project. Adding an identifier twice returns the existing node.
    pub fn add_project(&mut self, identifier: &str, name: &str) -> NodeIndex {
        if let Some(&idx) = self.indices.get(identifier) {
            return idx;
        }
        let idx = self.graph.add_node(ProjectNode {
            identifier: identifier.to_string(),
            name: name.to_string(),
        });
        self.indices.insert(identifier.to_string(), idx);
        idx
    }

    /// Declare that `dependent` depends on `dependency`.
    ///
    /// Returns `false` if either end is not in the graph or if the edge is a
    /// self-edge. Duplicate edges are collapsed.
    pub fn add_dependency(&mut self, dependent: &str, dependency: &str) -> bool {
        let (Some(&from), Some(&to)) = (self.indices.get(dependent), self.indices.get(dependency))
        else {
            return false;
        };
        if from == to {
            return false;
        }
        if !self.graph.edges(from).any(|e| e.target() == to) {
            self.graph.add_edge(from, to, ());
        }
        true
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.indices.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Identifiers of the direct dependencies of `identifier`, in the order the
    /// edges were added.
    pub fn dependencies_of(&self, identifier: &str) -> Vec<&str> {
        let Some(&idx) = self.indices.get(identifier) else {
            return Vec::new();
        };
        let mut deps: Vec<(usize, &str)> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.id().index(), self.graph[e.target()].identifier.as_str()))
            .collect();
        deps.sort_by_key(|(edge, _)| *edge);
        deps.into_iter().map(|(_, id)| id).collect()
    }

    /// Identifiers of the projects that depend directly on `identifier`.
    pub fn dependents_of(&self, identifier: &str) -> Vec<&str> {
        let Some(&idx) = self.indices.get(identifier) else {
            return Vec::new();
        };
        let mut dependents: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, Direction::Incoming)
            .collect();
        dependents.sort();
        dependents
            .into_iter()
            .map(|n| self.graph[n].identifier.as_str())
            .collect()
    }

    /// Projects in build order: every project comes after all of its
    /// dependencies. Among projects that are ready at the same time the one
    /// declared first comes first.
    pub fn build_order(&self) -> Result<Vec<&ProjectNode>, AssemblyError> {
        let mut remaining: Vec<usize> = self
            .graph
            .node_indices()
            .map(|n| self.graph.edges_directed(n, Direction::Outgoing).count())
            .collect();
        let mut ready: BTreeSet<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|n| remaining[n.index()] == 0)
            .collect();

        let mut ordered = Vec::with_capacity(self.graph.node_count());
        while let Some(idx) = ready.pop_first() {
            ordered.push(&self.graph[idx]);
            for dependent in self.graph.neighbors_directed(idx, Direction::Incoming) {
                let count = &mut remaining[dependent.index()];
                *count -= 1;
                if *count == 0 {
                    ready.insert(dependent);
                }
            }
        }

        if ordered.len() < self.graph.node_count() {
            return Err(self.cycle_error());
        }
        Ok(ordered)
    }

    fn cycle_error(&self) -> AssemblyError {
        let mut members = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1)
            .min_by_key(|scc| scc.iter().min().copied())
            .unwrap_or_default();
        members.sort();
        let mut projects: Vec<String> = members
            .iter()
            .map(|&n| self.graph[n].name.clone())
            .collect();
        if let Some(first) = projects.first().cloned() {
            projects.push(first);
        }
        AssemblyError::DependencyCycle { projects }
    }
}
