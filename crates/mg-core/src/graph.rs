//! Dependency graph of migration definitions

use crate::definition::Definition;
use crate::error::{CoreError, CoreResult};
use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, HashMap, HashSet, VecDeque};

/// A directed acyclic graph of migrations keyed by timestamp.
///
/// Edges point from parent to child, so a forward topological order applies
/// parents first. Every mutation rejects edges that would close a cycle; the
/// graph is never observable in a cyclic state.
#[derive(Debug, Default)]
pub struct MigrationGraph {
    /// Vertex arena; edge weights are unused
    graph: DiGraph<Definition, ()>,

    /// Map from timestamp to node index, ordered for deterministic iteration
    node_map: BTreeMap<i64, NodeIndex>,
}

impl MigrationGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from loaded definitions, adding them in ascending timestamp order.
    pub fn build(mut definitions: Vec<Definition>) -> CoreResult<Self> {
        definitions.sort_by_key(|d| d.timestamp);
        let mut graph = Self::new();
        for def in definitions {
            graph.add_definition(def)?;
        }
        Ok(graph)
    }

    /// Insert a vertex and wire an edge from each of its parents.
    ///
    /// All parents must already be present. Nothing is inserted on error.
    pub fn add_definition(&mut self, def: Definition) -> CoreResult<()> {
        if let Some(&existing) = self.node_map.get(&def.timestamp) {
            return Err(CoreError::DuplicateMigration {
                timestamp: def.timestamp,
                name: format!("{} and {}", self.graph[existing].name, def.name),
            });
        }

        let mut seen = HashSet::with_capacity(def.parents.len());
        for &parent in &def.parents {
            if !seen.insert(parent) {
                return Err(CoreError::DuplicateParent {
                    migration: def.file_name(),
                    parent,
                });
            }
            if parent == def.timestamp {
                return Err(CoreError::CircularDependency {
                    cycle: format!("{parent} -> {parent}"),
                });
            }
            if !self.node_map.contains_key(&parent) {
                return Err(CoreError::MissingParent {
                    migration: def.file_name(),
                    parent,
                });
            }
        }

        let timestamp = def.timestamp;
        let parents = def.parents.clone();
        let idx = self.graph.add_node(def);
        self.node_map.insert(timestamp, idx);
        for parent in parents {
            // A fresh vertex has no outgoing edges, so these cannot close a cycle
            self.graph.add_edge(self.node_map[&parent], idx, ());
        }
        Ok(())
    }

    /// Add an edge `parent -> child` between two existing vertices.
    pub fn add_dependency(&mut self, parent: i64, child: i64) -> CoreResult<()> {
        let parent_idx = self.index_of(parent)?;
        let child_idx = self.index_of(child)?;

        if self.graph.contains_edge(parent_idx, child_idx) {
            return Err(CoreError::DuplicateParent {
                migration: self.graph[child_idx].file_name(),
                parent,
            });
        }
        if parent == child || has_path_connecting(&self.graph, child_idx, parent_idx, None) {
            return Err(CoreError::CircularDependency {
                cycle: self.cycle_path(child_idx, parent_idx),
            });
        }

        self.graph.add_edge(parent_idx, child_idx, ());
        self.graph[child_idx].parents.push(parent);
        Ok(())
    }

    fn index_of(&self, timestamp: i64) -> CoreResult<NodeIndex> {
        self.node_map
            .get(&timestamp)
            .copied()
            .ok_or(CoreError::MigrationNotFound { timestamp })
    }

    /// Describe the cycle that `to -> from` would close, as `from -> ... -> to -> from`.
    fn cycle_path(&self, from: NodeIndex, to: NodeIndex) -> String {
        let mut previous: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut queue = VecDeque::from([from]);
        let mut visited = HashSet::from([from]);

        while let Some(current) = queue.pop_front() {
            if current == to {
                break;
            }
            for next in self.graph.neighbors_directed(current, Direction::Outgoing) {
                if visited.insert(next) {
                    previous.insert(next, current);
                    queue.push_back(next);
                }
            }
        }

        let mut path = vec![self.graph[to].timestamp];
        let mut current = to;
        while let Some(&prev) = previous.get(&current) {
            path.push(self.graph[prev].timestamp);
            current = prev;
        }
        path.reverse();
        path.push(self.graph[from].timestamp);
        path.iter()
            .map(|ts| ts.to_string())
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    /// Vertices with no outgoing edges, ascending by timestamp.
    pub fn leaves(&self) -> Vec<i64> {
        self.node_map
            .iter()
            .filter(|&(_, &idx)| {
                self.graph
                    .neighbors_directed(idx, Direction::Outgoing)
                    .next()
                    .is_none()
            })
            .map(|(&ts, _)| ts)
            .collect()
    }

    /// Total order consistent with the dependency edges.
    ///
    /// Ties between unconstrained vertices break by ascending timestamp. With
    /// `forward == false` the ascending order is reversed as a whole, so children
    /// always precede their parents.
    pub fn topological_sort(&self, forward: bool) -> CoreResult<Vec<&Definition>> {
        let mut in_degree: HashMap<NodeIndex, usize> = self
            .node_map
            .values()
            .map(|&idx| {
                let degree = self
                    .graph
                    .neighbors_directed(idx, Direction::Incoming)
                    .count();
                (idx, degree)
            })
            .collect();

        let mut ready: BinaryHeap<Reverse<i64>> = in_degree
            .iter()
            .filter(|&(_, &degree)| degree == 0)
            .map(|(&idx, _)| Reverse(self.graph[idx].timestamp))
            .collect();

        let mut order = Vec::with_capacity(self.node_map.len());
        while let Some(Reverse(ts)) = ready.pop() {
            let idx = self.node_map[&ts];
            order.push(&self.graph[idx]);
            for child in self.graph.neighbors_directed(idx, Direction::Outgoing) {
                if let Some(degree) = in_degree.get_mut(&child) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push(Reverse(self.graph[child].timestamp));
                    }
                }
            }
        }

        if order.len() != self.node_map.len() {
            let stuck = in_degree
                .iter()
                .filter(|&(_, &degree)| degree > 0)
                .map(|(&idx, _)| self.graph[idx].timestamp)
                .min()
                .unwrap_or_default();
            return Err(CoreError::CircularDependency {
                cycle: format!("unresolved dependencies at {stuck}"),
            });
        }

        if !forward {
            order.reverse();
        }
        Ok(order)
    }

    /// Look up a definition by timestamp.
    pub fn get_definition(&self, timestamp: i64) -> Option<&Definition> {
        self.node_map.get(&timestamp).map(|&idx| &self.graph[idx])
    }

    /// Number of vertices
    pub fn order(&self) -> usize {
        self.node_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }

    /// Every vertex mapped to the timestamps of its children.
    pub fn adjacency_map(&self) -> BTreeMap<i64, BTreeSet<i64>> {
        self.node_map
            .iter()
            .map(|(&ts, &idx)| (ts, self.neighbor_set(idx, Direction::Outgoing)))
            .collect()
    }

    /// Direct parents of a vertex, ascending. Empty for unknown timestamps.
    pub fn parents(&self, timestamp: i64) -> Vec<i64> {
        self.neighbors(timestamp, Direction::Incoming)
    }

    /// Direct children of a vertex, ascending. Empty for unknown timestamps.
    pub fn children(&self, timestamp: i64) -> Vec<i64> {
        self.neighbors(timestamp, Direction::Outgoing)
    }

    fn neighbors(&self, timestamp: i64, direction: Direction) -> Vec<i64> {
        match self.node_map.get(&timestamp) {
            Some(&idx) => self.neighbor_set(idx, direction).into_iter().collect(),
            None => Vec::new(),
        }
    }

    fn neighbor_set(&self, idx: NodeIndex, direction: Direction) -> BTreeSet<i64> {
        self.graph
            .neighbors_directed(idx, direction)
            .map(|n| self.graph[n].timestamp)
            .collect()
    }

    /// All definitions in ascending timestamp order.
    pub fn definitions(&self) -> impl Iterator<Item = &Definition> + '_ {
        self.node_map.values().map(move |&idx| &self.graph[idx])
    }
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
