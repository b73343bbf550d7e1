//! Task registry and dependency graph
//!
//! Uses petgraph to hold every registered task as a node in a DAG, keyed by
//! name, and performs topological sorting to determine execution order. A
//! stable graph keeps `TaskId` handles valid across task removal.

use std::collections::{HashMap, HashSet};
use std::fmt;

use petgraph::algo::toposort;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::{Bfs, EdgeRef, IntoEdgeReferences, Reversed};
use petgraph::Direction;
use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{ActionError, PhasrError, Result};
use crate::phase::Phase;
use crate::settings::RegistrySettings;

/// An action attached to a task, run when the task executes.
pub type TaskAction = Box<dyn FnMut() -> std::result::Result<(), ActionError>>;

/// Handle to a task in the registry.
///
/// Handles stay valid until the task they point at is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(NodeIndex);

/// A node in the task graph
pub struct TaskNode {
    pub name: String,
    pub category: String,
    pub phase: Phase,
    pub is_target: bool,
    pub description: Option<String>,
    actions: Vec<TaskAction>,
}

impl TaskNode {
    fn new(name: &str, category: &str, phase: Phase, is_target: bool) -> Self {
        Self {
            name: name.to_string(),
            category: category.to_string(),
            phase,
            is_target,
            description: None,
            actions: Vec::new(),
        }
    }

    /// Whether any actions are attached
    pub fn has_actions(&self) -> bool {
        !self.actions.is_empty()
    }

    /// Number of attached actions
    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    pub(crate) fn push_action(&mut self, action: TaskAction) {
        self.actions.push(action);
    }

    pub(crate) fn actions_mut(&mut self) -> &mut [TaskAction] {
        &mut self.actions
    }
}

impl fmt::Debug for TaskNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskNode")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("phase", &self.phase)
            .field("is_target", &self.is_target)
            .field("description", &self.description)
            .field("actions", &self.actions.len())
            .finish()
    }
}

/// The task registry
///
/// Tasks are identified by name; requesting a name twice yields the same
/// node. Edges run from dependency to dependent, so a topological sort of
/// the graph is a valid execution order.
#[derive(Debug)]
pub struct TaskRegistry {
    graph: StableDiGraph<TaskNode, ()>,
    name_to_id: HashMap<String, TaskId>,
    settings: RegistrySettings,
}

impl TaskRegistry {
    /// Create an empty registry with default settings
    pub fn new() -> Self {
        Self::with_settings(RegistrySettings::default())
    }

    /// Create an empty registry with the given settings
    pub fn with_settings(settings: RegistrySettings) -> Self {
        Self {
            graph: StableDiGraph::new(),
            name_to_id: HashMap::new(),
            settings,
        }
    }

    /// The registry's settings
    pub fn settings(&self) -> &RegistrySettings {
        &self.settings
    }

    /// Whether PostBuild roots are wired to their Build roots
    pub fn build_all_dependencies(&self) -> bool {
        self.settings.build_all_dependencies
    }

    /// Enable or disable wiring PostBuild roots to their Build roots
    pub fn set_build_all_dependencies(&mut self, enabled: bool) {
        self.settings.build_all_dependencies = enabled;
    }

    /// Target scope used when a target name is empty
    pub fn default_target(&self) -> &str {
        &self.settings.default_target
    }

    /// Get a task by name, creating it if it does not exist
    ///
    /// An existing name wins: the node is returned as-is and the
    /// `is_target`, `category`, and `phase` arguments are ignored.
    pub fn get_task(&mut self, name: &str, is_target: bool, category: &str, phase: Phase) -> TaskId {
        if let Some(&id) = self.name_to_id.get(name) {
            trace!(task = %name, "task already registered");
            return id;
        }

        let node = TaskNode::new(name, category, phase, is_target);
        let id = TaskId(self.graph.add_node(node));
        self.name_to_id.insert(name.to_string(), id);

        debug!(task = %name, phase = %phase, is_target, "registered task");
        id
    }

    /// Record that `dependent` must run after `dependency`
    ///
    /// Self-edges and duplicate edges are dropped, so repeated wiring of the
    /// same pair keeps the graph acyclic and the edge set minimal.
    pub fn add_dependency(&mut self, dependent: TaskId, dependency: TaskId) {
        if dependent == dependency {
            trace!(task = %self.graph[dependent.0].name, "skipping self-dependency");
            return;
        }

        // Edge goes from dependency TO dependent (dep must run first)
        if self.graph.find_edge(dependency.0, dependent.0).is_some() {
            trace!(
                dependent = %self.graph[dependent.0].name,
                dependency = %self.graph[dependency.0].name,
                "dependency already wired"
            );
            return;
        }

        self.graph.add_edge(dependency.0, dependent.0, ());
        debug!(
            dependent = %self.graph[dependent.0].name,
            dependency = %self.graph[dependency.0].name,
            "wired dependency"
        );
    }

    /// Remove a task and every edge touching it
    ///
    /// Returns false if no task with that name exists. Handles to other
    /// tasks remain valid.
    pub fn remove_task(&mut self, name: &str) -> bool {
        match self.name_to_id.remove(name) {
            Some(id) => {
                self.graph.remove_node(id.0);
                debug!(task = %name, "removed task");
                true
            }
            None => false,
        }
    }

    /// Check if a task exists
    pub fn has_task(&self, name: &str) -> bool {
        self.name_to_id.contains_key(name)
    }

    /// Look up a task handle by name
    pub fn find_task(&self, name: &str) -> Option<TaskId> {
        self.name_to_id.get(name).copied()
    }

    /// Get a task by handle
    pub fn task(&self, id: TaskId) -> Option<&TaskNode> {
        self.graph.node_weight(id.0)
    }

    pub(crate) fn node(&self, id: TaskId) -> &TaskNode {
        &self.graph[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: TaskId) -> &mut TaskNode {
        &mut self.graph[id.0]
    }

    /// Iterate over all tasks
    pub fn tasks(&self) -> impl Iterator<Item = &TaskNode> {
        self.graph.node_weights()
    }

    /// Get all task names
    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.name_to_id.keys().map(|s| s.as_str())
    }

    /// Number of registered tasks
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether the registry holds no tasks
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Number of dependency edges
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Get direct dependencies of a task
    pub fn dependencies(&self, name: &str) -> Option<Vec<&str>> {
        self.name_to_id.get(name).map(|&id| {
            self.graph
                .neighbors_directed(id.0, Direction::Incoming)
                .map(|dep_idx| self.graph[dep_idx].name.as_str())
                .collect()
        })
    }

    /// Get tasks that depend on the given task
    pub fn dependents(&self, name: &str) -> Option<Vec<&str>> {
        self.name_to_id.get(name).map(|&id| {
            self.graph
                .neighbors_directed(id.0, Direction::Outgoing)
                .map(|dep_idx| self.graph[dep_idx].name.as_str())
                .collect()
        })
    }

    /// Check for a direct dependency edge between two named tasks
    pub fn has_dependency(&self, dependent: &str, dependency: &str) -> bool {
        match (self.find_task(dependent), self.find_task(dependency)) {
            (Some(dependent_id), Some(dependency_id)) => self
                .graph
                .find_edge(dependency_id.0, dependent_id.0)
                .is_some(),
            _ => false,
        }
    }

    /// Get execution order for a task (the task plus all transitive
    /// dependencies, dependencies first)
    pub fn execution_order(&self, task_name: &str) -> Result<Vec<TaskId>> {
        let target = self
            .find_task(task_name)
            .ok_or_else(|| PhasrError::TaskNotFound {
                name: task_name.to_string(),
                available: self.sorted_names(),
            })?;

        // All ancestors (dependencies) of the target task
        let required_nodes = self.ancestors(target.0);

        // Topological sort of the whole graph, filtered to required nodes
        let sorted = toposort(&self.graph, None).map_err(|_| PhasrError::CyclicDependency {
            cycle: self.cycle_description(),
        })?;

        Ok(sorted
            .into_iter()
            .filter(|idx| required_nodes.contains(idx))
            .map(TaskId)
            .collect())
    }

    /// Get all tasks in dependency order
    pub fn all_tasks_ordered(&self) -> Result<Vec<TaskId>> {
        let sorted = toposort(&self.graph, None).map_err(|_| PhasrError::CyclicDependency {
            cycle: self.cycle_description(),
        })?;

        Ok(sorted.into_iter().map(TaskId).collect())
    }

    /// Get ancestors (all dependencies, transitive) of a node
    fn ancestors(&self, target: NodeIndex) -> HashSet<NodeIndex> {
        let mut ancestors = HashSet::new();
        ancestors.insert(target);

        // BFS backwards through dependency edges
        let reversed = Reversed(&self.graph);
        let mut bfs = Bfs::new(&reversed, target);

        while let Some(node) = bfs.next(&reversed) {
            ancestors.insert(node);
        }

        ancestors
    }

    fn sorted_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.name_to_id.keys().cloned().collect();
        names.sort();
        names
    }

    /// Find a human-readable description of a cycle
    fn cycle_description(&self) -> String {
        for (name, &id) in &self.name_to_id {
            let mut visited = HashSet::new();
            let mut path = vec![name.clone()];

            if self.dfs_find_cycle(id.0, id.0, &mut visited, &mut path) {
                return path.join(" -> ");
            }
        }

        "Unknown cycle".to_string()
    }

    fn dfs_find_cycle(
        &self,
        current: NodeIndex,
        target: NodeIndex,
        visited: &mut HashSet<NodeIndex>,
        path: &mut Vec<String>,
    ) -> bool {
        for neighbor in self.graph.neighbors(current) {
            if neighbor == target && path.len() > 1 {
                path.push(self.graph[target].name.clone());
                return true;
            }

            if visited.insert(neighbor) {
                path.push(self.graph[neighbor].name.clone());
                if self.dfs_find_cycle(neighbor, target, visited, path) {
                    return true;
                }
                path.pop();
            }
        }

        false
    }

    /// Snapshot the graph for serialization
    ///
    /// Nodes and edges are sorted by name so the output is stable across
    /// runs regardless of registration order.
    pub fn export(&self) -> GraphExport {
        let mut nodes: Vec<NodeExport> = self
            .graph
            .node_weights()
            .map(|node| NodeExport {
                name: node.name.clone(),
                category: node.category.clone(),
                phase: node.phase,
                is_target: node.is_target,
                description: node.description.clone(),
            })
            .collect();
        nodes.sort_by(|a, b| a.name.cmp(&b.name));

        let mut edges: Vec<EdgeExport> = self
            .graph
            .edge_references()
            .map(|edge| EdgeExport {
                from: self.graph[edge.source()].name.clone(),
                to: self.graph[edge.target()].name.clone(),
            })
            .collect();
        edges.sort_by(|a, b| (a.from.as_str(), a.to.as_str()).cmp(&(b.from.as_str(), b.to.as_str())));

        GraphExport { nodes, edges }
    }

    /// Render the graph in Graphviz dot format
    pub fn to_dot(&self) -> String {
        let export = self.export();
        let mut out = String::new();

        out.push_str("digraph phasr {\n");
        out.push_str("  rankdir=LR;\n");
        out.push_str("  node [shape=box];\n");

        for node in &export.nodes {
            out.push_str(&format!("  \"{}\";\n", node.name));
        }
        for edge in &export.edges {
            out.push_str(&format!("  \"{}\" -> \"{}\";\n", edge.from, edge.to));
        }

        out.push_str("}\n");
        out
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable snapshot of the task graph
#[derive(Debug, Clone, Serialize)]
pub struct GraphExport {
    pub nodes: Vec<NodeExport>,
    pub edges: Vec<EdgeExport>,
}

impl GraphExport {
    /// Render as pretty-printed JSON
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).expect("graph export serializes to JSON")
    }
}

/// A task in a [`GraphExport`]
#[derive(Debug, Clone, Serialize)]
pub struct NodeExport {
    pub name: String,
    pub category: String,
    pub phase: Phase,
    pub is_target: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A dependency edge in a [`GraphExport`], from dependency to dependent
#[derive(Debug, Clone, Serialize)]
pub struct EdgeExport {
    pub from: String,
    pub to: String,
}
