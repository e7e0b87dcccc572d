//! Workflow graph definition and builder.

use crate::error::GraphError;
use crate::state::WorkflowState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Identifier of a node in the workflow graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeId {
    ProfileAnalysis,
    Personalization,
    ErrorHandler,
}

impl NodeId {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeId::ProfileAnalysis => "profile_analysis",
            NodeId::Personalization => "personalization",
            NodeId::ErrorHandler => "error_handler",
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where control goes after a node has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Next {
    /// Run another node
    Node(NodeId),

    /// Terminal state; the run ends
    End,
}

impl fmt::Display for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Next::Node(id) => id.fmt(f),
            Next::End => f.write_str("end"),
        }
    }
}

/// A unit of work in the graph.
pub trait Node: Send + Sync {
    /// Name used in logs and error messages.
    fn name(&self) -> &str;

    /// Run the node against the state and hand it back.
    fn execute(&self, state: WorkflowState) -> WorkflowState;
}

/// Decides the next node from the state a node just produced.
pub type Router = fn(&WorkflowState) -> Next;

/// Outgoing edge of a node.
#[derive(Clone)]
pub enum Edge {
    /// Always go to the same place
    Direct(Next),

    /// Ask a router; it may only answer one of `branches`
    Conditional { router: Router, branches: Vec<Next> },
}

impl fmt::Debug for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edge::Direct(next) => f.debug_tuple("Direct").field(next).finish(),
            Edge::Conditional { branches, .. } => f
                .debug_struct("Conditional")
                .field("branches", branches)
                .finish_non_exhaustive(),
        }
    }
}

/// Outcome of looking up a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// A declared target
    To(Next),

    /// The router answered a target that was never declared for this node
    Undeclared(Next),
}

/// A compiled, validated workflow graph.
pub struct Graph {
    entry: NodeId,
    nodes: HashMap<NodeId, Arc<dyn Node>>,
    edges: HashMap<NodeId, Edge>,
}

impl Graph {
    /// Start building a graph.
    pub fn builder() -> GraphBuilder {
        GraphBuilder::new()
    }

    /// Entry node.
    pub fn entry(&self) -> NodeId {
        self.entry
    }

    /// Look up a node.
    pub fn node(&self, id: NodeId) -> Option<&Arc<dyn Node>> {
        self.nodes.get(&id)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes (never true for a compiled graph).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Transition function: where to go after `from` produced `state`.
    pub fn transition(&self, from: NodeId, state: &WorkflowState) -> Transition {
        match self.edges.get(&from) {
            Some(Edge::Direct(next)) => Transition::To(*next),
            Some(Edge::Conditional { router, branches }) => {
                let next = router(state);
                if branches.contains(&next) {
                    Transition::To(next)
                } else {
                    Transition::Undeclared(next)
                }
            }
            // Compilation guarantees an edge for every node
            None => Transition::To(Next::End),
        }
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut nodes: Vec<_> = self.nodes.keys().collect();
        nodes.sort_by_key(|id| id.as_str());
        f.debug_struct("Graph")
            .field("entry", &self.entry)
            .field("nodes", &nodes)
            .field("edges", &self.edges)
            .finish()
    }
}

/// Builder for workflow graphs.
#[derive(Default)]
pub struct GraphBuilder {
    entry: Option<NodeId>,
    nodes: Vec<(NodeId, Arc<dyn Node>)>,
    edges: Vec<(NodeId, Edge)>,
}

impl GraphBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node under an id.
    pub fn add_node(mut self, id: NodeId, node: Arc<dyn Node>) -> Self {
        self.nodes.push((id, node));
        self
    }

    /// Add an unconditional edge.
    pub fn add_edge(mut self, from: NodeId, to: Next) -> Self {
        self.edges.push((from, Edge::Direct(to)));
        self
    }

    /// Add a routed edge. `branches` lists every target the router may answer.
    pub fn add_conditional_edges<I>(mut self, from: NodeId, router: Router, branches: I) -> Self
    where
        I: IntoIterator<Item = Next>,
    {
        self.edges.push((
            from,
            Edge::Conditional {
                router,
                branches: branches.into_iter().collect(),
            },
        ));
        self
    }

    /// Set the node every run starts from.
    pub fn set_entry_point(mut self, id: NodeId) -> Self {
        self.entry = Some(id);
        self
    }

    /// Validate and build the graph.
    pub fn compile(self) -> Result<Graph, GraphError> {
        let entry = self.entry.ok_or(GraphError::MissingEntryPoint)?;

        let mut nodes = HashMap::new();
        for (id, node) in self.nodes {
            if nodes.insert(id, node).is_some() {
                return Err(GraphError::DuplicateNode(id));
            }
        }

        if !nodes.contains_key(&entry) {
            return Err(GraphError::UnknownNode(entry));
        }

        let mut edges = HashMap::new();
        for (from, edge) in self.edges {
            if !nodes.contains_key(&from) {
                return Err(GraphError::UnknownNode(from));
            }

            let targets = match &edge {
                Edge::Direct(next) => std::slice::from_ref(next),
                Edge::Conditional { branches, .. } => branches.as_slice(),
            };
            for target in targets {
                if let Next::Node(id) = target {
                    if !nodes.contains_key(id) {
                        return Err(GraphError::UnknownNode(*id));
                    }
                }
            }

            if edges.insert(from, edge).is_some() {
                return Err(GraphError::DuplicateEdge(from));
            }
        }

        for id in nodes.keys() {
            if !edges.contains_key(id) {
                return Err(GraphError::MissingEdge(*id));
            }
        }

        Ok(Graph {
            entry,
            nodes,
            edges,
        })
    }
}
