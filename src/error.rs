//! Typed errors for graph compilation and request validation.

use crate::graph::NodeId;
use thiserror::Error;

/// Errors raised while compiling a workflow graph.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("Graph has no entry point")]
    MissingEntryPoint,

    #[error("Node '{0}' added twice")]
    DuplicateNode(NodeId),

    #[error("Edge references unknown node '{0}'")]
    UnknownNode(NodeId),

    #[error("Node '{0}' has more than one outgoing edge")]
    DuplicateEdge(NodeId),

    #[error("Node '{0}' has no outgoing edge")]
    MissingEdge(NodeId),
}

/// Errors raised when validating an analyze request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Profile URL is required")]
    MissingProfileUrl,
}
