// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while a workflow graph is being assembled.
//!
//! Every variant is fatal to the construction step that raised it: the graph
//! is left exactly as it was before the failing call, and the caller is
//! expected to abort assembly rather than continue with a partial graph.

use crate::graph::PortClass;
use thiserror::Error;

/// Structural violations detected while declaring nodes and connections.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    /// A port name appears twice within the same port class of one node.
    #[error("Node '{node}' declares {class} port '{port}' more than once; {class} port names must be unique")]
    DuplicatePort {
        node: String,
        port: String,
        class: PortClass,
    },

    /// A node id is declared twice in the same graph.
    #[error("Node '{node}' is already declared in graph '{graph}'")]
    DuplicateNode { graph: String, node: String },

    /// A node id that was never declared is referenced.
    #[error("Node '{node}' is not declared in graph '{graph}'")]
    UnknownNode { graph: String, node: String },

    /// A connection references a port the node does not declare.
    #[error("Node '{node}' has no {class} port named '{port}'")]
    UnknownPort {
        node: String,
        port: String,
        class: PortClass,
    },

    /// The destination input port already has an incoming connection.
    #[error("Input port '{node}.{port}' is already bound to '{existing}'; an input port accepts at most one connection")]
    PortAlreadyBound {
        node: String,
        port: String,
        existing: String,
    },

    /// The node's port set or bound configuration changed after a connection referenced it.
    #[error("Ports of node '{node}' are frozen: it is already referenced by a connection")]
    PortsFrozen { node: String },

    /// The connection would close a cycle.
    #[error("Connecting '{from}' to '{to}' would create a cycle: {}", cycle.join(" -> "))]
    Cycle {
        from: String,
        to: String,
        cycle: Vec<String>,
    },

    /// An attachment step expected a node or box that the parent graph does not contain.
    #[error("Attachment '{attachment}' requires '{node}', which is not present in graph '{graph}'")]
    MissingCollaborator {
        attachment: String,
        graph: String,
        node: String,
    },
}
