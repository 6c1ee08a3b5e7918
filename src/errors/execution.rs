// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors reported by the bundled reference engine.
//!
//! These never arise during graph construction; they describe what went
//! wrong while running node bodies.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutionError {
    /// A node body returned an error.
    #[error("Node '{node_id}' failed: {message}")]
    NodeFailed { node_id: String, message: String },

    /// A connection's source node finished without the output the connection reads.
    #[error("Node '{node_id}' did not produce output '{port}' required by '{consumer}'")]
    MissingOutput {
        node_id: String,
        port: String,
        consumer: String,
    },

    /// A connection transform rejected the value in transit.
    #[error("Transform '{transform}' on connection '{connection}' failed: {message}")]
    TransformFailed {
        transform: String,
        connection: String,
        message: String,
    },

    /// A node wraps an external tool but no runner was provided for it.
    #[error("No runner is attached for external tool '{tool}'")]
    ToolUnavailable { tool: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExecutionError {
    /// The node the failure is attributed to, when there is one.
    pub fn node_id(&self) -> Option<&str> {
        match self {
            ExecutionError::NodeFailed { node_id, .. } => Some(node_id),
            ExecutionError::MissingOutput { consumer, .. } => Some(consumer),
            _ => None,
        }
    }
}
