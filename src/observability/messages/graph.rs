// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for graph construction.
//!
//! This module contains message types for logging events related to:
//! * Node declaration
//! * Port extension on not-yet-connected nodes
//! * Connections between ports
//! * Rejected construction steps

use crate::errors::GraphError;
use crate::graph::Connection;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A node was declared.
///
/// # Log Level
/// `debug!` - Construction detail
pub struct NodeDeclared<'a> {
    pub graph: &'a str,
    pub node_id: &'a str,
    pub body: &'a str,
    pub input_count: usize,
    pub output_count: usize,
}

impl Display for NodeDeclared<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Declared node '{}' ({}) in '{}' with {} inputs and {} outputs",
            self.node_id, self.body, self.graph, self.input_count, self.output_count
        )
    }
}

impl StructuredLog for NodeDeclared<'_> {
    fn log(&self) {
        tracing::debug!(
            graph = self.graph,
            node_id = self.node_id,
            body = self.body,
            input_count = self.input_count,
            output_count = self.output_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "node_declared",
            span_name = name,
            graph = self.graph,
            node_id = self.node_id,
        )
    }
}

/// Ports were added to a node before it was connected.
///
/// # Log Level
/// `debug!` - Construction detail
///
/// # Example
/// ```
/// use the_boxwood::observability::messages::graph::PortsExtended;
///
/// let inputs = vec!["atlas_file".to_string()];
/// let msg = PortsExtended {
///     graph: "spm_anat_preproc",
///     node_id: "anat_input",
///     inputs: &inputs,
///     outputs: &inputs,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct PortsExtended<'a> {
    pub graph: &'a str,
    pub node_id: &'a str,
    pub inputs: &'a [String],
    pub outputs: &'a [String],
}

impl Display for PortsExtended<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Extended ports of '{}' in '{}': inputs [{}], outputs [{}]",
            self.node_id,
            self.graph,
            self.inputs.join(", "),
            self.outputs.join(", ")
        )
    }
}

impl StructuredLog for PortsExtended<'_> {
    fn log(&self) {
        tracing::debug!(
            graph = self.graph,
            node_id = self.node_id,
            inputs = self.inputs.join(","),
            outputs = self.outputs.join(","),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "ports_extended",
            span_name = name,
            graph = self.graph,
            node_id = self.node_id,
        )
    }
}

/// A connection was recorded.
///
/// # Log Level
/// `trace!` - High volume
pub struct ConnectionMade<'a> {
    pub graph: &'a str,
    pub connection: &'a Connection,
}

impl Display for ConnectionMade<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Connected {} in '{}'", self.connection, self.graph)
    }
}

impl StructuredLog for ConnectionMade<'_> {
    fn log(&self) {
        tracing::trace!(
            graph = self.graph,
            source_port = %self.connection.source,
            target_port = %self.connection.target,
            transform = self.connection.transform.name(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!(
            "connection_made",
            span_name = name,
            graph = self.graph,
            source_port = %self.connection.source,
            target_port = %self.connection.target,
        )
    }
}

/// A construction step violated a graph invariant and was refused.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ConstructionRejected<'a> {
    pub graph: &'a str,
    pub error: &'a GraphError,
}

impl Display for ConstructionRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Rejected construction step in '{}': {}", self.graph, self.error)
    }
}

impl StructuredLog for ConstructionRejected<'_> {
    fn log(&self) {
        tracing::error!(
            graph = self.graph,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "construction_rejected",
            span_name = name,
            graph = self.graph,
            error = %self.error,
        )
    }
}
