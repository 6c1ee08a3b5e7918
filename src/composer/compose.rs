// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::composer::{BoxHandle, WorkflowBox};
use crate::errors::GraphError;
use crate::graph::Graph;
use crate::observability::messages::attachment::BoxComposed;
use crate::observability::messages::StructuredLog;

/// Move a box into `parent`, namespacing its nodes with the box name.
///
/// The returned handle is also registered on the parent so later attachment
/// steps can look the box up by name. Nothing is connected across the boundary;
/// wiring producers and consumers is up to the caller.
///
/// # Errors
/// `DuplicateNode` when a namespaced id already exists in the parent (for
/// example the same box composed twice). The parent is left unchanged.
pub fn compose_box(parent: &mut Graph, child: WorkflowBox) -> Result<BoxHandle, GraphError> {
    let handle = child.handle();
    let graph = child.into_graph();
    let (node_count, connection_count) = (graph.node_count(), graph.connections().len());

    parent.absorb(graph, handle.name())?;
    parent.register_box(handle.clone());

    BoxComposed {
        parent: parent.name(),
        box_name: handle.name(),
        node_count,
        connection_count,
    }
    .log();
    Ok(handle)
}
