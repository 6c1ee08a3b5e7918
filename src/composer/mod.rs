// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Subgraph ("box") composition and workflow attachment.
//!
//! A box is a graph built in isolation that exposes exactly two identity
//! nodes: an input boundary and an output boundary. Composing a box into a
//! parent namespaces its nodes with the box name and returns a [`BoxHandle`]
//! through which the parent wires producers into the box and the box into
//! consumers. Because every connection only references already-declared
//! ports, the order in which boxes are composed does not change the final graph.
//!
//! [`MainWorkflow`] is the parent every bundled workflow attaches to: an
//! `input_files` node exposing the run's files, a `datasink` collector and the
//! [`DataSink`](crate::rename::DataSink) holding the accumulated rename rules.

mod attachment;
mod boxes;
mod compose;
mod workflow;

#[cfg(test)]
mod integration_tests;

pub use attachment::{Attachment, AttachmentRecord, BoundaryMapping};
pub use boxes::{Boundary, BoxHandle, WorkflowBox};
pub use compose::compose_box;
pub use workflow::MainWorkflow;
