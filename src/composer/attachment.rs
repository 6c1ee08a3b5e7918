// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;

use crate::composer::{BoxHandle, MainWorkflow};
use crate::errors::{BuildError, ConfigError, GraphError};
use crate::graph::{NodeId, PortRef};
use crate::observability::messages::attachment::WorkflowAttached;
use crate::observability::messages::StructuredLog;
use crate::rename::RenameRule;

/// One connection across a box boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundaryMapping {
    pub source: PortRef,
    pub target: PortRef,
}

/// How a box was wired into the main workflow.
///
/// `inbound` maps parent producers onto the box input boundary, `outbound`
/// maps the box output boundary onto consumers (usually sink categories), and
/// `rules` are the instantiated rename rules the attachment declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentRecord {
    pub workflow: String,
    pub inbound: Vec<BoundaryMapping>,
    pub outbound: Vec<BoundaryMapping>,
    pub rules: Vec<RenameRule>,
}

/// Builder wiring one composed box into a [`MainWorkflow`].
///
/// Obtained from [`MainWorkflow::attach`]; finished with [`Attachment::finish`],
/// which stores the [`AttachmentRecord`] on the workflow.
pub struct Attachment<'w> {
    main: &'w mut MainWorkflow,
    handle: BoxHandle,
    record: AttachmentRecord,
}

impl<'w> Attachment<'w> {
    pub(crate) fn new(main: &'w mut MainWorkflow, handle: BoxHandle) -> Self {
        let record = AttachmentRecord {
            workflow: handle.name().to_string(),
            inbound: Vec::new(),
            outbound: Vec::new(),
            rules: Vec::new(),
        };
        Self { main, handle, record }
    }

    pub fn handle(&self) -> &BoxHandle {
        &self.handle
    }

    /// Connect a parent producer port to a box input field.
    pub fn feed(&mut self, source: PortRef, field: &str) -> Result<&mut Self, GraphError> {
        let target = self.handle.input(field);
        self.main.graph_mut().connect(source.clone(), target.clone())?;
        self.record.inbound.push(BoundaryMapping { source, target });
        Ok(self)
    }

    /// Connect a configured input file to a box input field.
    ///
    /// # Errors
    /// `MissingInput` when the run does not provide `modality`.
    pub fn feed_input(&mut self, modality: &str, field: &str) -> Result<&mut Self, BuildError> {
        let source = self.main.input_port(self.handle.name(), modality)?;
        Ok(self.feed(source, field)?)
    }

    /// Connect a box output field to a sink category.
    pub fn drain(&mut self, field: &str, category: &str) -> Result<&mut Self, GraphError> {
        let target = PortRef::new(self.main.datasink(), category);
        self.connect_output(field, target)
    }

    /// Drain an optional output only when the box exposes it.
    ///
    /// Returns whether a connection was made; absence is not an error.
    pub fn drain_if_present(&mut self, field: &str, category: &str) -> Result<bool, GraphError> {
        let exposed = self
            .main
            .graph()
            .has_output(self.handle.output_boundary(), field);
        if exposed {
            self.drain(field, category)?;
        }
        Ok(exposed)
    }

    /// Connect a box output field to any consumer port in the parent.
    pub fn connect_output(&mut self, field: &str, target: PortRef) -> Result<&mut Self, GraphError> {
        let source = self.handle.output(field);
        self.main.graph_mut().connect(source.clone(), target.clone())?;
        self.record.outbound.push(BoundaryMapping { source, target });
        Ok(self)
    }

    /// Install instantiated rename rules on the sink, followed by their compressed variants.
    pub fn rename_rules(&mut self, rules: Vec<RenameRule>) -> Result<&mut Self, ConfigError> {
        self.main
            .sink_mut()
            .install_rules(self.handle.name(), rules.clone())?;
        self.record.rules.extend(rules);
        Ok(self)
    }

    pub fn datasink(&self) -> &NodeId {
        self.main.datasink()
    }

    pub fn finish(self) -> AttachmentRecord {
        WorkflowAttached {
            workflow: &self.record.workflow,
            inbound: self.record.inbound.len(),
            outbound: self.record.outbound.len(),
            rule_count: self.record.rules.len(),
        }
        .log();
        self.main.record(self.record.clone());
        self.record
    }
}
