// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for box composition and workflow attachment.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A box was composed into a parent graph.
///
/// # Log Level
/// `info!` - Important operational event
pub struct BoxComposed<'a> {
    pub parent: &'a str,
    pub box_name: &'a str,
    pub node_count: usize,
    pub connection_count: usize,
}

impl Display for BoxComposed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Composed box '{}' into '{}': {} nodes, {} internal connections",
            self.box_name, self.parent, self.node_count, self.connection_count
        )
    }
}

impl StructuredLog for BoxComposed<'_> {
    fn log(&self) {
        tracing::info!(
            parent_graph = self.parent,
            box_name = self.box_name,
            node_count = self.node_count,
            connection_count = self.connection_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "box_composed",
            span_name = name,
            parent_graph = self.parent,
            box_name = self.box_name,
        )
    }
}

/// An optional branch was attached because its configuration predicate held.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_boxwood::observability::messages::attachment::OptionalBranchAttached;
///
/// let msg = OptionalBranchAttached {
///     workflow: "spm_anat_preproc",
///     branch: "atlas",
///     inputs: &["atlas_file"],
///     outputs: &["atlas_anat"],
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct OptionalBranchAttached<'a> {
    pub workflow: &'a str,
    pub branch: &'a str,
    pub inputs: &'a [&'a str],
    pub outputs: &'a [&'a str],
}

impl Display for OptionalBranchAttached<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Attached optional '{}' branch to '{}' (inputs [{}], outputs [{}])",
            self.branch,
            self.workflow,
            self.inputs.join(", "),
            self.outputs.join(", ")
        )
    }
}

impl StructuredLog for OptionalBranchAttached<'_> {
    fn log(&self) {
        tracing::info!(
            workflow = self.workflow,
            branch = self.branch,
            inputs = self.inputs.join(","),
            outputs = self.outputs.join(","),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "optional_branch",
            span_name = name,
            workflow = self.workflow,
            branch = self.branch,
            attached = true,
        )
    }
}

/// An optional branch was left out.
///
/// # Log Level
/// `info!` - Important operational event
pub struct OptionalBranchSkipped<'a> {
    pub workflow: &'a str,
    pub branch: &'a str,
    pub reason: &'a str,
}

impl Display for OptionalBranchSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Skipped optional '{}' branch of '{}': {}",
            self.branch, self.workflow, self.reason
        )
    }
}

impl StructuredLog for OptionalBranchSkipped<'_> {
    fn log(&self) {
        tracing::info!(
            workflow = self.workflow,
            branch = self.branch,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "optional_branch",
            span_name = name,
            workflow = self.workflow,
            branch = self.branch,
            attached = false,
        )
    }
}

/// A workflow box finished attaching to the main workflow.
///
/// # Log Level
/// `info!` - Important operational event
pub struct WorkflowAttached<'a> {
    pub workflow: &'a str,
    pub inbound: usize,
    pub outbound: usize,
    pub rule_count: usize,
}

impl Display for WorkflowAttached<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Attached '{}': {} inbound, {} outbound connections, {} rename rules",
            self.workflow, self.inbound, self.outbound, self.rule_count
        )
    }
}

impl StructuredLog for WorkflowAttached<'_> {
    fn log(&self) {
        tracing::info!(
            workflow = self.workflow,
            inbound = self.inbound,
            outbound = self.outbound,
            rule_count = self.rule_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "workflow_attached",
            span_name = name,
            workflow = self.workflow,
        )
    }
}
