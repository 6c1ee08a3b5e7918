// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::{Path, PathBuf};

use crate::composer::{compose_box, Attachment, AttachmentRecord, BoxHandle, WorkflowBox};
use crate::config::consts::{DATASINK_NODE, INPUT_FILES_NODE, MAIN_WORKFLOW_NAME};
use crate::config::PipelineConfig;
use crate::errors::{BuildError, ConfigError, GraphError};
use crate::graph::{Graph, NodeId, NodeSpec, PortRef, PortValue};
use crate::rename::DataSink;

/// The parent graph workflow boxes attach to.
///
/// Holds an `input_files` identity node exposing one port per configured
/// modality (each bound to its file), a `datasink` collector accepting any
/// category name, the [`DataSink`] with the rename rules accumulated so far,
/// and a record of every attachment.
#[derive(Debug)]
pub struct MainWorkflow {
    graph: Graph,
    input_files: NodeId,
    datasink: NodeId,
    sink: DataSink,
    attachments: Vec<AttachmentRecord>,
}

impl MainWorkflow {
    /// Declare the input and sink nodes of a new main workflow.
    pub fn new(name: &str, inputs: &[(String, PathBuf)], sink: DataSink) -> Result<Self, GraphError> {
        let mut graph = Graph::new(name);

        let mut input_spec = NodeSpec::identity(INPUT_FILES_NODE, inputs.iter().map(|(m, _)| m.as_str()));
        for (modality, path) in inputs {
            input_spec = input_spec.bind(modality.as_str(), PortValue::path(path.clone()));
        }
        let input_files = graph.declare_node(input_spec)?;
        let datasink = graph.declare_node(NodeSpec::collector(DATASINK_NODE))?;

        Ok(Self {
            graph,
            input_files,
            datasink,
            sink,
            attachments: Vec::new(),
        })
    }

    /// The main workflow of a run: resolved input files and a sink below the output directory.
    pub fn in_out(config: &PipelineConfig) -> Result<Self, BuildError> {
        let mut sink = DataSink::new(config.resolved_output_dir())
            .with_warn_unmatched(config.sink.warn_unmatched);
        if let Some(subject) = &config.subject {
            sink = sink.with_container(subject.clone());
        }
        Ok(Self::new(MAIN_WORKFLOW_NAME, &config.resolved_inputs(), sink)?)
    }

    pub fn name(&self) -> &str {
        self.graph.name()
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    pub fn input_files(&self) -> &NodeId {
        &self.input_files
    }

    pub fn datasink(&self) -> &NodeId {
        &self.datasink
    }

    pub fn sink(&self) -> &DataSink {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut DataSink {
        &mut self.sink
    }

    pub fn attachments(&self) -> &[AttachmentRecord] {
        &self.attachments
    }

    /// The file bound to an input modality.
    pub fn input_file(&self, modality: &str) -> Option<&Path> {
        self.graph
            .node(&self.input_files)
            .ok()?
            .bound_config()
            .get(modality)?
            .as_path()
    }

    /// The `input_files` port of a modality, on behalf of `workflow`.
    ///
    /// # Errors
    /// `MissingInput` when the run does not provide the modality.
    pub fn input_port(&self, workflow: &str, modality: &str) -> Result<PortRef, ConfigError> {
        if self.graph.has_output(&self.input_files, modality) {
            Ok(PortRef::new(&self.input_files, modality))
        } else {
            Err(ConfigError::MissingInput {
                workflow: workflow.to_string(),
                modality: modality.to_string(),
            })
        }
    }

    /// Compose a box into the main graph.
    pub fn compose(&mut self, child: WorkflowBox) -> Result<BoxHandle, GraphError> {
        compose_box(&mut self.graph, child)
    }

    /// Look up a previously composed box that `attachment` depends on.
    ///
    /// # Errors
    /// `MissingCollaborator` when no box of that name was composed.
    pub fn require_box(&self, attachment: &str, name: &str) -> Result<BoxHandle, GraphError> {
        match self.graph.find_box(name) {
            Some(handle) => Ok(handle.clone()),
            None => Err(GraphError::MissingCollaborator {
                attachment: attachment.to_string(),
                graph: self.graph.name().to_string(),
                node: name.to_string(),
            }),
        }
    }

    /// Start wiring a composed box into this workflow.
    pub fn attach(&mut self, handle: BoxHandle) -> Attachment<'_> {
        Attachment::new(self, handle)
    }

    pub(crate) fn record(&mut self, record: AttachmentRecord) {
        self.attachments.push(record);
    }

    /// Hand the finished graph to an engine and the sink to post-processing.
    pub fn into_parts(self) -> (Graph, DataSink) {
        (self.graph, self.sink)
    }
}
