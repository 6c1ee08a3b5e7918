// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;

use crate::errors::GraphError;
use crate::graph::{Graph, NodeId, NodeSpec, PortRef};

/// Id and field list of one boundary node.
#[derive(Debug, Clone, Copy)]
pub struct Boundary<'a> {
    pub node: &'a str,
    pub fields: &'a [&'a str],
}

impl<'a> Boundary<'a> {
    pub fn new(node: &'a str, fields: &'a [&'a str]) -> Self {
        Self { node, fields }
    }
}

/// A named subgraph under construction, with its two boundary nodes already declared.
///
/// Inside the box, `input(field)` is read from and `output(field)` is written to:
///
/// ```
/// use the_boxwood::composer::{Boundary, WorkflowBox};
/// use the_boxwood::graph::{NodeSpec, PortRef};
///
/// let mut wf = WorkflowBox::new(
///     "copy",
///     Boundary::new("copy_input", &["in_file"]),
///     Boundary::new("copy_output", &["out_file"]),
/// )
/// .unwrap();
/// let step = wf
///     .graph_mut()
///     .declare_node(NodeSpec::identity("step", ["file"]))
///     .unwrap();
/// let (input, output) = (wf.input("in_file"), wf.output("out_file"));
/// wf.graph_mut().connect(input, PortRef::new(&step, "file")).unwrap();
/// wf.graph_mut().connect(PortRef::new(&step, "file"), output).unwrap();
/// assert_eq!(wf.graph().connections().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct WorkflowBox {
    graph: Graph,
    input_boundary: NodeId,
    output_boundary: NodeId,
}

impl WorkflowBox {
    pub fn new(name: &str, input: Boundary<'_>, output: Boundary<'_>) -> Result<Self, GraphError> {
        let mut graph = Graph::new(name);
        let input_boundary = graph.declare_node(NodeSpec::identity(input.node, input.fields.iter().copied()))?;
        let output_boundary = graph.declare_node(NodeSpec::identity(output.node, output.fields.iter().copied()))?;
        Ok(Self {
            graph,
            input_boundary,
            output_boundary,
        })
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

    pub fn input_boundary(&self) -> &NodeId {
        &self.input_boundary
    }

    pub fn output_boundary(&self) -> &NodeId {
        &self.output_boundary
    }

    /// The input boundary port carrying an external input into the box.
    pub fn input(&self, field: &str) -> PortRef {
        PortRef::new(&self.input_boundary, field)
    }

    /// The output boundary port exposing a result of the box.
    pub fn output(&self, field: &str) -> PortRef {
        PortRef::new(&self.output_boundary, field)
    }

    /// Add external inputs. Only valid before anything is connected to the input boundary.
    pub fn extend_inputs(&mut self, fields: &[&str]) -> Result<(), GraphError> {
        let boundary = self.input_boundary.clone();
        self.graph.extend_fields(&boundary, fields)
    }

    /// Add external outputs. Only valid before anything is connected to the output boundary.
    pub fn extend_outputs(&mut self, fields: &[&str]) -> Result<(), GraphError> {
        let boundary = self.output_boundary.clone();
        self.graph.extend_fields(&boundary, fields)
    }

    pub fn has_input(&self, field: &str) -> bool {
        self.graph.has_output(&self.input_boundary, field)
    }

    pub fn has_output(&self, field: &str) -> bool {
        self.graph.has_output(&self.output_boundary, field)
    }

    pub(crate) fn into_graph(self) -> Graph {
        self.graph
    }

    /// The contract of this box as it will look once composed under its own name.
    pub(crate) fn handle(&self) -> BoxHandle {
        let fields = |id: &NodeId| {
            self.graph
                .node(id)
                .map(|n| n.output_ports().to_vec())
                .unwrap_or_default()
        };
        BoxHandle {
            name: self.name().to_string(),
            input_boundary: self.input_boundary.namespaced(self.name()),
            output_boundary: self.output_boundary.namespaced(self.name()),
            input_fields: fields(&self.input_boundary),
            output_fields: fields(&self.output_boundary),
        }
    }
}

/// The narrow contract of a composed box, as seen from its parent graph.
///
/// From the parent, `input(field)` is a connection target and `output(field)`
/// a connection source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoxHandle {
    name: String,
    input_boundary: NodeId,
    output_boundary: NodeId,
    input_fields: Vec<String>,
    output_fields: Vec<String>,
}

impl BoxHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input_boundary(&self) -> &NodeId {
        &self.input_boundary
    }

    pub fn output_boundary(&self) -> &NodeId {
        &self.output_boundary
    }

    pub fn input_fields(&self) -> &[String] {
        &self.input_fields
    }

    pub fn output_fields(&self) -> &[String] {
        &self.output_fields
    }

    pub fn input(&self, field: &str) -> PortRef {
        PortRef::new(&self.input_boundary, field)
    }

    pub fn output(&self, field: &str) -> PortRef {
        PortRef::new(&self.output_boundary, field)
    }

    pub fn has_input(&self, field: &str) -> bool {
        self.input_fields.iter().any(|f| f == field)
    }

    /// Absence of an optional output means the feature was not requested.
    pub fn has_output(&self, field: &str) -> bool {
        self.output_fields.iter().any(|f| f == field)
    }

    /// This handle after its parent was itself composed under `namespace`.
    pub(crate) fn namespaced(&self, namespace: &str) -> Self {
        Self {
            name: format!("{}.{}", namespace, self.name),
            input_boundary: self.input_boundary.namespaced(namespace),
            output_boundary: self.output_boundary.namespaced(namespace),
            input_fields: self.input_fields.clone(),
            output_fields: self.output_fields.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anat_box() -> WorkflowBox {
        WorkflowBox::new(
            "spm_anat_preproc",
            Boundary::new("anat_input", &["in_file"]),
            Boundary::new("anat_output", &["anat_mni", "brain_mask"]),
        )
        .unwrap()
    }

    #[test]
    fn boundaries_are_identity_nodes() {
        let wf = anat_box();
        let input = wf.graph().node(wf.input_boundary()).unwrap();
        assert_eq!(input.body().name(), "identity");
        assert!(input.has_input("in_file") && input.has_output("in_file"));
        assert!(wf.has_output("brain_mask"));
        assert!(!wf.has_output("atlas_anat"));
    }

    #[test]
    fn extension_shows_up_in_the_handle() {
        let mut wf = anat_box();
        wf.extend_inputs(&["atlas_file"]).unwrap();
        wf.extend_outputs(&["atlas_anat"]).unwrap();
        let handle = wf.handle();
        assert_eq!(handle.input_boundary(), &NodeId::from("spm_anat_preproc.anat_input"));
        assert!(handle.has_input("atlas_file"));
        assert!(handle.has_output("atlas_anat"));
        assert_eq!(
            handle.output("atlas_anat"),
            PortRef::new("spm_anat_preproc.anat_output", "atlas_anat")
        );
    }

    #[test]
    fn boundary_fields_must_be_unique() {
        let err = WorkflowBox::new(
            "bad",
            Boundary::new("bad_input", &["x", "x"]),
            Boundary::new("bad_output", &["y"]),
        )
        .unwrap_err();
        assert!(matches!(err, GraphError::DuplicatePort { .. }));
    }

    #[test]
    fn nested_handles_prefix_name_and_nodes() {
        let nested = anat_box().handle().namespaced("outer");
        assert_eq!(nested.name(), "outer.spm_anat_preproc");
        assert_eq!(
            nested.output_boundary(),
            &NodeId::from("outer.spm_anat_preproc.anat_output")
        );
    }
}
