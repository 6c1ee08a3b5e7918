// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::backends::local::{Collector, Identity};
use crate::errors::GraphError;
use crate::graph::{NodeId, PortClass, PortValue, PortValues};
use crate::traits::NodeBody;
use std::fmt;
use std::sync::Arc;

/// Everything needed to declare a node: id, port signature, bound settings, and body.
///
/// ```
/// use the_boxwood::graph::NodeSpec;
/// use the_boxwood::backends::local::Identity;
/// use std::sync::Arc;
///
/// let spec = NodeSpec::new("tissues", Arc::new(Identity))
///     .inputs(["gm", "wm", "csf"])
///     .outputs(["gm", "wm", "csf"]);
/// assert_eq!(spec.input_ports().len(), 3);
/// ```
#[derive(Clone)]
pub struct NodeSpec {
    id: NodeId,
    inputs: Vec<String>,
    outputs: Vec<String>,
    open_inputs: bool,
    bound_config: PortValues,
    body: Arc<dyn NodeBody>,
}

impl NodeSpec {
    pub fn new(id: impl Into<NodeId>, body: Arc<dyn NodeBody>) -> Self {
        Self {
            id: id.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            open_inputs: false,
            bound_config: PortValues::new(),
            body,
        }
    }

    /// An identity pass-through exposing every field as both an input and an output port.
    pub fn identity<I, S>(id: impl Into<NodeId>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        Self::new(id, Arc::new(Identity))
            .inputs(fields.clone())
            .outputs(fields)
    }

    /// A collector whose input port set is open: any destination name is accepted.
    ///
    /// This is how a data sink receives `(category, file)` pairs whose categories are
    /// only known when each workflow attaches.
    pub fn collector(id: impl Into<NodeId>) -> Self {
        let mut spec = Self::new(id, Arc::new(Collector));
        spec.open_inputs = true;
        spec
    }

    pub fn inputs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn outputs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outputs.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn bind(mut self, name: impl Into<String>, value: impl Into<PortValue>) -> Self {
        self.bound_config.insert(name.into(), value.into());
        self
    }

    pub fn bind_all(mut self, values: PortValues) -> Self {
        self.bound_config.extend(values);
        self
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn input_ports(&self) -> &[String] {
        &self.inputs
    }

    pub fn output_ports(&self) -> &[String] {
        &self.outputs
    }

    pub(crate) fn into_descriptor(self) -> Result<NodeDescriptor, GraphError> {
        check_unique(&self.id, &self.inputs, PortClass::Input)?;
        check_unique(&self.id, &self.outputs, PortClass::Output)?;
        Ok(NodeDescriptor {
            id: self.id,
            inputs: self.inputs,
            outputs: self.outputs,
            open_inputs: self.open_inputs,
            bound_config: self.bound_config,
            body: self.body,
            frozen: false,
        })
    }
}

fn check_unique(node: &NodeId, names: &[String], class: PortClass) -> Result<(), GraphError> {
    for (i, name) in names.iter().enumerate() {
        if names[..i].contains(name) {
            return Err(GraphError::DuplicatePort {
                node: node.to_string(),
                port: name.clone(),
                class,
            });
        }
    }
    Ok(())
}

/// A declared node inside a [`Graph`](crate::graph::Graph).
///
/// The port set may grow until the first connection references the node;
/// from then on the descriptor is frozen.
#[derive(Clone)]
pub struct NodeDescriptor {
    id: NodeId,
    inputs: Vec<String>,
    outputs: Vec<String>,
    open_inputs: bool,
    bound_config: PortValues,
    body: Arc<dyn NodeBody>,
    frozen: bool,
}

impl NodeDescriptor {
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn input_ports(&self) -> &[String] {
        &self.inputs
    }

    pub fn output_ports(&self) -> &[String] {
        &self.outputs
    }

    pub fn accepts_any_input(&self) -> bool {
        self.open_inputs
    }

    pub fn has_input(&self, name: &str) -> bool {
        self.open_inputs || self.inputs.iter().any(|p| p == name)
    }

    pub fn has_output(&self, name: &str) -> bool {
        self.outputs.iter().any(|p| p == name)
    }

    pub fn bound_config(&self) -> &PortValues {
        &self.bound_config
    }

    pub fn body(&self) -> &Arc<dyn NodeBody> {
        &self.body
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub(crate) fn freeze(&mut self) {
        self.frozen = true;
    }

    pub(crate) fn rename(&mut self, id: NodeId) {
        self.id = id;
    }

    /// Add port names. All-or-nothing: nothing changes when any name collides.
    pub(crate) fn extend(&mut self, new_inputs: &[String], new_outputs: &[String]) -> Result<(), GraphError> {
        if self.frozen {
            return Err(GraphError::PortsFrozen {
                node: self.id.to_string(),
            });
        }
        let mut inputs = self.inputs.clone();
        inputs.extend(new_inputs.iter().cloned());
        let mut outputs = self.outputs.clone();
        outputs.extend(new_outputs.iter().cloned());
        check_unique(&self.id, &inputs, PortClass::Input)?;
        check_unique(&self.id, &outputs, PortClass::Output)?;
        self.inputs = inputs;
        self.outputs = outputs;
        Ok(())
    }

    pub(crate) fn bind(&mut self, name: &str, value: PortValue) -> Result<(), GraphError> {
        if self.frozen {
            return Err(GraphError::PortsFrozen {
                node: self.id.to_string(),
            });
        }
        if !self.has_input(name) {
            return Err(GraphError::UnknownPort {
                node: self.id.to_string(),
                port: name.to_string(),
                class: PortClass::Input,
            });
        }
        self.bound_config.insert(name.to_string(), value);
        Ok(())
    }
}

impl fmt::Debug for NodeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeDescriptor")
            .field("id", &self.id)
            .field("body", &self.body.name())
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("open_inputs", &self.open_inputs)
            .field("bound_config", &self.bound_config)
            .field("frozen", &self.frozen)
            .finish()
    }
}
