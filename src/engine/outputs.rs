// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;
use std::collections::BTreeMap;

use crate::graph::{NodeId, PortRef, PortValue, PortValues};

/// Outputs of every node that ran, keyed by node id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunOutputs {
    outputs: BTreeMap<NodeId, PortValues>,
}

impl RunOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, node: &NodeId) -> Option<&PortValues> {
        self.outputs.get(node)
    }

    /// The value a node produced on one output port.
    pub fn value(&self, port: &PortRef) -> Option<&PortValue> {
        self.outputs.get(&port.node)?.get(&port.port)
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &PortValues)> {
        self.outputs.iter()
    }

    pub(crate) fn insert(&mut self, node: NodeId, values: PortValues) {
        self.outputs.insert(node, values);
    }
}
