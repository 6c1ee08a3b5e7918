// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The workflow graph: an ordered set of nodes plus the connections between their ports.
//!
//! All structural invariants are enforced at the moment a mutation is requested,
//! so a `Graph` value is valid after every successful call:
//!
//! 1. **Port uniqueness**: input names unique per node, output names unique per node
//! 2. **Declared ports only**: a connection references ports that exist on its endpoints
//! 3. **No fan-in**: an input port receives at most one connection (fan-out is fine)
//! 4. **Acyclic**: a connection that would close a cycle is rejected, checked
//!    incrementally by searching for a path from the destination node back to
//!    the source node
//! 5. **Freeze on connect**: once any connection references a node, its port set
//!    and bound configuration no longer change
//!
//! Nothing here executes a node. A finished graph is handed to an
//! [`Engine`](crate::traits::Engine) as an immutable borrow.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::composer::BoxHandle;
use crate::errors::GraphError;
use crate::graph::validation;
use crate::graph::{Connection, NodeDescriptor, NodeId, NodeSpec, PortClass, PortRef, PortValue, Transform};
use crate::observability::messages::graph::{
    ConnectionMade, ConstructionRejected, NodeDeclared, PortsExtended,
};
use crate::observability::messages::StructuredLog;

#[derive(Debug, Clone)]
pub struct Graph {
    name: String,
    nodes: Vec<NodeDescriptor>,
    index: HashMap<NodeId, usize>,
    connections: Vec<Connection>,
    successors: HashMap<NodeId, Vec<NodeId>>,
    boxes: Vec<BoxHandle>,
}

impl Graph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            index: HashMap::new(),
            connections: Vec::new(),
            successors: HashMap::new(),
            boxes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare a node with a fixed port signature.
    ///
    /// # Errors
    /// * `DuplicatePort` - a name repeats within the input or the output class
    /// * `DuplicateNode` - the id is already declared in this graph
    pub fn declare_node(&mut self, spec: NodeSpec) -> Result<NodeId, GraphError> {
        if self.index.contains_key(spec.id()) {
            return Err(self.reject(GraphError::DuplicateNode {
                graph: self.name.clone(),
                node: spec.id().to_string(),
            }));
        }
        let node = spec.into_descriptor().map_err(|e| self.reject(e))?;
        let id = node.id().clone();

        NodeDeclared {
            graph: &self.name,
            node_id: id.as_str(),
            body: node.body().name(),
            input_count: node.input_ports().len(),
            output_count: node.output_ports().len(),
        }
        .log();

        self.index.insert(id.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(id)
    }

    /// Add port names to a node that no connection references yet.
    ///
    /// Extended ports are structurally indistinguishable from ports declared up front.
    ///
    /// # Errors
    /// * `UnknownNode` - the node is not declared
    /// * `PortsFrozen` - a connection already references the node
    /// * `DuplicatePort` - a new name collides within its class; nothing is added
    pub fn extend_ports(
        &mut self,
        node: &NodeId,
        new_inputs: &[&str],
        new_outputs: &[&str],
    ) -> Result<(), GraphError> {
        let idx = self.index_of(node)?;
        let inputs: Vec<String> = new_inputs.iter().map(|s| s.to_string()).collect();
        let outputs: Vec<String> = new_outputs.iter().map(|s| s.to_string()).collect();
        if let Err(e) = self.nodes[idx].extend(&inputs, &outputs) {
            return Err(self.reject(e));
        }

        PortsExtended {
            graph: &self.name,
            node_id: node.as_str(),
            inputs: &inputs,
            outputs: &outputs,
        }
        .log();
        Ok(())
    }

    /// Extend an identity node with fields that are both inputs and outputs.
    pub fn extend_fields(&mut self, node: &NodeId, fields: &[&str]) -> Result<(), GraphError> {
        self.extend_ports(node, fields, fields)
    }

    /// Bind a literal value to an input port of a node that is not yet connected.
    pub fn bind(&mut self, node: &NodeId, port: &str, value: impl Into<PortValue>) -> Result<(), GraphError> {
        let idx = self.index_of(node)?;
        if let Err(e) = self.nodes[idx].bind(port, value.into()) {
            return Err(self.reject(e));
        }
        Ok(())
    }

    pub fn connect(&mut self, source: PortRef, target: PortRef) -> Result<(), GraphError> {
        self.connect_with(source, target, Transform::identity())
    }

    /// Record a connection whose value passes through `transform` on delivery.
    ///
    /// # Errors
    /// * `UnknownNode` - either endpoint is not declared
    /// * `UnknownPort` - the source output or the target input is not declared
    /// * `PortAlreadyBound` - the target input already has an incoming connection
    /// * `Cycle` - the target node can already reach the source node
    pub fn connect_with(
        &mut self,
        source: PortRef,
        target: PortRef,
        transform: Transform,
    ) -> Result<(), GraphError> {
        let src_idx = self.index_of(&source.node)?;
        let dst_idx = self.index_of(&target.node)?;

        if !self.nodes[src_idx].has_output(&source.port) {
            return Err(self.reject(GraphError::UnknownPort {
                node: source.node.to_string(),
                port: source.port.clone(),
                class: PortClass::Output,
            }));
        }
        if !self.nodes[dst_idx].has_input(&target.port) {
            return Err(self.reject(GraphError::UnknownPort {
                node: target.node.to_string(),
                port: target.port.clone(),
                class: PortClass::Input,
            }));
        }
        if let Some(existing) = self.incoming_to(&target) {
            return Err(self.reject(GraphError::PortAlreadyBound {
                node: target.node.to_string(),
                port: target.port.clone(),
                existing: existing.source.to_string(),
            }));
        }
        if let Some(path) = self.path_between(&target.node, &source.node) {
            let mut cycle = vec![source.node.to_string()];
            cycle.extend(path.into_iter().map(|n| n.0));
            return Err(self.reject(GraphError::Cycle {
                from: source.to_string(),
                to: target.to_string(),
                cycle,
            }));
        }

        self.nodes[src_idx].freeze();
        self.nodes[dst_idx].freeze();
        self.push_connection(Connection {
            source,
            target,
            transform,
        });
        Ok(())
    }

    /// Connect several `(source_output, target_input)` port pairs between two nodes.
    ///
    /// Stops at the first failing pair; pairs before it stay connected.
    pub fn connect_pairs(
        &mut self,
        source: &NodeId,
        target: &NodeId,
        pairs: &[(&str, &str)],
    ) -> Result<(), GraphError> {
        for (out_port, in_port) in pairs {
            self.connect(PortRef::new(source, *out_port), PortRef::new(target, *in_port))?;
        }
        Ok(())
    }

    pub fn node(&self, id: &NodeId) -> Result<&NodeDescriptor, GraphError> {
        let idx = self.index_of(id)?;
        Ok(&self.nodes[idx])
    }

    pub fn find_node(&self, id: &str) -> Option<&NodeDescriptor> {
        self.index.get(&NodeId::from(id)).map(|&idx| &self.nodes[idx])
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    /// Nodes in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeDescriptor> {
        self.nodes.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Connections in the order they were made.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn incoming_to(&self, target: &PortRef) -> Option<&Connection> {
        self.connections.iter().find(|c| &c.target == target)
    }

    pub fn incoming<'a>(&'a self, node: &'a NodeId) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.iter().filter(move |c| &c.target.node == node)
    }

    pub fn outgoing<'a>(&'a self, node: &'a NodeId) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.iter().filter(move |c| &c.source.node == node)
    }

    /// Distinct downstream neighbours of a node.
    pub fn successors(&self, node: &NodeId) -> &[NodeId] {
        self.successors.get(node).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Whether the node exposes the output port. Unknown nodes and absent ports both answer `false`.
    pub fn has_output(&self, node: &NodeId, port: &str) -> bool {
        self.index
            .get(node)
            .map(|&idx| self.nodes[idx].has_output(port))
            .unwrap_or(false)
    }

    pub fn is_reachable(&self, from: &NodeId, to: &NodeId) -> bool {
        self.path_between(from, to).is_some()
    }

    /// Full acyclicity sweep over the connection set.
    pub fn validate(&self) -> Result<(), GraphError> {
        validation::validate_acyclic(self)
    }

    /// Group nodes into levels where each level depends only on earlier ones.
    pub fn topological_levels(&self) -> Result<Vec<Vec<NodeId>>, GraphError> {
        validation::topological_levels(self)
    }

    /// Boxes composed into this graph, in composition order.
    pub fn boxes(&self) -> &[BoxHandle] {
        &self.boxes
    }

    pub fn find_box(&self, name: &str) -> Option<&BoxHandle> {
        self.boxes.iter().find(|b| b.name() == name)
    }

    /// Move every node, connection and nested box of `child` into this graph under `namespace`.
    ///
    /// Checked up front so a collision leaves this graph untouched.
    pub(crate) fn absorb(&mut self, child: Graph, namespace: &str) -> Result<(), GraphError> {
        for node in &child.nodes {
            let id = node.id().namespaced(namespace);
            if self.index.contains_key(&id) {
                return Err(self.reject(GraphError::DuplicateNode {
                    graph: self.name.clone(),
                    node: id.to_string(),
                }));
            }
        }

        for mut node in child.nodes {
            let id = node.id().namespaced(namespace);
            node.rename(id.clone());
            self.index.insert(id, self.nodes.len());
            self.nodes.push(node);
        }
        for conn in child.connections {
            self.push_connection(Connection {
                source: PortRef::new(conn.source.node.namespaced(namespace), conn.source.port),
                target: PortRef::new(conn.target.node.namespaced(namespace), conn.target.port),
                transform: conn.transform,
            });
        }
        for nested in child.boxes {
            self.boxes.push(nested.namespaced(namespace));
        }
        Ok(())
    }

    pub(crate) fn register_box(&mut self, handle: BoxHandle) {
        self.boxes.push(handle);
    }

    fn push_connection(&mut self, conn: Connection) {
        ConnectionMade {
            graph: &self.name,
            connection: &conn,
        }
        .log();

        let next = self.successors.entry(conn.source.node.clone()).or_default();
        if !next.contains(&conn.target.node) {
            next.push(conn.target.node.clone());
        }
        self.connections.push(conn);
    }

    fn index_of(&self, id: &NodeId) -> Result<usize, GraphError> {
        match self.index.get(id) {
            Some(&idx) => Ok(idx),
            None => Err(self.reject(GraphError::UnknownNode {
                graph: self.name.clone(),
                node: id.to_string(),
            })),
        }
    }

    /// Breadth-first search for a path of nodes `from ..= to`.
    fn path_between(&self, from: &NodeId, to: &NodeId) -> Option<Vec<NodeId>> {
        if from == to {
            return Some(vec![from.clone()]);
        }
        let mut parents: HashMap<&NodeId, &NodeId> = HashMap::new();
        let mut seen: HashSet<&NodeId> = HashSet::from([from]);
        let mut queue = VecDeque::from([from]);

        while let Some(current) = queue.pop_front() {
            for next in self.successors(current) {
                if !seen.insert(next) {
                    continue;
                }
                parents.insert(next, current);
                if next == to {
                    let mut path = vec![next.clone()];
                    let mut cursor = next;
                    while let Some(&parent) = parents.get(cursor) {
                        path.push(parent.clone());
                        cursor = parent;
                    }
                    path.reverse();
                    return Some(path);
                }
                queue.push_back(next);
            }
        }
        None
    }

    fn reject(&self, error: GraphError) -> GraphError {
        ConstructionRejected {
            graph: &self.name,
            error: &error,
        }
        .log();
        error
    }
}
