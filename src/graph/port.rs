// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Newtype wrapper for node identifiers providing type safety.
///
/// Ids of nodes that belong to a composed box are namespaced with the box
/// name, e.g. `spm_anat_preproc.anat_input`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prefix this id with a box name.
    pub fn namespaced(&self, namespace: &str) -> Self {
        Self(format!("{}.{}", namespace, self.0))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&NodeId> for NodeId {
    fn from(id: &NodeId) -> Self {
        id.clone()
    }
}

/// The two port classes of a node. Names are unique within a class only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortClass {
    Input,
    Output,
}

impl fmt::Display for PortClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortClass::Input => f.write_str("input"),
            PortClass::Output => f.write_str("output"),
        }
    }
}

/// A `(node, port)` pair naming one slot of one node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortRef {
    pub node: NodeId,
    pub port: String,
}

impl PortRef {
    pub fn new(node: impl Into<NodeId>, port: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            port: port.into(),
        }
    }
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node, self.port)
    }
}

/// A value travelling along a connection or bound as node configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PortValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Path(PathBuf),
    List(Vec<PortValue>),
}

impl PortValue {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        PortValue::Path(path.into())
    }

    pub fn text(text: impl Into<String>) -> Self {
        PortValue::Text(text.into())
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            PortValue::Path(p) => Some(p.as_path()),
            _ => None,
        }
    }

    /// All file paths carried by this value, flattening nested lists in order.
    pub fn paths(&self) -> Vec<&Path> {
        match self {
            PortValue::Path(p) => vec![p.as_path()],
            PortValue::List(items) => items.iter().flat_map(|v| v.paths()).collect(),
            _ => Vec::new(),
        }
    }
}

impl From<bool> for PortValue {
    fn from(v: bool) -> Self {
        PortValue::Bool(v)
    }
}

impl From<i64> for PortValue {
    fn from(v: i64) -> Self {
        PortValue::Int(v)
    }
}

impl From<f64> for PortValue {
    fn from(v: f64) -> Self {
        PortValue::Float(v)
    }
}

impl From<&str> for PortValue {
    fn from(v: &str) -> Self {
        PortValue::Text(v.to_string())
    }
}

impl From<String> for PortValue {
    fn from(v: String) -> Self {
        PortValue::Text(v)
    }
}

impl From<PathBuf> for PortValue {
    fn from(v: PathBuf) -> Self {
        PortValue::Path(v)
    }
}

impl From<&Path> for PortValue {
    fn from(v: &Path) -> Self {
        PortValue::Path(v.to_path_buf())
    }
}

impl<T: Into<PortValue>> From<Vec<T>> for PortValue {
    fn from(v: Vec<T>) -> Self {
        PortValue::List(v.into_iter().map(Into::into).collect())
    }
}

/// Named values keyed by port name, ordered for deterministic output.
pub type PortValues = BTreeMap<String, PortValue>;
