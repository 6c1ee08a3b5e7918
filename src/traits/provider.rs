use std::sync::Arc;

use crate::graph::{PortValue, PortValues, Transform};
use crate::traits::NodeBody;

/// Whether a tool is an external program interface or an in-process function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Interface,
    Function,
}

/// The fixed, documented port signature of an external tool plus its default settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub tool: String,
    pub kind: ToolKind,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub settings: PortValues,
}

impl ToolSpec {
    pub fn interface(tool: &str, inputs: &[&str], outputs: &[&str]) -> Self {
        Self::build(tool, ToolKind::Interface, inputs, outputs)
    }

    pub fn function(tool: &str, inputs: &[&str], outputs: &[&str]) -> Self {
        Self::build(tool, ToolKind::Function, inputs, outputs)
    }

    fn build(tool: &str, kind: ToolKind, inputs: &[&str], outputs: &[&str]) -> Self {
        Self {
            tool: tool.to_string(),
            kind,
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            outputs: outputs.iter().map(|s| s.to_string()).collect(),
            settings: PortValues::new(),
        }
    }

    /// Bind a default setting. The setting name must also be an input port.
    pub fn with(mut self, name: &str, value: impl Into<PortValue>) -> Self {
        self.settings.insert(name.to_string(), value.into());
        self
    }
}

/// Supplies bodies for tool nodes and functions for named connection transforms.
pub trait ToolProvider: Send + Sync {
    fn body(&self, spec: &ToolSpec) -> Arc<dyn NodeBody>;

    fn transform(&self, name: &str) -> Transform;
}
