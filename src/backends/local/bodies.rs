// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::ExecutionError;
use crate::graph::PortValues;
use crate::traits::NodeBody;

/// Pass-through body used by box boundaries: every input reappears as the output of the same name.
pub struct Identity;

#[async_trait]
impl NodeBody for Identity {
    async fn run(&self, inputs: PortValues) -> Result<PortValues, String> {
        Ok(inputs)
    }

    fn name(&self) -> &str {
        "identity"
    }
}

/// Sink body: echoes whatever categories it received so the data sink can resolve them after the run.
pub struct Collector;

#[async_trait]
impl NodeBody for Collector {
    async fn run(&self, inputs: PortValues) -> Result<PortValues, String> {
        Ok(inputs)
    }

    fn name(&self) -> &str {
        "collector"
    }
}

type BodyFn = dyn Fn(PortValues) -> Result<PortValues, String> + Send + Sync;

/// A pure in-process function over port values.
pub struct FunctionBody {
    name: String,
    func: Arc<BodyFn>,
}

impl FunctionBody {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(PortValues) -> Result<PortValues, String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }
}

#[async_trait]
impl NodeBody for FunctionBody {
    async fn run(&self, inputs: PortValues) -> Result<PortValues, String> {
        (self.func)(inputs)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// An external tool with no runner attached. Declaring it is fine; running it fails.
pub struct DeferredTool {
    tool: String,
}

impl DeferredTool {
    pub fn new(tool: impl Into<String>) -> Self {
        Self { tool: tool.into() }
    }
}

#[async_trait]
impl NodeBody for DeferredTool {
    async fn run(&self, _inputs: PortValues) -> Result<PortValues, String> {
        Err(ExecutionError::ToolUnavailable {
            tool: self.tool.clone(),
        }
        .to_string())
    }

    fn name(&self) -> &str {
        &self.tool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::PortValue;

    #[tokio::test]
    async fn identity_echoes_inputs() {
        let inputs = PortValues::from([("in_file".to_string(), PortValue::path("/d/anat.nii"))]);
        assert_eq!(Identity.run(inputs.clone()).await.unwrap(), inputs);
    }

    #[tokio::test]
    async fn function_body_calls_its_closure() {
        let body = FunctionBody::new("count", |inputs: PortValues| {
            Ok(PortValues::from([(
                "count".to_string(),
                PortValue::Int(inputs.len() as i64),
            )]))
        });
        let out = body
            .run(PortValues::from([("a".to_string(), PortValue::Bool(true))]))
            .await
            .unwrap();
        assert_eq!(out.get("count"), Some(&PortValue::Int(1)));
        assert_eq!(body.name(), "count");
    }

    #[tokio::test]
    async fn deferred_tool_fails_when_run() {
        let err = DeferredTool::new("N4BiasFieldCorrection")
            .run(PortValues::new())
            .await
            .unwrap_err();
        assert_eq!(err, "No runner is attached for external tool 'N4BiasFieldCorrection'");
    }
}
