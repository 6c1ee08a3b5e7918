// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::Arc;

use super::bodies::DeferredTool;
use crate::graph::Transform;
use crate::traits::{NodeBody, ToolProvider, ToolSpec};

/// Registry of tool bodies and named transforms.
///
/// Tools without a registered body resolve to a [`DeferredTool`], so a workflow
/// can always be assembled and inspected; only running it needs real runners.
/// The default registry is empty, which makes every tool deferred.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    bodies: HashMap<String, Arc<dyn NodeBody>>,
    transforms: HashMap<String, Transform>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_body(&mut self, tool: impl Into<String>, body: Arc<dyn NodeBody>) -> &mut Self {
        self.bodies.insert(tool.into(), body);
        self
    }

    pub fn register_transform(&mut self, transform: Transform) -> &mut Self {
        self.transforms.insert(transform.name().to_string(), transform);
        self
    }

    /// Tools with a registered body, sorted.
    pub fn registered_tools(&self) -> Vec<&str> {
        let mut tools: Vec<&str> = self.bodies.keys().map(|s| s.as_str()).collect();
        tools.sort_unstable();
        tools
    }
}

impl ToolProvider for ToolRegistry {
    fn body(&self, spec: &ToolSpec) -> Arc<dyn NodeBody> {
        match self.bodies.get(&spec.tool) {
            Some(body) => body.clone(),
            None => Arc::new(DeferredTool::new(spec.tool.clone())),
        }
    }

    fn transform(&self, name: &str) -> Transform {
        match self.transforms.get(name) {
            Some(t) => t.clone(),
            None => {
                let missing = name.to_string();
                Transform::new(name, move |_| {
                    Err(format!("no implementation registered for transform '{}'", missing))
                })
            }
        }
    }
}
