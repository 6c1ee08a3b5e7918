// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::graph::PortValues;
use crate::traits::NodeBody;

/// Returns the same outputs on every run, ignoring its inputs.
pub struct StaticOutputs {
    pub name: String,
    pub outputs: PortValues,
}

impl StaticOutputs {
    pub fn new(name: &str, outputs: PortValues) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            outputs,
        })
    }
}

#[async_trait]
impl NodeBody for StaticOutputs {
    async fn run(&self, _inputs: PortValues) -> Result<PortValues, String> {
        Ok(self.outputs.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A body that always fails, for error handling tests.
pub struct FailingBody;

#[async_trait]
impl NodeBody for FailingBody {
    async fn run(&self, _inputs: PortValues) -> Result<PortValues, String> {
        Err("Simulated tool failure".to_string())
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Echoes its inputs and keeps a copy of every input set it was called with.
#[derive(Default)]
pub struct RecordingBody {
    pub calls: Mutex<Vec<PortValues>>,
}

impl RecordingBody {
    pub fn calls(&self) -> Vec<PortValues> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl NodeBody for RecordingBody {
    async fn run(&self, inputs: PortValues) -> Result<PortValues, String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(inputs.clone());
        }
        Ok(inputs)
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Sleeps before echoing its inputs; records whether it ever got to the end.
pub struct SlowBody {
    delay: Duration,
    finished: AtomicBool,
}

impl SlowBody {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            finished: AtomicBool::new(false),
        }
    }

    pub fn finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NodeBody for SlowBody {
    async fn run(&self, inputs: PortValues) -> Result<PortValues, String> {
        tokio::time::sleep(self.delay).await;
        self.finished.store(true, Ordering::SeqCst);
        Ok(inputs)
    }

    fn name(&self) -> &str {
        "slow"
    }
}
