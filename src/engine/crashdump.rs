// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Failed-run reports written under `<work_dir>/<workflow>/log`.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::errors::ExecutionError;
use crate::graph::{Graph, NodeId};
use crate::observability::messages::engine::CrashReportWritten;
use crate::observability::messages::StructuredLog;

/// What failed, on which node and inside which body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrashReport {
    pub graph: String,
    pub node_id: Option<String>,
    pub body: Option<String>,
    pub message: String,
}

impl CrashReport {
    pub fn new(graph: &Graph, error: &ExecutionError) -> Self {
        let node_id = error.node_id().map(str::to_string);
        let body = node_id
            .as_deref()
            .and_then(|id| graph.node(&NodeId::from(id)).ok())
            .map(|node| node.body().name().to_string());
        Self {
            graph: graph.name().to_string(),
            node_id,
            body,
            message: error.to_string(),
        }
    }

    /// `crash-<node>.json`, or `crash-<graph>.json` when no node is to blame.
    pub fn file_name(&self) -> String {
        format!("crash-{}.json", self.node_id.as_deref().unwrap_or(&self.graph))
    }

    /// Write the report as JSON into `dir`, creating it as needed.
    ///
    /// Returns the path of the written file.
    pub async fn write(&self, dir: &Path) -> Result<PathBuf, ExecutionError> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(self.file_name());
        let json = serde_json::to_vec_pretty(self).map_err(|e| ExecutionError::InternalError {
            message: format!("Failed to serialize crash report: {}", e),
        })?;
        tokio::fs::write(&path, json).await?;

        CrashReportWritten {
            graph: &self.graph,
            node_id: self.node_id.as_deref(),
            path: &path,
        }
        .log();
        Ok(path)
    }
}
