// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the reference engine lifecycle.
//!
//! This module contains message types for logging events related to:
//! * Execution start and completion
//! * Level-by-level progress
//! * Node failures
//! * Crash reports written for failed runs

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Execution started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_boxwood::observability::messages::engine::ExecutionStarted;
///
/// let msg = ExecutionStarted {
///     graph: "main",
///     node_count: 12,
///     level_count: 6,
///     max_concurrency: 4,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ExecutionStarted<'a> {
    pub graph: &'a str,
    pub node_count: usize,
    pub level_count: usize,
    pub max_concurrency: usize,
}

impl Display for ExecutionStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting execution of '{}': {} nodes in {} levels, max_concurrency={}",
            self.graph, self.node_count, self.level_count, self.max_concurrency
        )
    }
}

impl StructuredLog for ExecutionStarted<'_> {
    fn log(&self) {
        tracing::info!(
            graph = self.graph,
            node_count = self.node_count,
            level_count = self.level_count,
            max_concurrency = self.max_concurrency,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "execution",
            span_name = name,
            graph = self.graph,
            node_count = self.node_count,
            max_concurrency = self.max_concurrency,
        )
    }
}

/// Every node of one level finished.
///
/// # Log Level
/// `debug!` - Progress detail
pub struct LevelCompleted {
    pub level: usize,
    pub node_count: usize,
    pub duration: std::time::Duration,
}

impl Display for LevelCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Level {} completed: {} nodes in {:?}",
            self.level, self.node_count, self.duration
        )
    }
}

impl StructuredLog for LevelCompleted {
    fn log(&self) {
        tracing::debug!(
            level_index = self.level,
            node_count = self.node_count,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "level_completed",
            span_name = name,
            level_index = self.level,
        )
    }
}

/// A node body returned an error.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct NodeFailed<'a> {
    pub node_id: &'a str,
    pub body: &'a str,
    pub error: &'a str,
}

impl Display for NodeFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Node '{}' ({}) failed: {}", self.node_id, self.body, self.error)
    }
}

impl StructuredLog for NodeFailed<'_> {
    fn log(&self) {
        tracing::error!(
            node_id = self.node_id,
            body = self.body,
            error = self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "node_failed",
            span_name = name,
            node_id = self.node_id,
        )
    }
}

/// Execution completed successfully.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ExecutionCompleted<'a> {
    pub graph: &'a str,
    pub node_count: usize,
    pub duration: std::time::Duration,
}

impl Display for ExecutionCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Execution of '{}' completed: {} nodes in {:?}",
            self.graph, self.node_count, self.duration
        )
    }
}

impl StructuredLog for ExecutionCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            graph = self.graph,
            node_count = self.node_count,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "execution_completed",
            span_name = name,
            graph = self.graph,
            duration = ?self.duration,
        )
    }
}

/// A report for a failed run was written to disk.
///
/// # Log Level
/// `warn!` - Something needs a look
pub struct CrashReportWritten<'a> {
    pub graph: &'a str,
    pub node_id: Option<&'a str>,
    pub path: &'a std::path::Path,
}

impl Display for CrashReportWritten<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Crash report for '{}' ({}) written to {}",
            self.graph,
            self.node_id.unwrap_or("no node"),
            self.path.display()
        )
    }
}

impl StructuredLog for CrashReportWritten<'_> {
    fn log(&self) {
        tracing::warn!(
            graph = self.graph,
            node_id = self.node_id,
            path = %self.path.display(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "crash_report_written",
            span_name = name,
            graph = self.graph,
        )
    }
}
