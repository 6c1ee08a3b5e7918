// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::Instrument;

use crate::errors::ExecutionError;
use crate::graph::{Graph, NodeId, PortValues};
use crate::engine::RunOutputs;
use crate::observability::messages::engine::{
    ExecutionCompleted, ExecutionStarted, LevelCompleted, NodeFailed,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{Engine, NodeBody};

/// Reference engine that runs a graph one topological level at a time.
///
/// ## Execution Strategy
///
/// 1. **Topological Level Computation**: Kahn's algorithm over the graph's
///    connections; level 0 holds the nodes without incoming connections
/// 2. **Input Gathering**: Each node starts from its bound configuration;
///    every incoming connection overrides the port it targets with the
///    (transformed) upstream output
/// 3. **Level-by-Level Execution**: All nodes of a level run concurrently on
///    tokio, bounded by a semaphore
/// 4. **Fail Fast**: The first node failure, missing upstream output or
///    transform error stops the run
///
/// Inputs of a level are gathered before any of its nodes start, and outputs
/// are recorded once the whole level finished, so nodes never share mutable state.
pub struct LevelByLevelEngine {
    /// Maximum number of nodes running at once within a level
    max_concurrency: usize,
}

impl LevelByLevelEngine {
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1), // Ensure at least 1
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Bound configuration overridden by every incoming connection.
    ///
    /// ## Error Conditions
    /// - `MissingOutput` when an upstream node did not produce the connected port
    /// - `TransformFailed` when a connection transform rejects the value
    fn gather_inputs(
        graph: &Graph,
        node: &NodeId,
        results: &RunOutputs,
    ) -> Result<PortValues, ExecutionError> {
        let descriptor = graph.node(node).map_err(|e| ExecutionError::InternalError {
            message: e.to_string(),
        })?;
        let mut inputs = descriptor.bound_config().clone();

        for conn in graph.incoming(node) {
            let value = results
                .value(&conn.source)
                .cloned()
                .ok_or_else(|| ExecutionError::MissingOutput {
                    node_id: conn.source.node.to_string(),
                    port: conn.source.port.clone(),
                    consumer: node.to_string(),
                })?;
            let value = conn
                .transform
                .apply(value)
                .map_err(|message| ExecutionError::TransformFailed {
                    transform: conn.transform.name().to_string(),
                    connection: conn.to_string(),
                    message,
                })?;
            inputs.insert(conn.target.port.clone(), value);
        }
        Ok(inputs)
    }

    /// Run every node of one level concurrently and collect their outputs.
    ///
    /// Inputs for the whole level are gathered before anything is spawned. On
    /// the first failure the level's remaining tasks are aborted.
    async fn execute_level(
        &self,
        graph: &Graph,
        level: &[NodeId],
        results: &RunOutputs,
        semaphore: &Arc<Semaphore>,
    ) -> Result<Vec<(NodeId, PortValues)>, ExecutionError> {
        let mut ready = Vec::with_capacity(level.len());
        for node_id in level {
            let inputs = Self::gather_inputs(graph, node_id, results)?;
            let body: Arc<dyn NodeBody> = graph
                .node(node_id)
                .map_err(|e| ExecutionError::InternalError {
                    message: e.to_string(),
                })?
                .body()
                .clone();
            ready.push((node_id.clone(), body, inputs));
        }

        let mut tasks = JoinSet::new();
        for (node_id, body, inputs) in ready {
            let semaphore = semaphore.clone();
            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| ExecutionError::InternalError {
                        message: format!(
                            "Failed to acquire semaphore permit for node '{}': {}",
                            node_id, e
                        ),
                    })?;

                match body.run(inputs).await {
                    Ok(outputs) => Ok((node_id, outputs)),
                    Err(message) => {
                        NodeFailed {
                            node_id: node_id.as_str(),
                            body: body.name(),
                            error: &message,
                        }
                        .log();
                        Err(ExecutionError::NodeFailed {
                            node_id: node_id.to_string(),
                            message,
                        })
                    }
                }
            });
        }

        let mut completed = Vec::with_capacity(level.len());
        while let Some(joined) = tasks.join_next().await {
            let failure = match joined {
                Ok(Ok(done)) => {
                    completed.push(done);
                    continue;
                }
                Ok(Err(e)) => e,
                Err(join_error) => ExecutionError::InternalError {
                    message: format!("Task join error: {}", join_error),
                },
            };
            tasks.abort_all();
            return Err(failure);
        }
        Ok(completed)
    }

    async fn run_levels(&self, graph: &Graph, levels: &[Vec<NodeId>]) -> Result<RunOutputs, ExecutionError> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut results = RunOutputs::new();

        for (index, level) in levels.iter().enumerate() {
            let level_started = Instant::now();
            let completed = self.execute_level(graph, level, &results, &semaphore).await?;
            for (node_id, outputs) in completed {
                results.insert(node_id, outputs);
            }
            LevelCompleted {
                level: index,
                node_count: level.len(),
                duration: level_started.elapsed(),
            }
            .log();
        }
        Ok(results)
    }
}

impl Default for LevelByLevelEngine {
    /// Concurrency defaults to the number of available CPU cores.
    fn default() -> Self {
        let concurrency = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(crate::config::consts::DEFAULT_MAX_CONCURRENCY);
        Self::new(concurrency)
    }
}

#[async_trait]
impl Engine for LevelByLevelEngine {
    async fn execute(&self, graph: &Graph) -> Result<RunOutputs, ExecutionError> {
        let started = Instant::now();
        let levels = graph
            .topological_levels()
            .map_err(|e| ExecutionError::InternalError {
                message: format!("Graph is not executable: {}", e),
            })?;

        let start_msg = ExecutionStarted {
            graph: graph.name(),
            node_count: graph.node_count(),
            level_count: levels.len(),
            max_concurrency: self.max_concurrency,
        };
        start_msg.log();
        let span = start_msg.span("level_by_level");

        let results = self.run_levels(graph, &levels).instrument(span).await?;

        ExecutionCompleted {
            graph: graph.name(),
            node_count: results.len(),
            duration: started.elapsed(),
        }
        .log();
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::{FailingBody, SlowBody, StaticOutputs};
    use std::time::Duration;
    use crate::graph::{NodeSpec, PortRef, PortValue};

    #[test]
    fn concurrency_is_at_least_one() {
        assert_eq!(LevelByLevelEngine::new(0).max_concurrency(), 1);
        assert!(LevelByLevelEngine::default().max_concurrency() >= 1);
    }

    #[tokio::test]
    async fn empty_graph_produces_no_outputs() {
        let outputs = LevelByLevelEngine::new(2)
            .execute(&Graph::new("empty"))
            .await
            .unwrap();
        assert!(outputs.is_empty());
    }

    #[tokio::test]
    async fn bound_config_reaches_the_body() {
        let mut g = Graph::new("wf");
        g.declare_node(
            NodeSpec::identity("brain_mask", ["formula"]).bind("formula", "np.abs(gm + wm + csf) > 0"),
        )
        .unwrap();
        let outputs = LevelByLevelEngine::new(1).execute(&g).await.unwrap();
        assert_eq!(
            outputs.value(&PortRef::new("brain_mask", "formula")),
            Some(&PortValue::text("np.abs(gm + wm + csf) > 0"))
        );
    }

    #[tokio::test]
    async fn missing_upstream_output_is_reported() {
        let mut g = Graph::new("wf");
        g.declare_node(
            NodeSpec::new("segment", StaticOutputs::new("NewSegment", PortValues::new()))
                .outputs(["native_class_images"]),
        )
        .unwrap();
        g.declare_node(NodeSpec::identity("tissues", ["gm"])).unwrap();
        g.connect(
            PortRef::new("segment", "native_class_images"),
            PortRef::new("tissues", "gm"),
        )
        .unwrap();

        let err = LevelByLevelEngine::new(1).execute(&g).await.unwrap_err();
        match err {
            ExecutionError::MissingOutput { node_id, port, consumer } => {
                assert_eq!(node_id, "segment");
                assert_eq!(port, "native_class_images");
                assert_eq!(consumer, "tissues");
            }
            other => panic!("expected MissingOutput, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn failure_aborts_the_rest_of_the_level() {
        let slow = Arc::new(SlowBody::new(Duration::from_millis(200)));
        let mut g = Graph::new("wf");
        g.declare_node(NodeSpec::new("bias_correction", Arc::new(FailingBody)).outputs(["output_image"]))
            .unwrap();
        g.declare_node(NodeSpec::new("new_segment", slow.clone()).outputs(["native_class_images"]))
            .unwrap();

        let err = LevelByLevelEngine::new(2).execute(&g).await.unwrap_err();
        assert!(matches!(err, ExecutionError::NodeFailed { .. }));

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(!slow.finished());
    }

    #[tokio::test]
    async fn node_failure_names_the_node() {
        let mut g = Graph::new("wf");
        g.declare_node(NodeSpec::new("bias_correction", Arc::new(FailingBody)).outputs(["output_image"]))
            .unwrap();
        let err = LevelByLevelEngine::new(1).execute(&g).await.unwrap_err();
        assert!(matches!(err, ExecutionError::NodeFailed { ref node_id, .. } if node_id == "bias_correction"));
    }
}
