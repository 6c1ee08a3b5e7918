use async_trait::async_trait;

use crate::engine::RunOutputs;
use crate::errors::ExecutionError;
use crate::graph::Graph;

#[async_trait]
pub trait Engine: Send + Sync {
    /// Execute every node of a finished graph exactly once, in an order consistent
    /// with its connections.
    ///
    /// - `graph`: the assembled workflow; engines never mutate it
    ///
    /// Returns a Result containing either:
    /// - Ok(RunOutputs): the outputs produced by every node
    /// - Err(ExecutionError): the first node failure, with the node id attached
    async fn execute(&self, graph: &Graph) -> Result<RunOutputs, ExecutionError>;
}
