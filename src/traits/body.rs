use async_trait::async_trait;

use crate::graph::PortValues;

/// The deferred computation behind a node.
///
/// The graph only cares about a body's declared port signature; what `run`
/// actually does (invoke an imaging tool, compute a bounding box, pass values
/// through) belongs to whoever supplied the body.
#[async_trait]
pub trait NodeBody: Send + Sync {
    /// Run once with every connected or bound input, returning outputs keyed by port name.
    async fn run(&self, inputs: PortValues) -> Result<PortValues, String>;

    fn name(&self) -> &str;
}
