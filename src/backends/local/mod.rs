pub mod bodies;
pub mod factory;

pub use bodies::{Collector, DeferredTool, FunctionBody, Identity};
pub use factory::ToolRegistry;
