pub mod body;
pub mod engine;
pub mod provider;

pub use body::NodeBody;
pub use engine::Engine;
pub use provider::{ToolKind, ToolProvider, ToolSpec};
