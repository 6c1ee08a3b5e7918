// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Port registry, nodes, connections and the graph that ties them together.

mod connection;
mod graph;
mod node;
mod port;
pub mod validation;

pub use connection::{Connection, Transform};
pub use graph::Graph;
pub use node::{NodeDescriptor, NodeSpec};
pub use port::{NodeId, PortClass, PortRef, PortValue, PortValues};
