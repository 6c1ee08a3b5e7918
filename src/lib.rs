// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // node bodies and tool registry
pub mod composer;   // boxes, composition, attachment
pub mod config;     // config loading + validation
pub mod engine;     // graph executors
pub mod errors;     // error handling
pub mod graph;      // ports, nodes, connections
pub mod observability;
pub mod pipelines;  // bundled workflows
pub mod rename;     // sink destinations + renaming
pub mod traits;     // unified abstractions
