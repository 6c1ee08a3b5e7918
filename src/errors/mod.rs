// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod build;
mod config;
mod execution;
mod graph;

pub use build::BuildError;
pub use config::ConfigError;
pub use execution::ExecutionError;
pub use graph::GraphError;
