// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::{ConfigError, GraphError};
use thiserror::Error;

/// Failure of a workflow assembly step.
///
/// Attachment functions touch both the graph and the configuration, so they
/// report either kind through this umbrella.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
