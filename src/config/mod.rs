// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod atlas;
mod loader;
mod validation;

pub mod consts;

pub use atlas::AtlasSelection;
pub use loader::{
    load_and_validate_config, load_config, ExecutorOptions, PipelineConfig, SinkConfig, SpmConfig,
    TractographyConfig,
};
pub use validation::validate_config;
