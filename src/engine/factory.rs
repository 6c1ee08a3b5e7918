// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::PipelineConfig;
use crate::engine::level_by_level::LevelByLevelEngine;
use crate::traits::Engine;

/// Factory for creating engines from configuration
pub struct EngineFactory;

impl EngineFactory {
    /// The reference engine, bounded by the configured (or detected) concurrency.
    pub fn from_config(cfg: &PipelineConfig) -> Box<dyn Engine> {
        Box::new(LevelByLevelEngine::new(cfg.executor.effective_concurrency()))
    }
}
