// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::{Path, PathBuf};

use crate::config::PipelineConfig;
use crate::errors::ConfigError;
use crate::rename::basename_token;

/// Whether the optional atlas branch is attached, and with which file.
///
/// Derived from an explicit configuration value and passed into every
/// attachment call that cares about it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AtlasSelection {
    #[default]
    Disabled,
    Enabled(PathBuf),
}

impl AtlasSelection {
    /// Read the atlas predicate from a configuration.
    ///
    /// Normalization defaults to on whenever an `atlas_file` is configured;
    /// `normalize_atlas: false` turns it off explicitly.
    ///
    /// # Errors
    /// `MissingAtlas` when normalization is requested without a file.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, ConfigError> {
        let requested = config.normalize_atlas.unwrap_or(config.atlas_file.is_some());
        match (requested, &config.atlas_file) {
            (false, _) => Ok(AtlasSelection::Disabled),
            (true, Some(path)) => Ok(AtlasSelection::Enabled(path.clone())),
            (true, None) => Err(ConfigError::MissingAtlas),
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, AtlasSelection::Enabled(_))
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            AtlasSelection::Enabled(path) => Some(path),
            AtlasSelection::Disabled => None,
        }
    }

    /// Basename used to fill the atlas placeholder of rename rules.
    pub fn basename(&self) -> Option<String> {
        self.path().map(basename_token)
    }
}
