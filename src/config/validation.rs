// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Eager configuration checks.
//!
//! Every problem is collected so a malformed run is reported in one pass,
//! before any graph reaches an engine:
//!
//! 1. **Workflows**: at least one workflow is named
//! 2. **Data directory**: `data_dir` exists
//! 3. **Inputs**: every configured input file exists
//! 4. **Atlas**: a requested atlas has an existing file
//! 5. **Priors**: a configured tissue probability map exists
//! 6. **Executor**: `max_concurrency` is positive
//!
//! Workflow names are checked against the registry when workflows are assembled.

use crate::config::{AtlasSelection, PipelineConfig};
use crate::errors::ConfigError;
use std::path::Path;

/// Run every eager check.
///
/// # Returns
/// * `Ok(())` - The configuration can be assembled
/// * `Err(Vec<ConfigError>)` - All problems found, in check order
pub fn validate_config(config: &PipelineConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.workflow_names().is_empty() {
        errors.push(ConfigError::NoWorkflows);
    }

    if !config.data_dir.is_dir() {
        errors.push(missing("data_dir", &config.data_dir));
    }

    for (modality, path) in config.resolved_inputs() {
        if !path.exists() {
            errors.push(missing(&format!("inputs.{}", modality), &path));
        }
    }

    match AtlasSelection::from_config(config) {
        Ok(AtlasSelection::Enabled(path)) if !path.exists() => {
            errors.push(missing("atlas_file", &path));
        }
        Ok(_) => {}
        Err(e) => errors.push(e),
    }

    if let Some(tpm) = &config.spm.tpm_path {
        if !tpm.exists() {
            errors.push(missing("spm.tpm_path", tpm));
        }
    }

    if config.executor.max_concurrency == Some(0) {
        errors.push(ConfigError::InvalidValue {
            key: "executor.max_concurrency".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn missing(key: &str, path: &Path) -> ConfigError {
    ConfigError::MissingPath {
        key: key.to_string(),
        path: path.to_path_buf(),
    }
}
