// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for configuration loading and eager assembly-time validation.

use std::path::PathBuf;
use thiserror::Error;

/// Problems with the run configuration, reported before any graph is handed to an engine.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error reading '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A configured path does not exist on disk.
    #[error("Expected an existing path for `{key}`, got '{}'", path.display())]
    MissingPath { key: String, path: PathBuf },

    /// An attached workflow needs an input modality the configuration does not provide.
    #[error("Workflow '{workflow}' needs the '{modality}' input, which is not configured")]
    MissingInput { workflow: String, modality: String },

    /// An attached workflow needs a tool setting the configuration does not provide.
    #[error("Workflow '{workflow}' needs `{key}` to be configured")]
    MissingSetting { workflow: String, key: String },

    #[error("Expected workflow name to be one of [{}], got '{name}'", known.join(", "))]
    UnknownWorkflow { name: String, known: Vec<String> },

    #[error("Configuration must name at least one workflow")]
    NoWorkflows,

    #[error("Invalid rename pattern '{pattern}': {reason}")]
    InvalidRenamePattern { pattern: String, reason: String },

    #[error("Atlas normalization is enabled but no `atlas_file` is configured")]
    MissingAtlas,

    #[error("Invalid value for `{key}`: {reason}")]
    InvalidValue { key: String, reason: String },

    /// Every problem found by eager validation, in check order.
    #[error("Configuration validation failed:\n{}", join_lines(.0))]
    Invalid(Vec<ConfigError>),
}

fn join_lines(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
