// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Bundled workflows and the assembly of a run's main workflow.
//!
//! Every bundled workflow is a pair of functions: one builds its box, the
//! other composes the box into a [`MainWorkflow`] and wires it to the input
//! files and the data sink. [`assemble`] builds the input/output skeleton from
//! a configuration and attaches each requested workflow in order.

pub mod anat;
pub mod registry;
pub mod tools;
pub mod tract;

use std::path::PathBuf;
use std::sync::Arc;

use crate::composer::MainWorkflow;
use crate::config::{validate_config, AtlasSelection, PipelineConfig};
use crate::errors::{BuildError, ConfigError};
use crate::traits::ToolProvider;

pub use anat::{attach_spm_anat_preprocessing, spm_anat_preprocessing, SPM_ANAT_PREPROC};
pub use registry::{AttachFn, WorkflowRegistry};
pub use tract::{attach_camino_tractography, camino_tractography, CAMINO_TRACT, FSL_DTI_PREPROC};

/// Explicit settings handed to every attach function.
///
/// Built once from the configuration, so no attachment reads global state.
#[derive(Clone)]
pub struct AttachContext {
    pub atlas: AtlasSelection,
    pub tpm_path: Option<PathBuf>,
    pub fa_tract_stat: String,
    pub provider: Arc<dyn ToolProvider>,
}

impl AttachContext {
    /// # Errors
    /// `MissingAtlas` when atlas normalization is requested without a file.
    pub fn from_config(config: &PipelineConfig, provider: Arc<dyn ToolProvider>) -> Result<Self, ConfigError> {
        Ok(Self {
            atlas: AtlasSelection::from_config(config)?,
            tpm_path: config.spm.tpm_path.clone(),
            fa_tract_stat: config.tractography.fa_tract_stat.clone(),
            provider,
        })
    }
}

/// Build the main workflow for `config`: input files, data sink, then every
/// configured workflow attached in the order given.
///
/// The configuration is validated and every workflow name resolved before
/// anything is built.
///
/// # Errors
/// * `Invalid` - every problem the eager configuration checks found
/// * `UnknownWorkflow` - a name is not in `registry`
/// * any error of the attach functions, the first one aborts assembly
pub fn assemble(
    config: &PipelineConfig,
    registry: &WorkflowRegistry,
    provider: Arc<dyn ToolProvider>,
) -> Result<MainWorkflow, BuildError> {
    validate_config(config).map_err(ConfigError::Invalid)?;
    let names = config.workflow_names();
    for name in &names {
        registry.get(name)?;
    }

    let ctx = AttachContext::from_config(config, provider)?;
    let mut main = MainWorkflow::in_out(config)?;
    for name in names {
        registry.attach(name, &mut main, &ctx)?;
    }
    main.graph().validate()?;
    Ok(main)
}
