// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use super::{anat, tract, AttachContext};
use crate::composer::{AttachmentRecord, MainWorkflow};
use crate::errors::{BuildError, ConfigError};

/// Composes a workflow box into the main workflow and wires it.
pub type AttachFn = fn(&mut MainWorkflow, &AttachContext) -> Result<AttachmentRecord, BuildError>;

/// Workflow names a configuration may request, and how each one attaches.
#[derive(Clone)]
pub struct WorkflowRegistry {
    entries: BTreeMap<String, AttachFn>,
}

impl WorkflowRegistry {
    /// A registry with nothing in it.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// The workflows shipped with this crate: `spm_anat_preproc` and `camino_tract`.
    ///
    /// No bundled workflow provides the `fsl_dti_preproc` box that
    /// `camino_tract` reads from, so requesting `camino_tract` fails with
    /// `MissingCollaborator` unless a workflow composing `fsl_dti_preproc` is
    /// [registered](Self::register) and listed before it.
    pub fn bundled() -> Self {
        let mut registry = Self::empty();
        registry.register(anat::SPM_ANAT_PREPROC, anat::attach_spm_anat_preprocessing);
        registry.register(tract::CAMINO_TRACT, tract::attach_camino_tractography);
        registry
    }

    /// Add or replace a workflow.
    pub fn register(&mut self, name: &str, attach: AttachFn) -> &mut Self {
        self.entries.insert(name.to_string(), attach);
        self
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(|s| s.as_str()).collect()
    }

    /// # Errors
    /// `UnknownWorkflow`, listing every registered name.
    pub fn get(&self, name: &str) -> Result<AttachFn, ConfigError> {
        self.entries
            .get(name)
            .copied()
            .ok_or_else(|| ConfigError::UnknownWorkflow {
                name: name.to_string(),
                known: self.names().into_iter().map(String::from).collect(),
            })
    }

    pub fn attach(
        &self,
        name: &str,
        main: &mut MainWorkflow,
        ctx: &AttachContext,
    ) -> Result<AttachmentRecord, BuildError> {
        let attach = self.get(name)?;
        attach(main, ctx)
    }
}

impl Default for WorkflowRegistry {
    fn default() -> Self {
        Self::bundled()
    }
}
