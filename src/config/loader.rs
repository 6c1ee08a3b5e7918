// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    CRASHDUMP_DIR, DEFAULT_FA_TRACT_STAT, DEFAULT_MAX_CONCURRENCY, DEFAULT_OUTPUT_DIR,
    DEFAULT_WORK_DIR,
};
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Run configuration for assembling and executing workflows.
///
/// Loaded from YAML (or TOML when the file ends in `.toml`). Every value that
/// attachment functions depend on is read from here and passed explicitly;
/// nothing is looked up from process-wide state.
///
/// # Fields
/// * `workflow` / `workflows` - Names of the workflows to attach, in order
/// * `data_dir` - Folder holding the subject's raw data
/// * `work_dir` - Working directory (defaults to `<parent(data_dir)>/wd`)
/// * `output_dir` - Sink base directory (defaults to `<parent(data_dir)>/out`)
/// * `subject` - Sink container folder below `output_dir` (optional)
/// * `inputs` - Modality to file path, relative paths resolved against `data_dir`
/// * `atlas_file` / `normalize_atlas` - Optional atlas branch
/// * `spm`, `tractography` - Tool settings
/// * `sink` - Renaming behaviour
/// * `executor` - Reference engine options
///
/// # Example
/// ```yaml
/// workflow: spm_anat_preproc
/// data_dir: /data/raw/sub01
/// inputs:
///   anat: anat_1/mprage.nii.gz
/// atlas_file: /atlases/aal.nii.gz
/// spm:
///   tpm_path: /opt/spm12/tpm/TPM.nii
/// sink:
///   warn_unmatched: true
/// executor:
///   max_concurrency: 4
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub workflow: Option<String>,
    #[serde(default)]
    pub workflows: Vec<String>,
    pub data_dir: PathBuf,
    #[serde(default)]
    pub work_dir: Option<PathBuf>,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub inputs: BTreeMap<String, PathBuf>,
    #[serde(default)]
    pub atlas_file: Option<PathBuf>,
    #[serde(default)]
    pub normalize_atlas: Option<bool>,
    #[serde(default)]
    pub spm: SpmConfig,
    #[serde(default)]
    pub tractography: TractographyConfig,
    #[serde(default)]
    pub sink: SinkConfig,
    #[serde(default)]
    pub executor: ExecutorOptions,
}

/// SPM settings.
///
/// * `tpm_path` - Tissue probability maps used as segmentation priors
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpmConfig {
    pub tpm_path: Option<PathBuf>,
}

/// Tractography settings.
///
/// * `fa_tract_stat` - Statistic of FA along each tract (`mean`, `max`, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TractographyConfig {
    #[serde(default = "default_fa_tract_stat")]
    pub fa_tract_stat: String,
}

impl Default for TractographyConfig {
    fn default() -> Self {
        Self {
            fa_tract_stat: default_fa_tract_stat(),
        }
    }
}

fn default_fa_tract_stat() -> String {
    DEFAULT_FA_TRACT_STAT.to_string()
}

/// Data sink settings.
///
/// * `warn_unmatched` - Log produced paths that no rename rule matched at `warn`
///   instead of `debug`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SinkConfig {
    #[serde(default)]
    pub warn_unmatched: bool,
}

/// Reference engine options.
///
/// * `max_concurrency` - Maximum number of nodes running at once (optional,
///   defaults to the available parallelism)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutorOptions {
    pub max_concurrency: Option<usize>,
}

impl ExecutorOptions {
    pub fn effective_concurrency(&self) -> usize {
        self.max_concurrency.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(DEFAULT_MAX_CONCURRENCY)
        })
    }
}

impl PipelineConfig {
    /// Workflow names in attachment order, `workflow` first, duplicates removed.
    pub fn workflow_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for name in self.workflow.iter().chain(self.workflows.iter()) {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
        names
    }

    pub fn resolved_work_dir(&self) -> PathBuf {
        self.work_dir
            .clone()
            .unwrap_or_else(|| self.sibling_of_data_dir(DEFAULT_WORK_DIR))
    }

    pub fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| self.sibling_of_data_dir(DEFAULT_OUTPUT_DIR))
    }

    /// Where failed node reports of `workflow` are written.
    pub fn crashdump_dir(&self, workflow: &str) -> PathBuf {
        self.resolved_work_dir().join(workflow).join(CRASHDUMP_DIR)
    }

    /// Absolute path of an input modality, if configured.
    pub fn input_path(&self, modality: &str) -> Option<PathBuf> {
        self.inputs.get(modality).map(|p| self.data_dir.join(p))
    }

    /// Every configured modality with its resolved path, sorted by modality.
    pub fn resolved_inputs(&self) -> Vec<(String, PathBuf)> {
        self.inputs
            .iter()
            .map(|(modality, p)| (modality.clone(), self.data_dir.join(p)))
            .collect()
    }

    fn sibling_of_data_dir(&self, folder: &str) -> PathBuf {
        self.data_dir
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(folder)
    }
}

/// Load a configuration file without validating it.
///
/// Files ending in `.toml` are parsed as TOML, everything else as YAML.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let cfg = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&content)?,
        _ => serde_yaml::from_str(&content)?,
    };
    Ok(cfg)
}

/// Load a configuration file and run every eager check on it.
///
/// # Errors
/// Parse and I/O errors as-is; validation problems collected into `ConfigError::Invalid`.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig, ConfigError> {
    let cfg = load_config(path)?;
    crate::config::validate_config(&cfg).map_err(ConfigError::Invalid)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let yaml = r#"
workflow: spm_anat_preproc
data_dir: /data/raw/sub01
inputs:
  anat: anat_1/mprage.nii.gz
"#;
        let cfg: PipelineConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.workflow_names(), vec!["spm_anat_preproc"]);
        assert_eq!(cfg.atlas_file, None);
        assert!(!cfg.sink.warn_unmatched);
        assert_eq!(cfg.tractography.fa_tract_stat, "mean");
        assert_eq!(
            cfg.input_path("anat"),
            Some(PathBuf::from("/data/raw/sub01/anat_1/mprage.nii.gz"))
        );
        assert_eq!(cfg.input_path("pet"), None);
    }

    #[test]
    fn directories_default_next_to_data_dir() {
        let cfg: PipelineConfig =
            serde_yaml::from_str("workflow: spm_anat_preproc\ndata_dir: /data/raw\n").unwrap();
        assert_eq!(cfg.resolved_output_dir(), PathBuf::from("/data/out"));
        assert_eq!(cfg.resolved_work_dir(), PathBuf::from("/data/wd"));
        assert_eq!(
            cfg.crashdump_dir("spm_anat_preproc"),
            PathBuf::from("/data/wd/spm_anat_preproc/log")
        );
    }

    #[test]
    fn explicit_directories_are_kept() {
        let yaml = "workflow: a\ndata_dir: /data/raw\nwork_dir: /scratch/wd\noutput_dir: /results\n";
        let cfg: PipelineConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.resolved_work_dir(), PathBuf::from("/scratch/wd"));
        assert_eq!(cfg.resolved_output_dir(), PathBuf::from("/results"));
    }

    #[test]
    fn absolute_inputs_are_not_rebased() {
        let yaml = "workflow: a\ndata_dir: /data/raw\ninputs:\n  bval: /shared/diff.bval\n";
        let cfg: PipelineConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.input_path("bval"), Some(PathBuf::from("/shared/diff.bval")));
    }

    #[test]
    fn workflow_names_are_deduplicated_in_order() {
        let yaml = r#"
workflow: spm_anat_preproc
workflows: [camino_tract, spm_anat_preproc]
data_dir: /data/raw
"#;
        let cfg: PipelineConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.workflow_names(), vec!["spm_anat_preproc", "camino_tract"]);
    }

    #[test]
    fn toml_files_are_supported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.toml");
        std::fs::write(
            &path,
            r#"
workflow = "spm_anat_preproc"
data_dir = "/data/raw"

[inputs]
anat = "mprage.nii.gz"

[executor]
max_concurrency = 2
"#,
        )
        .unwrap();
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.executor.effective_concurrency(), 2);
        assert_eq!(cfg.inputs.len(), 1);
    }

    #[test]
    fn missing_file_reports_its_path() {
        let err = load_config("/definitely/not/here.yaml").unwrap_err();
        match err {
            ConfigError::Io { path, .. } => assert_eq!(path, PathBuf::from("/definitely/not/here.yaml")),
            other => panic!("expected an I/O error, got {:?}", other),
        }
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "workflow: [unterminated\n").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Yaml(_))));
    }
}
