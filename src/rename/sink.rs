// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::errors::{ConfigError, ExecutionError};
use crate::graph::PortValues;
use crate::observability::messages::rename::RenameRulesInstalled;
use crate::observability::messages::StructuredLog;
use crate::rename::{compressed_variants, RenameRule, SubstitutionList};

/// One artifact the sink will store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SinkEntry {
    pub category: String,
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Receives `(category, file)` pairs from the collector node and stores them
/// under renamed, discoverable paths.
///
/// The rule list lives here rather than in the collector's bound configuration
/// because it keeps growing as workflows attach, after the collector is connected.
#[derive(Debug, Clone)]
pub struct DataSink {
    base_directory: PathBuf,
    container: Option<String>,
    substitutions: SubstitutionList,
    warn_unmatched: bool,
}

impl DataSink {
    pub fn new(base_directory: impl Into<PathBuf>) -> Self {
        Self {
            base_directory: base_directory.into(),
            container: None,
            substitutions: SubstitutionList::new(),
            warn_unmatched: false,
        }
    }

    /// Store everything below `base_directory/container`.
    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.container = Some(container.into());
        self
    }

    pub fn with_warn_unmatched(mut self, warn: bool) -> Self {
        self.warn_unmatched = warn;
        self
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub fn container(&self) -> Option<&str> {
        self.container.as_deref()
    }

    pub fn substitutions(&self) -> &SubstitutionList {
        &self.substitutions
    }

    /// Append a workflow's instantiated rules, then their compressed variants.
    ///
    /// Returns the number of rules added.
    pub fn install_rules(&mut self, workflow: &str, declared: Vec<RenameRule>) -> Result<usize, ConfigError> {
        let variants = compressed_variants(&declared);
        let (declared_count, variant_count) = (declared.len(), variants.len());

        let mut rules = declared;
        rules.extend(variants);
        let added = self.substitutions.extend(rules)?;

        RenameRulesInstalled {
            workflow,
            declared: declared_count,
            synthesized: variant_count,
            total: self.substitutions.len(),
        }
        .log();
        Ok(added)
    }

    /// The renamed destination of `source` filed under `category`.
    pub fn destination(&self, category: &str, source: &Path) -> PathBuf {
        let mut dir = self.base_directory.clone();
        if let Some(container) = &self.container {
            dir.push(container);
        }
        dir.push(category_folder(category));
        if let Some(name) = source.file_name() {
            dir.push(name);
        }
        let raw = dir.to_string_lossy();
        PathBuf::from(self.substitutions.rename(&raw, self.warn_unmatched))
    }

    /// Build the manifest for what the collector received, one entry per file path.
    ///
    /// Categories are visited in sorted order; list values keep their order.
    /// Values that carry no path are ignored.
    pub fn resolve(&self, received: &PortValues) -> Vec<SinkEntry> {
        received
            .iter()
            .flat_map(|(category, value)| {
                value.paths().into_iter().map(move |source| SinkEntry {
                    category: category.clone(),
                    source: source.to_path_buf(),
                    destination: self.destination(category, source),
                })
            })
            .collect()
    }

    /// Copy every manifest entry to its destination, creating directories as needed.
    pub async fn persist(&self, manifest: &[SinkEntry]) -> Result<(), ExecutionError> {
        for entry in manifest {
            if let Some(parent) = entry.destination.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::copy(&entry.source, &entry.destination).await?;
        }
        Ok(())
    }
}

/// The folder a category is filed under.
///
/// Dot-separated levels become nested folders; a level starting with `@` is dropped,
/// so `anat.tissues.warped` files into `anat/tissues/warped` and `anat.@mni` into `anat`.
pub fn category_folder(category: &str) -> PathBuf {
    category
        .split('.')
        .filter(|level| !level.is_empty() && !level.starts_with('@'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::PortValue;
    use crate::rename::Placeholders;

    fn anat_sink(base: &Path) -> DataSink {
        let placeholders = Placeholders::new().with("anat", "mprage");
        let rules: Vec<RenameRule> = vec![
            RenameRule::new(r"/c1{anat}.*nii$", "/{anat}_gm.nii"),
            RenameRule::new(r"/wm{anat}.*_corrected.nii$", "/{anat}_mni.nii"),
        ]
        .iter()
        .map(|r| r.instantiate(&placeholders))
        .collect();
        let mut sink = DataSink::new(base);
        sink.install_rules("spm_anat_preproc", rules).unwrap();
        sink
    }

    #[test]
    fn category_levels_map_to_folders() {
        assert_eq!(category_folder("anat.@mni"), PathBuf::from("anat"));
        assert_eq!(category_folder("anat.tissues.warped"), PathBuf::from("anat/tissues/warped"));
        assert_eq!(category_folder("anat.transform.@linear"), PathBuf::from("anat/transform"));
        assert_eq!(category_folder("@all"), PathBuf::new());
    }

    #[test]
    fn install_appends_declared_then_compressed() {
        let sink = anat_sink(Path::new("/out"));
        let patterns: Vec<&str> = sink.substitutions().rules().map(|r| r.pattern.as_str()).collect();
        assert_eq!(
            patterns,
            vec![
                r"/c1mprage.*nii$",
                r"/wmmprage.*_corrected.nii$",
                r"/c1mprage.*nii\.gz$",
                r"/wmmprage.*_corrected.nii\.gz$",
            ]
        );
    }

    #[test]
    fn later_installs_keep_earlier_rules() {
        let mut sink = anat_sink(Path::new("/out"));
        sink.install_rules(
            "camino_tract",
            vec![RenameRule::new(r"/tracts\.Bfloat$", "/tracks.Bfloat")],
        )
        .unwrap();
        assert_eq!(sink.substitutions().len(), 5);
        assert_eq!(
            sink.substitutions().rules().next().map(|r| r.pattern.as_str()),
            Some(r"/c1mprage.*nii$")
        );
    }

    #[test]
    fn resolve_files_and_renames_every_path() {
        let sink = anat_sink(Path::new("/out")).with_container("sub01");
        let mut received = PortValues::new();
        received.insert(
            "anat.tissues.native".to_string(),
            PortValue::List(vec![
                PortValue::path("/wd/new_segment/c1mprage_corrected.nii"),
                PortValue::path("/wd/new_segment/c2mprage_corrected.nii"),
            ]),
        );
        received.insert("anat.@mni".to_string(), PortValue::path("/wd/warp/wmmprage_corrected.nii.gz"));
        received.insert("anat.@note".to_string(), PortValue::text("not a file"));

        let manifest = sink.resolve(&received);
        let destinations: Vec<PathBuf> = manifest.iter().map(|e| e.destination.clone()).collect();
        assert_eq!(
            destinations,
            vec![
                PathBuf::from("/out/sub01/anat/mprage_mni.nii.gz"),
                PathBuf::from("/out/sub01/anat/tissues/native/mprage_gm.nii"),
                PathBuf::from("/out/sub01/anat/tissues/native/c2mprage_corrected.nii"),
            ]
        );
        assert_eq!(manifest[1].category, "anat.tissues.native");
    }

    #[tokio::test]
    async fn persist_copies_into_renamed_destinations() {
        let work = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let produced = work.path().join("c1mprage_corrected.nii.gz");
        tokio::fs::write(&produced, b"gm").await.unwrap();

        let sink = anat_sink(out.path());
        let mut received = PortValues::new();
        received.insert("anat.tissues.native".to_string(), PortValue::path(produced.clone()));
        let manifest = sink.resolve(&received);
        sink.persist(&manifest).await.unwrap();

        let expected = out.path().join("anat/tissues/native/mprage_gm.nii.gz");
        assert_eq!(manifest[0].destination, expected);
        assert_eq!(tokio::fs::read(&expected).await.unwrap(), b"gm");
    }
}
