// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use regex::Regex;

use crate::errors::ConfigError;
use crate::observability::messages::rename::{PathRenamed, UnmatchedPath};
use crate::observability::messages::StructuredLog;
use crate::rename::RenameRule;

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: RenameRule,
    regex: Regex,
}

/// Result of rewriting one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
    /// The rule at `rule_index` matched and produced `path`.
    Renamed { path: String, rule_index: usize },
    /// No rule matched; the path is unchanged.
    Unmatched,
}

/// The sink's active rule list.
///
/// Append-only and order-preserving: rules installed by one attachment are never
/// removed or reordered by a later one. The first rule whose pattern matches a
/// path decides its new name.
#[derive(Debug, Clone, Default)]
pub struct SubstitutionList {
    rules: Vec<CompiledRule>,
}

impl SubstitutionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append rules after the existing ones.
    ///
    /// Every pattern is compiled before anything is appended, so an invalid
    /// pattern leaves the list unchanged.
    ///
    /// # Errors
    /// `InvalidRenamePattern` naming the first pattern that fails to compile.
    pub fn extend<I>(&mut self, rules: I) -> Result<usize, ConfigError>
    where
        I: IntoIterator<Item = RenameRule>,
    {
        let compiled = rules
            .into_iter()
            .map(|rule| match Regex::new(&rule.pattern) {
                Ok(regex) => Ok(CompiledRule { rule, regex }),
                Err(e) => Err(ConfigError::InvalidRenamePattern {
                    pattern: rule.pattern.clone(),
                    reason: e.to_string(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        let added = compiled.len();
        self.rules.extend(compiled);
        Ok(added)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Installed rules in application order.
    pub fn rules(&self) -> impl Iterator<Item = &RenameRule> {
        self.rules.iter().map(|c| &c.rule)
    }

    /// Rewrite `path` with the first matching rule.
    pub fn apply(&self, path: &str) -> Rewrite {
        for (rule_index, compiled) in self.rules.iter().enumerate() {
            if compiled.regex.is_match(path) {
                let renamed = compiled.regex.replace(path, compiled.rule.replacement.as_str());
                return Rewrite::Renamed {
                    path: renamed.into_owned(),
                    rule_index,
                };
            }
        }
        Rewrite::Unmatched
    }

    /// Like [`apply`](Self::apply), but always returns a path and logs the outcome.
    ///
    /// Unmatched paths are returned unchanged, logged at `warn` when
    /// `warn_unmatched` is set and at `debug` otherwise.
    pub fn rename(&self, path: &str, warn_unmatched: bool) -> String {
        match self.apply(path) {
            Rewrite::Renamed {
                path: renamed,
                rule_index,
            } => {
                PathRenamed {
                    source: path,
                    destination: &renamed,
                    rule_index,
                }
                .log();
                renamed
            }
            Rewrite::Unmatched => {
                UnmatchedPath {
                    path,
                    rule_count: self.rules.len(),
                    warn: warn_unmatched,
                }
                .log();
                path.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rename::{with_compressed_variants, Placeholders};

    fn gm_rules() -> SubstitutionList {
        let placeholders = Placeholders::new().with("X", "sub01");
        let declared = vec![RenameRule::new(r"/c1{X}.*nii$", "/{X}_gm.nii").instantiate(&placeholders)];
        let mut list = SubstitutionList::new();
        list.extend(with_compressed_variants(declared)).unwrap();
        list
    }

    #[test]
    fn compressed_and_plain_variants_keep_their_suffix() {
        let list = gm_rules();
        assert_eq!(list.rename("/data/c1sub01_foo.nii.gz", false), "/data/sub01_gm.nii.gz");
        assert_eq!(list.rename("/data/c1sub01_foo.nii", false), "/data/sub01_gm.nii");
    }

    #[test]
    fn unmatched_paths_pass_through_unchanged() {
        let list = gm_rules();
        assert_eq!(list.apply("/data/other.nii"), Rewrite::Unmatched);
        assert_eq!(list.rename("/data/other.nii", true), "/data/other.nii");
        assert_eq!(SubstitutionList::new().rename("/x/y.nii", false), "/x/y.nii");
    }

    #[test]
    fn earlier_rule_wins_when_both_match() {
        let mut list = SubstitutionList::new();
        list.extend(vec![
            RenameRule::new(r"/c1sub01.*nii$", "/first.nii"),
            RenameRule::new(r"/c1sub01_foo\.nii$", "/second.nii"),
        ])
        .unwrap();
        assert_eq!(
            list.apply("/data/c1sub01_foo.nii"),
            Rewrite::Renamed {
                path: "/data/first.nii".to_string(),
                rule_index: 0
            }
        );
    }

    #[test]
    fn repeated_application_is_deterministic() {
        let list = gm_rules();
        let once = list.rename("/data/c1sub01_foo.nii.gz", false);
        for _ in 0..5 {
            assert_eq!(list.rename("/data/c1sub01_foo.nii.gz", false), once);
        }
    }

    #[test]
    fn extension_appends_and_preserves_order() {
        let mut list = gm_rules();
        let before: Vec<RenameRule> = list.rules().cloned().collect();
        list.extend(vec![RenameRule::new(r"/tracts\.Bfloat$", "/tracks.Bfloat")])
            .unwrap();
        let after: Vec<RenameRule> = list.rules().cloned().collect();
        assert_eq!(&after[..before.len()], &before[..]);
        assert_eq!(after.len(), before.len() + 1);
    }

    #[test]
    fn invalid_pattern_leaves_list_unchanged() {
        let mut list = gm_rules();
        let err = list
            .extend(vec![
                RenameRule::new(r"/ok\.nii$", "/fine.nii"),
                RenameRule::new(r"/broken(\.nii$", "/x.nii"),
            ])
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRenamePattern { .. }));
        assert_eq!(list.len(), 2);
    }
}
