// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::config::consts::COMPRESSED_SUFFIX;

/// An ordered find/replace pair applied to produced file paths.
///
/// `pattern` is a regular expression, `replacement` a regex replacement string.
/// Both may contain `{name}` placeholder tokens filled in by [`RenameRule::instantiate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameRule {
    pub pattern: String,
    pub replacement: String,
}

impl RenameRule {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }

    /// Fill every known placeholder in both the pattern and the replacement.
    ///
    /// Tokens without a value are left in place.
    pub fn instantiate(&self, placeholders: &Placeholders) -> RenameRule {
        RenameRule {
            pattern: placeholders.fill_pattern(&self.pattern),
            replacement: placeholders.fill_replacement(&self.replacement),
        }
    }
}

/// Concrete values for `{name}` tokens, such as the subject or atlas basename.
///
/// ```
/// use the_boxwood::rename::{Placeholders, RenameRule};
///
/// let placeholders = Placeholders::new().with("anat", "sub01");
/// let rule = RenameRule::new(r"/c1{anat}.*nii$", "/{anat}_gm.nii").instantiate(&placeholders);
/// assert_eq!(rule.pattern, r"/c1sub01.*nii$");
/// assert_eq!(rule.replacement, "/sub01_gm.nii");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placeholders {
    values: BTreeMap<String, String>,
}

impl Placeholders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(|v| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values are escaped so regex metacharacters in a basename match literally.
    fn fill_pattern(&self, pattern: &str) -> String {
        self.fill(pattern, regex::escape)
    }

    /// `$` would start a capture-group reference in a replacement string.
    fn fill_replacement(&self, replacement: &str) -> String {
        self.fill(replacement, |value| value.replace('$', "$$"))
    }

    fn fill(&self, text: &str, encode: impl Fn(&str) -> String) -> String {
        self.values.iter().fold(text.to_string(), |acc, (name, value)| {
            acc.replace(&format!("{{{}}}", name), &encode(value))
        })
    }
}

/// The basename of a file without its extension, e.g. `mprage` for `anat_1/mprage.nii.gz`.
///
/// A compressed suffix is removed together with the extension before it.
pub fn basename_token(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = name.strip_suffix(COMPRESSED_SUFFIX).unwrap_or(&name);
    match name.rfind('.') {
        Some(dot) if dot > 0 => name[..dot].to_string(),
        _ => name.to_string(),
    }
}
