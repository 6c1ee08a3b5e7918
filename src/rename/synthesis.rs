// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{COMPRESSED_SUFFIX, UNCOMPRESSED_EXTENSION};
use crate::rename::RenameRule;

/// Parallel rules for compressed artifacts.
///
/// A rule qualifies when its pattern is anchored right after the uncompressed
/// extension (`...nii$`) and its replacement ends in that extension (`....nii`).
/// The variant matches `...nii.gz` and writes `....nii.gz`. Output order follows
/// the input order; rules that do not qualify produce nothing.
///
/// ```
/// use the_boxwood::rename::{compressed_variants, RenameRule};
///
/// let rules = vec![RenameRule::new(r"/c1sub01.*nii$", "/sub01_gm.nii")];
/// let variants = compressed_variants(&rules);
/// assert_eq!(variants, vec![RenameRule::new(r"/c1sub01.*nii\.gz$", "/sub01_gm.nii.gz")]);
/// ```
pub fn compressed_variants(rules: &[RenameRule]) -> Vec<RenameRule> {
    let anchored = format!("{}$", UNCOMPRESSED_EXTENSION.trim_start_matches('.'));
    rules
        .iter()
        .filter(|rule| {
            rule.pattern.ends_with(&anchored) && rule.replacement.ends_with(UNCOMPRESSED_EXTENSION)
        })
        .filter_map(|rule| {
            let stem = rule.pattern.strip_suffix('$')?;
            Some(RenameRule::new(
                format!("{}{}$", stem, regex::escape(COMPRESSED_SUFFIX)),
                format!("{}{}", rule.replacement, COMPRESSED_SUFFIX),
            ))
        })
        .collect()
}

/// The declared rules followed by their compressed variants.
pub fn with_compressed_variants(declared: Vec<RenameRule>) -> Vec<RenameRule> {
    let variants = compressed_variants(&declared);
    let mut rules = declared;
    rules.extend(variants);
    rules
}
