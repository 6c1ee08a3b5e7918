// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the output renaming subsystem.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A rule set was appended to the sink's substitution list.
///
/// # Log Level
/// `info!` - Important operational event
pub struct RenameRulesInstalled<'a> {
    pub workflow: &'a str,
    pub declared: usize,
    pub synthesized: usize,
    pub total: usize,
}

impl Display for RenameRulesInstalled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Installed {} rename rules for '{}' ({} declared, {} compressed variants); sink now holds {}",
            self.declared + self.synthesized,
            self.workflow,
            self.declared,
            self.synthesized,
            self.total
        )
    }
}

impl StructuredLog for RenameRulesInstalled<'_> {
    fn log(&self) {
        tracing::info!(
            workflow = self.workflow,
            declared = self.declared,
            synthesized = self.synthesized,
            total = self.total,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "rename_rules_installed",
            span_name = name,
            workflow = self.workflow,
        )
    }
}

/// A produced path was rewritten by a rule.
///
/// # Log Level
/// `debug!` - Per-file detail
pub struct PathRenamed<'a> {
    pub source: &'a str,
    pub destination: &'a str,
    pub rule_index: usize,
}

impl Display for PathRenamed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Renamed '{}' to '{}' (rule #{})",
            self.source, self.destination, self.rule_index
        )
    }
}

impl StructuredLog for PathRenamed<'_> {
    fn log(&self) {
        tracing::debug!(
            source_path = self.source,
            destination = self.destination,
            rule_index = self.rule_index,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "path_renamed",
            span_name = name,
            source_path = self.source,
        )
    }
}

/// No rule matched a produced path; it keeps its name.
///
/// # Log Level
/// `warn!` when the sink is configured to flag unmatched paths, otherwise `debug!`
pub struct UnmatchedPath<'a> {
    pub path: &'a str,
    pub rule_count: usize,
    pub warn: bool,
}

impl Display for UnmatchedPath<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "No rename rule out of {} matched '{}'; keeping its name",
            self.rule_count, self.path
        )
    }
}

impl StructuredLog for UnmatchedPath<'_> {
    fn log(&self) {
        if self.warn {
            tracing::warn!(path = self.path, rule_count = self.rule_count, "{}", self);
        } else {
            tracing::debug!(path = self.path, rule_count = self.rule_count, "{}", self);
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "unmatched_path",
            span_name = name,
            path = self.path,
        )
    }
}
