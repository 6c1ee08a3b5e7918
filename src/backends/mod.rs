// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Node body implementations.
//!
//! # Local Backend
//! In-process bodies every workflow needs regardless of which imaging tools are
//! installed:
//! - **Identity**: box boundaries and field-grouping nodes
//! - **Collector**: the data sink's open-input node
//! - **FunctionBody**: pure functions over port values
//! - **DeferredTool**: placeholder for an external tool that has no runner
//!
//! `ToolRegistry` resolves tool specs to bodies and is the default
//! [`ToolProvider`](crate::traits::ToolProvider).
//!
//! # Stub Backend (Test-Only)
//! Scripted bodies for engine and pipeline tests; not available in production builds.

pub mod local;
#[cfg(test)]
pub mod stub;
