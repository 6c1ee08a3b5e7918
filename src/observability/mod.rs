// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Message types follow a struct-based pattern with a `Display` implementation
//! and a [`StructuredLog`](messages::StructuredLog) implementation, which keeps
//! log wording in one place and attaches the same fields to every event.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::graph` - node declaration, port extension, connection events
//! * `messages::attachment` - box composition and optional branch decisions
//! * `messages::rename` - rename rule installation and path rewriting
//! * `messages::engine` - reference engine lifecycle events
//!
//! # Usage
//!
//! ```rust
//! use the_boxwood::observability::messages::attachment::OptionalBranchSkipped;
//! use the_boxwood::observability::messages::StructuredLog;
//!
//! let msg = OptionalBranchSkipped {
//!     workflow: "spm_anat_preproc",
//!     branch: "atlas",
//!     reason: "no atlas file configured",
//! };
//!
//! msg.log();
//! ```

pub mod messages;
