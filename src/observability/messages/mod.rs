// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! * `graph` - graph construction events
//! * `attachment` - box composition and conditional attachment events
//! * `rename` - output renaming events
//! * `engine` - execution lifecycle events

use tracing::Span;

pub mod attachment;
pub mod engine;
pub mod graph;
pub mod rename;

/// Emit a message as a `tracing` event (or span) with its fields attached.
pub trait StructuredLog {
    /// Log the message at its documented level.
    fn log(&self);

    /// Open a span carrying the message fields.
    fn span(&self, name: &str) -> Span;
}
