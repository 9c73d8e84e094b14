// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for a consistent human-readable line
//! and [`StructuredLog`] to emit the same event with typed fields.
//!
//! # Organization
//!
//! * `engine` - predict/feedback traversal and unit call events
//! * `metadata` - metadata aggregation and shape checking events
//! * `validation` - graph configuration validation errors
//!
//! # Usage Pattern
//!
//! ```rust
//! use predictive_graph::observability::messages::engine::UnitCallStarted;
//! use predictive_graph::observability::messages::StructuredLog;
//!
//! let msg = UnitCallStarted {
//!     unit: "classifier",
//!     unit_type: "MODEL",
//!     operation: "predict",
//!     input_size: 128,
//! };
//!
//! msg.log();
//! ```

use std::fmt::Display;
use tracing::Span;

pub mod engine;
pub mod metadata;
pub mod validation;

/// A log event that knows its own level and structured fields.
pub trait StructuredLog: Display {
    /// Emit the event at its natural level.
    fn log(&self);

    /// Open a span carrying the event's fields.
    fn span(&self, name: &str) -> Span;
}
