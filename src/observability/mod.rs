// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and diagnostics.
//!
//! Log events are struct-based messages with a `Display` implementation, so
//! the text of every line lives in one place and carries typed fields.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::engine` - request lifecycle, unit calls, fan-out and routing
//! * `messages::metadata` - metadata aggregation and shape checks
//! * `messages::validation` - graph configuration validation
//!
//! Engine components emit through a [`sink::DiagnosticsSink`]; the default
//! [`sink::TracingSink`] forwards to `tracing`.
//!
//! # Usage
//!
//! ```rust
//! use predictive_graph::observability::messages::engine::UnitCallFailed;
//!
//! let error = std::io::Error::new(std::io::ErrorKind::Other, "connection refused");
//! let msg = UnitCallFailed {
//!     unit: "classifier",
//!     operation: "predict",
//!     error: &error,
//! };
//!
//! tracing::warn!("{}", msg);
//! ```

pub mod messages;
pub mod sink;

pub use sink::{DiagnosticsSink, RecordingSink, TracingSink};
