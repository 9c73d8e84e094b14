// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for predict/feedback traversal events.
//!
//! This module contains message types for logging events related to:
//! * Graph-level request lifecycle (start, completion, failure)
//! * Individual unit calls made through the unit client
//! * Combiner fan-out and router decisions

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A graph-level request entered the engine.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use predictive_graph::observability::messages::engine::GraphRequestStarted;
///
/// let msg = GraphRequestStarted {
///     predictor: "fraud-detector",
///     operation: "predict",
///     correlation_id: "req-1",
///     unit_count: 3,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct GraphRequestStarted<'a> {
    pub predictor: &'a str,
    pub operation: &'a str,
    pub correlation_id: &'a str,
    pub unit_count: usize,
}

impl Display for GraphRequestStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting {} on predictor '{}' ({} units), correlation_id={}",
            self.operation, self.predictor, self.unit_count, self.correlation_id
        )
    }
}

impl StructuredLog for GraphRequestStarted<'_> {
    fn log(&self) {
        tracing::info!(
            predictor = self.predictor,
            operation = self.operation,
            correlation_id = self.correlation_id,
            unit_count = self.unit_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "graph_request",
            span_name = name,
            predictor = self.predictor,
            operation = self.operation,
            correlation_id = self.correlation_id,
        )
    }
}

/// A graph-level request finished successfully.
///
/// # Log Level
/// `info!` - Important operational event
pub struct GraphRequestCompleted<'a> {
    pub predictor: &'a str,
    pub operation: &'a str,
    pub correlation_id: &'a str,
    pub duration: std::time::Duration,
}

impl Display for GraphRequestCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Completed {} on predictor '{}' in {:?}, correlation_id={}",
            self.operation, self.predictor, self.duration, self.correlation_id
        )
    }
}

impl StructuredLog for GraphRequestCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            predictor = self.predictor,
            operation = self.operation,
            correlation_id = self.correlation_id,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "graph_request_completed",
            span_name = name,
            predictor = self.predictor,
            operation = self.operation,
            duration = ?self.duration,
        )
    }
}

/// A graph-level request failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct GraphRequestFailed<'a> {
    pub predictor: &'a str,
    pub operation: &'a str,
    pub correlation_id: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for GraphRequestFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} on predictor '{}' failed: {}, correlation_id={}",
            self.operation, self.predictor, self.error, self.correlation_id
        )
    }
}

impl StructuredLog for GraphRequestFailed<'_> {
    fn log(&self) {
        tracing::error!(
            predictor = self.predictor,
            operation = self.operation,
            correlation_id = self.correlation_id,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "graph_request_failed",
            span_name = name,
            predictor = self.predictor,
            operation = self.operation,
            error = %self.error,
        )
    }
}

/// About to call a unit's backend.
///
/// # Log Level
/// `debug!` - Per-call detail
pub struct UnitCallStarted<'a> {
    pub unit: &'a str,
    pub unit_type: &'a str,
    pub operation: &'a str,
    pub input_size: usize,
}

impl Display for UnitCallStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Calling {} on {} unit '{}': input_size={} bytes",
            self.operation, self.unit_type, self.unit, self.input_size
        )
    }
}

impl StructuredLog for UnitCallStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            unit = self.unit,
            unit_type = self.unit_type,
            operation = self.operation,
            input_size = self.input_size,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "unit_call",
            span_name = name,
            unit = self.unit,
            unit_type = self.unit_type,
            operation = self.operation,
        )
    }
}

/// A unit's backend answered.
///
/// # Log Level
/// `debug!` - Per-call detail
pub struct UnitCallCompleted<'a> {
    pub unit: &'a str,
    pub operation: &'a str,
    pub output_size: usize,
    pub duration: std::time::Duration,
}

impl Display for UnitCallCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Unit '{}' {} completed: output={} bytes, duration={:?}",
            self.unit, self.operation, self.output_size, self.duration
        )
    }
}

impl StructuredLog for UnitCallCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            unit = self.unit,
            operation = self.operation,
            output_size = self.output_size,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "unit_call_completed",
            span_name = name,
            unit = self.unit,
            operation = self.operation,
        )
    }
}

/// A unit's backend call failed, timed out or was cancelled.
///
/// # Log Level
/// `warn!` - The graph request will fail
pub struct UnitCallFailed<'a> {
    pub unit: &'a str,
    pub operation: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for UnitCallFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Unit '{}' {} failed: {}",
            self.unit, self.operation, self.error
        )
    }
}

impl StructuredLog for UnitCallFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            unit = self.unit,
            operation = self.operation,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "unit_call_failed",
            span_name = name,
            unit = self.unit,
            operation = self.operation,
            error = %self.error,
        )
    }
}

/// A combiner is fanning the request out to its children.
///
/// # Log Level
/// `debug!` - Per-call detail
pub struct CombinerFanOut<'a> {
    pub unit: &'a str,
    pub child_count: usize,
    pub max_concurrency: usize,
}

impl Display for CombinerFanOut<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Combiner '{}' fanning out to {} children, max_concurrency={}",
            self.unit, self.child_count, self.max_concurrency
        )
    }
}

impl StructuredLog for CombinerFanOut<'_> {
    fn log(&self) {
        tracing::debug!(
            unit = self.unit,
            child_count = self.child_count,
            max_concurrency = self.max_concurrency,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "combiner_fan_out",
            span_name = name,
            unit = self.unit,
            child_count = self.child_count,
        )
    }
}

/// Sibling calls still in flight when a combiner failed; they drain in the background.
///
/// # Log Level
/// `debug!` - Per-call detail
pub struct SiblingCallsDetached<'a> {
    pub unit: &'a str,
    pub pending: usize,
}

impl Display for SiblingCallsDetached<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Combiner '{}' failed; {} sibling calls left to drain",
            self.unit, self.pending
        )
    }
}

impl StructuredLog for SiblingCallsDetached<'_> {
    fn log(&self) {
        tracing::debug!(unit = self.unit, pending = self.pending, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "sibling_calls_detached",
            span_name = name,
            unit = self.unit,
            pending = self.pending,
        )
    }
}

/// A router picked a child.
///
/// # Log Level
/// `debug!` - Per-call detail
pub struct RouteSelected<'a> {
    pub unit: &'a str,
    pub strategy: &'a str,
    pub child: &'a str,
    pub child_index: usize,
}

impl Display for RouteSelected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Router '{}' selected child '{}' (index {}) via {}",
            self.unit, self.child, self.child_index, self.strategy
        )
    }
}

impl StructuredLog for RouteSelected<'_> {
    fn log(&self) {
        tracing::debug!(
            unit = self.unit,
            strategy = self.strategy,
            child = self.child,
            child_index = self.child_index,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "route_selected",
            span_name = name,
            unit = self.unit,
            child = self.child,
        )
    }
}

/// A MODEL/TRANSFORMER/OUTPUT_TRANSFORMER unit declares more than one child.
///
/// Only the first child takes part in the data flow.
///
/// # Log Level
/// `warn!` - Configuration smell
pub struct ExtraChildrenIgnored<'a> {
    pub unit: &'a str,
    pub unit_type: &'a str,
    pub ignored: usize,
}

impl Display for ExtraChildrenIgnored<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} unit '{}' has {} extra children; only the first one is used",
            self.unit_type, self.unit, self.ignored
        )
    }
}

impl StructuredLog for ExtraChildrenIgnored<'_> {
    fn log(&self) {
        tracing::warn!(
            unit = self.unit,
            unit_type = self.unit_type,
            ignored = self.ignored,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "extra_children_ignored",
            span_name = name,
            unit = self.unit,
            ignored = self.ignored,
        )
    }
}
