// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for metadata aggregation and shape checking.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Graph metadata aggregation started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use predictive_graph::observability::messages::metadata::AggregationStarted;
///
/// let msg = AggregationStarted {
///     predictor: "fraud-detector",
///     unit_count: 4,
///     strict: true,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct AggregationStarted<'a> {
    pub predictor: &'a str,
    pub unit_count: usize,
    pub strict: bool,
}

impl Display for AggregationStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let mode = if self.strict { "strict" } else { "lenient" };
        write!(
            f,
            "Aggregating metadata for predictor '{}' ({} units, {} shape validation)",
            self.predictor, self.unit_count, mode
        )
    }
}

impl StructuredLog for AggregationStarted<'_> {
    fn log(&self) {
        tracing::info!(
            predictor = self.predictor,
            unit_count = self.unit_count,
            strict = self.strict,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "metadata_aggregation",
            span_name = name,
            predictor = self.predictor,
            unit_count = self.unit_count,
        )
    }
}

/// Graph metadata aggregation finished.
///
/// # Log Level
/// `info!` - Important operational event
pub struct AggregationCompleted<'a> {
    pub predictor: &'a str,
    pub model_count: usize,
    pub inputs_known: bool,
    pub outputs_known: bool,
}

impl Display for AggregationCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Aggregated metadata for predictor '{}': {} models, graph inputs {}, graph outputs {}",
            self.predictor,
            self.model_count,
            known(self.inputs_known),
            known(self.outputs_known)
        )
    }
}

fn known(flag: bool) -> &'static str {
    if flag {
        "known"
    } else {
        "unknown"
    }
}

impl StructuredLog for AggregationCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            predictor = self.predictor,
            model_count = self.model_count,
            inputs_known = self.inputs_known,
            outputs_known = self.outputs_known,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "metadata_aggregation_completed",
            span_name = name,
            predictor = self.predictor,
            model_count = self.model_count,
        )
    }
}

/// A unit's metadata was fetched from its backend.
///
/// # Log Level
/// `debug!` - Per-call detail
pub struct UnitMetadataFetched<'a> {
    pub unit: &'a str,
    pub platform: &'a str,
    pub input_count: Option<usize>,
    pub output_count: Option<usize>,
}

impl Display for UnitMetadataFetched<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Fetched metadata for unit '{}' (platform '{}'): inputs={:?}, outputs={:?}",
            self.unit, self.platform, self.input_count, self.output_count
        )
    }
}

impl StructuredLog for UnitMetadataFetched<'_> {
    fn log(&self) {
        tracing::debug!(
            unit = self.unit,
            platform = self.platform,
            input_count = ?self.input_count,
            output_count = ?self.output_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "unit_metadata_fetched",
            span_name = name,
            unit = self.unit,
        )
    }
}

/// A leaf unit whose type is not MODEL; its own signature is used as-is.
///
/// # Log Level
/// `warn!` - Unusual configuration
pub struct LeafOfUnexpectedType<'a> {
    pub unit: &'a str,
    pub unit_type: &'a str,
}

impl Display for LeafOfUnexpectedType<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Leaf unit '{}' has type {}; using its own signature",
            self.unit, self.unit_type
        )
    }
}

impl StructuredLog for LeafOfUnexpectedType<'_> {
    fn log(&self) {
        tracing::warn!(unit = self.unit, unit_type = self.unit_type, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "leaf_of_unexpected_type",
            span_name = name,
            unit = self.unit,
            unit_type = self.unit_type,
        )
    }
}

/// A non-leaf unit of a type with no shape rule; its sub-graph shape is unknown.
///
/// # Log Level
/// `warn!` - Unusual configuration
pub struct UnknownNodeShape<'a> {
    pub unit: &'a str,
    pub unit_type: &'a str,
}

impl Display for UnknownNodeShape<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Unit '{}' of type {} has no shape rule; sub-graph shape is unknown",
            self.unit, self.unit_type
        )
    }
}

impl StructuredLog for UnknownNodeShape<'_> {
    fn log(&self) {
        tracing::warn!(unit = self.unit, unit_type = self.unit_type, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "unknown_node_shape",
            span_name = name,
            unit = self.unit,
            unit_type = self.unit_type,
        )
    }
}

/// Two signatures that should agree do not.
///
/// Logged at `warn!` in lenient mode, where the mismatch is tolerated, and at
/// `error!` in strict mode right before the aggregation fails.
pub struct ShapeMismatch<'a> {
    pub unit: &'a str,
    pub boundary: &'a str,
    pub fatal: bool,
}

impl Display for ShapeMismatch<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Shape mismatch at unit '{}': {}", self.unit, self.boundary)
    }
}

impl StructuredLog for ShapeMismatch<'_> {
    fn log(&self) {
        if self.fatal {
            tracing::error!(unit = self.unit, boundary = self.boundary, "{}", self);
        } else {
            tracing::warn!(unit = self.unit, boundary = self.boundary, "{}", self);
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "shape_mismatch",
            span_name = name,
            unit = self.unit,
            boundary = self.boundary,
        )
    }
}
