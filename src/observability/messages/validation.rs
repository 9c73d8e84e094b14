// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for graph configuration validation.
//!
//! This module contains message types for logging events related to:
//! * Validation lifecycle for a predictor's unit list
//! * Individual structural problems (cycles, shared children, missing units)

use crate::errors::GraphValidationError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Graph validation started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use predictive_graph::observability::messages::validation::ValidationStarted;
///
/// let msg = ValidationStarted {
///     predictor: "fraud-detector",
///     unit_count: 5,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ValidationStarted<'a> {
    pub predictor: &'a str,
    pub unit_count: usize,
}

impl Display for ValidationStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Validating graph for predictor '{}' with {} units",
            self.predictor, self.unit_count
        )
    }
}

impl StructuredLog for ValidationStarted<'_> {
    fn log(&self) {
        tracing::info!(
            predictor = self.predictor,
            unit_count = self.unit_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::INFO,
            "span_name",
            name = name,
            predictor = self.predictor,
            unit_count = self.unit_count,
        )
    }
}

/// Graph validation passed.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ValidationCompleted<'a> {
    pub predictor: &'a str,
    pub unit_count: usize,
}

impl Display for ValidationCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Graph validation completed successfully for predictor '{}' ({} units)",
            self.predictor, self.unit_count
        )
    }
}

impl StructuredLog for ValidationCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            predictor = self.predictor,
            unit_count = self.unit_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::INFO,
            "span_name",
            name = name,
            predictor = self.predictor,
            unit_count = self.unit_count,
        )
    }
}

/// Graph validation failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ValidationFailed<'a> {
    pub predictor: &'a str,
    pub error_count: usize,
}

impl Display for ValidationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Graph validation failed for predictor '{}' with {} errors",
            self.predictor, self.error_count
        )
    }
}

impl StructuredLog for ValidationFailed<'_> {
    fn log(&self) {
        tracing::error!(
            predictor = self.predictor,
            error_count = self.error_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::ERROR,
            "span_name",
            name = name,
            predictor = self.predictor,
            error_count = self.error_count,
        )
    }
}

/// One structural problem found in the unit list.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct GraphProblem<'a> {
    pub error: &'a GraphValidationError,
}

impl GraphProblem<'_> {
    fn kind(&self) -> &'static str {
        match self.error {
            GraphValidationError::DuplicateUnitName { .. } => "duplicate_unit_name",
            GraphValidationError::UnresolvedChild { .. } => "unresolved_child",
            GraphValidationError::SharedChild { .. } => "shared_child",
            GraphValidationError::CyclicGraph { .. } => "cyclic_graph",
            GraphValidationError::MissingRoot { .. } => "missing_root",
            GraphValidationError::UnreachableUnit { .. } => "unreachable_unit",
            GraphValidationError::MissingEndpoint { .. } => "missing_endpoint",
        }
    }
}

impl Display for GraphProblem<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl StructuredLog for GraphProblem<'_> {
    fn log(&self) {
        tracing::error!(kind = self.kind(), "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::ERROR,
            "span_name",
            name = name,
            kind = self.kind(),
        )
    }
}
