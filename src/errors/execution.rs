// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for graph execution and metadata aggregation.
//!
//! Every variant names the unit involved so front-ends can report which part
//! of the graph failed. Nothing here is retried by the engine.

use crate::errors::PayloadError;
use crate::graph::UnitType;
use std::fmt;
use thiserror::Error;

/// The unit-level operation that was in progress when an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Predict,
    Feedback,
    Metadata,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Predict => "predict",
            Operation::Feedback => "feedback",
            Operation::Metadata => "metadata",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum EngineError {
    /// A unit client call returned an error or a non-success status.
    #[error("{operation} call to unit '{unit}' failed: {message}")]
    BackendCallFailure {
        unit: String,
        operation: Operation,
        message: String,
    },

    /// Two tensor signatures that must agree do not.
    #[error("shape incompatibility at unit '{unit}': {boundary}")]
    ShapeIncompatibility { unit: String, boundary: String },

    /// A unit's declared type has no traversal rule.
    #[error("unit '{unit}' has unrecognized type {unit_type:?} during {operation}")]
    UnrecognizedNodeType {
        unit: String,
        unit_type: UnitType,
        operation: Operation,
    },

    /// A router's selection policy did not produce a usable child index.
    #[error("routing failed at unit '{unit}': {message}")]
    RoutingFailure { unit: String, message: String },

    /// The caller cancelled the request.
    #[error("request cancelled")]
    Cancelled,

    /// The request deadline or per-call timeout elapsed.
    #[error("{operation} call to unit '{unit}' timed out")]
    Timeout { unit: String, operation: Operation },

    /// A unit that must call its backend has no endpoint.
    #[error("unit '{unit}' has no endpoint")]
    MissingEndpoint { unit: String },

    /// A direct metadata lookup named a unit that is not in the graph.
    #[error("unit '{unit}' not found in graph")]
    UnitNotFound { unit: String },

    /// A unit's metadata response could not be decoded.
    #[error("metadata for unit '{unit}' could not be decoded: {message}")]
    MetadataDecode { unit: String, message: String },

    #[error(transparent)]
    Payload(#[from] PayloadError),
}
