// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::graph::EndpointType;
use std::fmt;
use thiserror::Error;

/// Errors that can occur while validating a declared predictive-unit graph
#[derive(Debug, Clone, PartialEq)]
pub enum GraphValidationError {
    /// Two units share the same name
    DuplicateUnitName {
        /// The duplicated unit name
        unit: String,
    },
    /// A unit lists a child that is not declared
    UnresolvedChild {
        /// The unit that references the missing child
        unit: String,
        /// The child name that couldn't be resolved
        missing_child: String,
    },
    /// A unit is listed as a child of more than one parent
    SharedChild {
        /// The child with several parents
        unit: String,
        /// Every parent claiming the child
        parents: Vec<String>,
    },
    /// A cycle was detected while following child links
    CyclicGraph {
        /// The cycle path showing the loop
        cycle: Vec<String>,
    },
    /// The declared root unit does not exist
    MissingRoot {
        /// The configured root name
        root: String,
    },
    /// A declared unit cannot be reached from the root
    UnreachableUnit {
        /// The orphaned unit
        unit: String,
    },
    /// A unit that must call its own backend has no endpoint
    MissingEndpoint {
        /// The unit without an endpoint
        unit: String,
    },
}

impl fmt::Display for GraphValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphValidationError::DuplicateUnitName { unit } => {
                write!(f, "Duplicate unit name: '{}'", unit)
            }
            GraphValidationError::UnresolvedChild {
                unit,
                missing_child,
            } => {
                write!(
                    f,
                    "Unit '{}' lists child '{}' which does not exist",
                    unit, missing_child
                )
            }
            GraphValidationError::SharedChild { unit, parents } => {
                write!(
                    f,
                    "Unit '{}' has more than one parent: [{}]",
                    unit,
                    parents.join(", ")
                )
            }
            GraphValidationError::CyclicGraph { cycle } => {
                write!(f, "Cycle detected in graph: {}", cycle.join(" -> "))
            }
            GraphValidationError::MissingRoot { root } => {
                write!(f, "Graph root '{}' is not a declared unit", root)
            }
            GraphValidationError::UnreachableUnit { unit } => {
                write!(f, "Unit '{}' is not reachable from the graph root", unit)
            }
            GraphValidationError::MissingEndpoint { unit } => {
                write!(f, "Unit '{}' has no endpoint", unit)
            }
        }
    }
}

impl std::error::Error for GraphValidationError {}

/// Errors raised while loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration validation failed:\n{}", join_errors(.0))]
    Invalid(Vec<GraphValidationError>),

    #[error("router '{unit}' has no endpoint to decide a route; set engine.fixed_route")]
    UndecidableRouter { unit: String },

    #[error("unit '{unit}' has a {endpoint_type} endpoint the {client} client cannot call")]
    UnsupportedEndpoint {
        unit: String,
        endpoint_type: EndpointType,
        client: &'static str,
    },
}

fn join_errors(errors: &[GraphValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
