// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::{ConfigError, GraphValidationError};
use crate::graph::PredictiveUnit;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// A resolved predictor: a name plus the root of its unit tree.
///
/// Cloning is cheap; the tree itself is shared. Every way of obtaining one,
/// including deserialization, goes through [`PredictorSpec::new`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictorSpec {
    name: String,
    graph: Arc<PredictiveUnit>,
}

/// Wire form of a spec before its invariants are checked.
#[derive(Deserialize)]
struct UncheckedSpec {
    name: String,
    graph: PredictiveUnit,
}

impl<'de> Deserialize<'de> for PredictorSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let unchecked = UncheckedSpec::deserialize(deserializer)?;
        PredictorSpec::new(unchecked.name, unchecked.graph)
            .map_err(|errors| de::Error::custom(ConfigError::Invalid(errors)))
    }
}

impl PredictorSpec {
    /// Wrap an already-built tree, checking the invariants the engine relies on.
    ///
    /// Owned `Arc` children can't form cycles, but a nested spec decoded from
    /// JSON can still repeat a name or omit an endpoint.
    pub fn new(
        name: impl Into<String>,
        graph: PredictiveUnit,
    ) -> Result<Self, Vec<GraphValidationError>> {
        let spec = Self {
            name: name.into(),
            graph: Arc::new(graph),
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Root of the unit tree.
    pub fn graph(&self) -> &Arc<PredictiveUnit> {
        &self.graph
    }

    pub fn validate(&self) -> Result<(), Vec<GraphValidationError>> {
        let mut seen = HashSet::new();
        let mut errors = Vec::new();

        for unit in self.graph.walk() {
            if !seen.insert(unit.name.as_str()) {
                errors.push(GraphValidationError::DuplicateUnitName {
                    unit: unit.name.clone(),
                });
            }
            if unit.unit_type.requires_endpoint() && unit.endpoint.is_none() {
                errors.push(GraphValidationError::MissingEndpoint {
                    unit: unit.name.clone(),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn find_unit(&self, name: &str) -> Option<&PredictiveUnit> {
        self.graph.find(name)
    }

    pub fn unit_count(&self) -> usize {
        self.graph.walk().len()
    }
}
