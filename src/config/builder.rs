// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Turn a flat, name-referenced unit list into an owned tree.

use crate::config::{validate_graph, PredictorConfig, UnitConfig};
use crate::errors::ConfigError;
use crate::graph::{PredictiveUnit, PredictorSpec};
use std::collections::HashMap;
use std::sync::Arc;

/// Validate `predictor` and build its [`PredictorSpec`].
///
/// Children keep their declared order, which is the order a combiner
/// presents their results in.
pub fn build_predictor(predictor: &PredictorConfig) -> Result<PredictorSpec, ConfigError> {
    validate_graph(predictor).map_err(ConfigError::Invalid)?;

    let units: HashMap<&str, &UnitConfig> = predictor
        .units
        .iter()
        .map(|unit| (unit.name.as_str(), unit))
        .collect();

    let root = build_unit(&predictor.graph, &units);
    PredictorSpec::new(predictor.name.clone(), root).map_err(ConfigError::Invalid)
}

// Only called on a validated list: every name resolves and there are no cycles.
fn build_unit(name: &str, units: &HashMap<&str, &UnitConfig>) -> PredictiveUnit {
    let Some(config) = units.get(name) else {
        return PredictiveUnit::new(name, crate::graph::UnitType::Unknown, None);
    };

    let mut unit = PredictiveUnit::new(
        config.name.clone(),
        config.unit_type,
        config.endpoint.clone(),
    );
    unit.children = config
        .children
        .iter()
        .map(|child| Arc::new(build_unit(child, units)))
        .collect();
    unit
}
