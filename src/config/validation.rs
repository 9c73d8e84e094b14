// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structural checks on a declared unit list before it becomes a tree.

use crate::config::PredictorConfig;
use crate::errors::GraphValidationError;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Check that the declared units form a proper rooted tree.
///
/// Name and reference problems are reported together. Tree-shape checks
/// (root, shared children, cycles, reachability) only run once every
/// reference resolves.
pub fn validate_graph(predictor: &PredictorConfig) -> Result<(), Vec<GraphValidationError>> {
    let mut errors = Vec::new();

    if let Err(duplicate_errors) = validate_unique_unit_names(predictor) {
        errors.extend(duplicate_errors);
    }

    if let Err(unresolved_errors) = validate_child_references(predictor) {
        errors.extend(unresolved_errors);
    }

    if let Err(endpoint_errors) = validate_endpoints(predictor) {
        errors.extend(endpoint_errors);
    }

    if errors.is_empty() {
        if let Err(shape_errors) = validate_tree_shape(predictor) {
            errors.extend(shape_errors);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_unique_unit_names(
    predictor: &PredictorConfig,
) -> Result<(), Vec<GraphValidationError>> {
    let mut seen = HashSet::new();
    let errors: Vec<_> = predictor
        .units
        .iter()
        .filter(|unit| !seen.insert(unit.name.as_str()))
        .map(|unit| GraphValidationError::DuplicateUnitName {
            unit: unit.name.clone(),
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_child_references(predictor: &PredictorConfig) -> Result<(), Vec<GraphValidationError>> {
    let names: HashSet<&str> = predictor.units.iter().map(|u| u.name.as_str()).collect();
    let mut errors = Vec::new();

    for unit in &predictor.units {
        for child in &unit.children {
            if !names.contains(child.as_str()) {
                errors.push(GraphValidationError::UnresolvedChild {
                    unit: unit.name.clone(),
                    missing_child: child.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_endpoints(predictor: &PredictorConfig) -> Result<(), Vec<GraphValidationError>> {
    let errors: Vec<_> = predictor
        .units
        .iter()
        .filter(|unit| unit.unit_type.requires_endpoint() && unit.endpoint.is_none())
        .map(|unit| GraphValidationError::MissingEndpoint {
            unit: unit.name.clone(),
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_tree_shape(predictor: &PredictorConfig) -> Result<(), Vec<GraphValidationError>> {
    let graph: HashMap<&str, Vec<&str>> = predictor
        .units
        .iter()
        .map(|unit| {
            (
                unit.name.as_str(),
                unit.children.iter().map(String::as_str).collect(),
            )
        })
        .collect();

    if !graph.contains_key(predictor.graph.as_str()) {
        return Err(vec![GraphValidationError::MissingRoot {
            root: predictor.graph.clone(),
        }]);
    }

    let mut errors = Vec::new();

    // BTreeMap keeps the reported order stable.
    let mut parents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for unit in &predictor.units {
        for child in &unit.children {
            parents.entry(child.as_str()).or_default().push(unit.name.as_str());
        }
    }
    for (child, claimed_by) in parents {
        if claimed_by.len() > 1 {
            errors.push(GraphValidationError::SharedChild {
                unit: child.to_string(),
                parents: claimed_by.iter().map(|p| p.to_string()).collect(),
            });
        }
    }

    let mut visited = HashSet::new();
    let mut rec_stack = HashSet::new();
    let mut path = Vec::new();
    for unit in &predictor.units {
        if !visited.contains(unit.name.as_str()) {
            if let Some(cycle) = dfs_cycle_detection(
                unit.name.as_str(),
                &graph,
                &mut visited,
                &mut rec_stack,
                &mut path,
            ) {
                errors.push(GraphValidationError::CyclicGraph { cycle });
                return Err(errors);
            }
        }
    }

    let mut reachable = HashSet::new();
    let mut stack = vec![predictor.graph.as_str()];
    while let Some(name) = stack.pop() {
        if reachable.insert(name) {
            if let Some(children) = graph.get(name) {
                stack.extend(children.iter().copied());
            }
        }
    }
    for unit in &predictor.units {
        if !reachable.contains(unit.name.as_str()) {
            errors.push(GraphValidationError::UnreachableUnit {
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

fn dfs_cycle_detection<'a>(
    node: &'a str,
    graph: &HashMap<&'a str, Vec<&'a str>>,
    visited: &mut HashSet<&'a str>,
    rec_stack: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    visited.insert(node);
    rec_stack.insert(node);
    path.push(node);

    if let Some(children) = graph.get(node) {
        for &child in children {
            if !visited.contains(child) {
                if let Some(cycle) = dfs_cycle_detection(child, graph, visited, rec_stack, path) {
                    return Some(cycle);
                }
            } else if rec_stack.contains(child) {
                let cycle_start = path.iter().position(|&n| n == child).unwrap_or(0);
                let mut cycle: Vec<String> =
                    path[cycle_start..].iter().map(|n| n.to_string()).collect();
                cycle.push(child.to_string());
                return Some(cycle);
            }
        }
    }

    rec_stack.remove(node);
    path.pop();
    None
}
