// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! How each unit type takes part in traversal and in shape derivation.
//!
//! Both the executor and the metadata aggregator look a node up here and
//! follow the returned policy, so adding a unit type means adding one row.

use crate::graph::UnitType;

/// Order of calls at a node during predict and feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Own call, then the first child. Predict chains the own response into
    /// the child.
    OwnThenFirstChild,
    /// First child, then own call. Predict feeds the child's response to the
    /// own backend.
    FirstChildThenOwn,
    /// Every child concurrently, then own call. Predict sends the ordered
    /// child results to the own backend as a list.
    FanOutThenOwn,
    /// Own call produces a routing decision, then one selected child.
    Route,
}

/// How a node's effective signature is derived from its own and its children's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeRule {
    /// Own inputs, first child's outputs. Own outputs must feed the child.
    Chain,
    /// First child's inputs, own outputs. Child outputs must feed the node.
    Wrap,
    /// First child's inputs, own outputs. Strict mode checks every sibling.
    Combine,
    /// First child's signature. Strict mode checks every sibling.
    Route,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodePolicy {
    pub flow: Flow,
    pub shape: ShapeRule,
    /// Only the first child takes part; extra children are reported.
    pub single_child: bool,
}

/// Policy for a unit type, or `None` for a type with no traversal rule.
pub fn policy_for(unit_type: UnitType) -> Option<NodePolicy> {
    let policy = match unit_type {
        UnitType::Model | UnitType::Transformer => NodePolicy {
            flow: Flow::OwnThenFirstChild,
            shape: ShapeRule::Chain,
            single_child: true,
        },
        UnitType::OutputTransformer => NodePolicy {
            flow: Flow::FirstChildThenOwn,
            shape: ShapeRule::Wrap,
            single_child: true,
        },
        UnitType::Combiner => NodePolicy {
            flow: Flow::FanOutThenOwn,
            shape: ShapeRule::Combine,
            single_child: false,
        },
        UnitType::Router => NodePolicy {
            flow: Flow::Route,
            shape: ShapeRule::Route,
            single_child: false,
        },
        UnitType::Unknown => return None,
    };
    Some(policy)
}
