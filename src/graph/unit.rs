// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The role a predictive unit plays in the graph.
///
/// Any declared type string that isn't one of the five known roles
/// deserializes to [`UnitType::Unknown`], so a bad type surfaces as a
/// configuration error at traversal time instead of a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitType {
    Model,
    Transformer,
    OutputTransformer,
    Combiner,
    Router,
    #[serde(other)]
    Unknown,
}

impl UnitType {
    /// Whether a unit of this type must reach its own backend on every call.
    ///
    /// Routers may run without an endpoint, in which case the routing
    /// strategy decides from the request alone.
    pub fn requires_endpoint(&self) -> bool {
        !matches!(self, UnitType::Router)
    }

    /// The declared name, as written in graph configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitType::Model => "MODEL",
            UnitType::Transformer => "TRANSFORMER",
            UnitType::OutputTransformer => "OUTPUT_TRANSFORMER",
            UnitType::Combiner => "COMBINER",
            UnitType::Router => "ROUTER",
            UnitType::Unknown => "UNKNOWN_TYPE",
        }
    }
}

impl std::fmt::Display for UnitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire protocol spoken by a unit's backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EndpointType {
    Rest,
    #[default]
    Grpc,
}

impl EndpointType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointType::Rest => "REST",
            EndpointType::Grpc => "GRPC",
        }
    }
}

impl std::fmt::Display for EndpointType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Network address of a unit's backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub service_host: String,
    pub service_port: u16,
    #[serde(rename = "type", default)]
    pub kind: EndpointType,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            service_host: host.into(),
            service_port: port,
            kind: EndpointType::default(),
        }
    }
}

/// One node of the inference graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictiveUnit {
    pub name: String,
    #[serde(rename = "type")]
    pub unit_type: UnitType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<Endpoint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Arc<PredictiveUnit>>,
}

impl PredictiveUnit {
    pub fn new(name: impl Into<String>, unit_type: UnitType, endpoint: Option<Endpoint>) -> Self {
        Self {
            name: name.into(),
            unit_type,
            endpoint,
            children: Vec::new(),
        }
    }

    /// Builder-style helper used when assembling trees by hand.
    pub fn with_child(mut self, child: PredictiveUnit) -> Self {
        self.children.push(Arc::new(child));
        self
    }

    pub fn first_child(&self) -> Option<&Arc<PredictiveUnit>> {
        self.children.first()
    }

    /// Pre-order walk over this unit and every descendant.
    pub fn walk(&self) -> Vec<&PredictiveUnit> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(unit) = stack.pop() {
            out.push(unit);
            for child in unit.children.iter().rev() {
                stack.push(child.as_ref());
            }
        }
        out
    }

    /// Find a unit by name in this sub-tree.
    pub fn find(&self, name: &str) -> Option<&PredictiveUnit> {
        self.walk().into_iter().find(|unit| unit.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> PredictiveUnit {
        PredictiveUnit::new("combiner", UnitType::Combiner, Some(Endpoint::new("localhost", 9000)))
            .with_child(
                PredictiveUnit::new("left", UnitType::Model, Some(Endpoint::new("localhost", 9001)))
                    .with_child(PredictiveUnit::new(
                        "left-child",
                        UnitType::Model,
                        Some(Endpoint::new("localhost", 9003)),
                    )),
            )
            .with_child(PredictiveUnit::new(
                "right",
                UnitType::Model,
                Some(Endpoint::new("localhost", 9002)),
            ))
    }

    #[test]
    fn test_walk_is_pre_order() {
        let tree = sample_tree();
        let names: Vec<&str> = tree.walk().iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["combiner", "left", "left-child", "right"]);
    }

    #[test]
    fn test_find_unit() {
        let tree = sample_tree();
        assert_eq!(tree.find("left-child").map(|u| u.unit_type), Some(UnitType::Model));
        assert!(tree.find("missing").is_none());
    }

    #[test]
    fn test_unit_type_parses_known_and_unknown() {
        let parsed: UnitType = serde_json::from_str("\"OUTPUT_TRANSFORMER\"").unwrap();
        assert_eq!(parsed, UnitType::OutputTransformer);

        let unknown: UnitType = serde_json::from_str("\"UNKNOWN_TYPE\"").unwrap();
        assert_eq!(unknown, UnitType::Unknown);
    }

    #[test]
    fn test_nested_unit_deserializes() {
        let json = r#"{
            "name": "model-1",
            "type": "MODEL",
            "endpoint": {"service_host": "localhost", "service_port": 9000},
            "children": [
                {"name": "model-2", "type": "MODEL",
                 "endpoint": {"service_host": "localhost", "service_port": 9001, "type": "REST"}}
            ]
        }"#;

        let unit: PredictiveUnit = serde_json::from_str(json).unwrap();
        assert_eq!(unit.children.len(), 1);
        assert_eq!(unit.endpoint.as_ref().map(|e| e.kind), Some(EndpointType::Grpc));
        assert_eq!(
            unit.children[0].endpoint.as_ref().map(|e| e.kind),
            Some(EndpointType::Rest)
        );
    }
}
