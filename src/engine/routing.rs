// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Routing strategies for ROUTER units.

use crate::graph::PredictiveUnit;
use crate::payload::Payload;
use crate::proto::PredictionMessage;
use crate::traits::RoutingStrategy;
use serde_json::Value;

/// Always sends the request to the same child index.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedRoute(pub usize);

impl RoutingStrategy for FixedRoute {
    fn choose_child(
        &self,
        _router: &PredictiveUnit,
        _request: &Payload,
        _decision: Option<&Payload>,
    ) -> Result<usize, String> {
        Ok(self.0)
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Reads the child index from the router backend's own response.
///
/// Accepted decision shapes:
/// * a bare integer, as JSON or as a string body
/// * a nested array whose first element is the index, e.g. `[[1]]`
/// * a tensor-style body, `{"data": {"ndarray": [[1]]}}`
/// * a protobuf message whose `meta.routing` carries an entry for the router
#[derive(Debug, Clone, Copy, Default)]
pub struct BackendDecisionRoute;

impl RoutingStrategy for BackendDecisionRoute {
    fn choose_child(
        &self,
        router: &PredictiveUnit,
        _request: &Payload,
        decision: Option<&Payload>,
    ) -> Result<usize, String> {
        let decision =
            decision.ok_or_else(|| "router has no endpoint to produce a decision".to_string())?;
        let raw = index_from_payload(router, decision)?;
        usize::try_from(raw).map_err(|_| format!("routing decision {} is negative", raw))
    }

    fn name(&self) -> &'static str {
        "backend-decision"
    }
}

fn index_from_payload(router: &PredictiveUnit, decision: &Payload) -> Result<i64, String> {
    match decision {
        Payload::Json(value) => index_from_json(value),
        Payload::Proto(message) => index_from_message(router, message),
        Payload::Bytes(bytes) => {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| format!("routing decision is not UTF-8: {}", e))?;
            index_from_text(text)
        }
        Payload::List(_) => Err("routing decision cannot be a list".to_string()),
    }
}

fn index_from_message(router: &PredictiveUnit, message: &PredictionMessage) -> Result<i64, String> {
    if let Some(route) = message
        .meta
        .as_ref()
        .and_then(|meta| meta.routing.get(&router.name))
    {
        return Ok(i64::from(*route));
    }
    if !message.json_data.is_empty() {
        return index_from_text(&message.json_data);
    }
    if !message.str_data.is_empty() {
        return index_from_text(&message.str_data);
    }
    Err(format!(
        "protobuf decision carries no route for '{}'",
        router.name
    ))
}

fn index_from_text(text: &str) -> Result<i64, String> {
    let value: Value = serde_json::from_str(text.trim())
        .map_err(|e| format!("routing decision is not JSON: {}", e))?;
    index_from_json(&value)
}

fn index_from_json(value: &Value) -> Result<i64, String> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| format!("routing decision {} is not an integer", n)),
        Value::Array(items) => items
            .first()
            .ok_or_else(|| "routing decision is an empty array".to_string())
            .and_then(index_from_json),
        Value::Object(map) => match map.get("data").and_then(|data| data.get("ndarray")) {
            Some(ndarray) => index_from_json(ndarray),
            None => Err("routing decision object has no data.ndarray".to_string()),
        },
        other => Err(format!("unsupported routing decision: {}", other)),
    }
}
