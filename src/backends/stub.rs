// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-memory unit clients and metadata sources for tests.

use crate::context::{CallContext, Headers};
use crate::errors::{ClientError, EngineError, Operation};
use crate::graph::{PredictiveUnit, UnitMetadata};
use crate::payload::Payload;
use crate::traits::{MetadataSource, UnitClient};
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// One call seen by a [`RecordingClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub operation: &'static str,
    pub unit: String,
    pub payload: Option<Payload>,
    pub headers: Headers,
}

/// Echo client that records every call.
///
/// `predict` and `feedback` answer with the JSON string `"<unit>(<input>)"`
/// so tests can read the data flow straight off the result. Lists render as
/// `[a,b]`. Per-unit delays, canned responses and metadata can be configured.
#[derive(Default)]
pub struct RecordingClient {
    delays: HashMap<String, Duration>,
    responses: HashMap<String, Payload>,
    metadata: HashMap<String, UnitMetadata>,
    calls: Mutex<Vec<RecordedCall>>,
    completions: Mutex<Vec<String>>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, unit: &str, delay: Duration) -> Self {
        self.delays.insert(unit.to_string(), delay);
        self
    }

    pub fn with_response(mut self, unit: &str, response: Payload) -> Self {
        self.responses.insert(unit.to_string(), response);
        self
    }

    pub fn with_metadata(mut self, unit: &str, metadata: UnitMetadata) -> Self {
        self.metadata.insert(unit.to_string(), metadata);
        self
    }

    /// Calls in the order they started, as `"<operation>:<unit>"`.
    pub fn calls(&self) -> Vec<String> {
        self.recorded()
            .iter()
            .map(|call| format!("{}:{}", call.operation, call.unit))
            .collect()
    }

    pub fn recorded(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Payloads the given unit received, in call order.
    pub fn inputs_for(&self, unit: &str) -> Vec<Payload> {
        self.recorded()
            .into_iter()
            .filter(|call| call.unit == unit)
            .filter_map(|call| call.payload)
            .collect()
    }

    /// Units whose calls returned, in completion order.
    pub fn completions(&self) -> Vec<String> {
        self.completions.lock().unwrap().clone()
    }

    async fn answer(
        &self,
        operation: &'static str,
        unit: &str,
        payload: Option<Payload>,
        headers: &Headers,
    ) -> Payload {
        self.calls.lock().unwrap().push(RecordedCall {
            operation,
            unit: unit.to_string(),
            payload: payload.clone(),
            headers: headers.clone(),
        });

        if let Some(delay) = self.delays.get(unit) {
            tokio::time::sleep(*delay).await;
        }
        self.completions.lock().unwrap().push(unit.to_string());

        if let Some(response) = self.responses.get(unit) {
            return response.clone();
        }
        let input = payload.as_ref().map(render).unwrap_or_default();
        Payload::Json(json!(format!("{}({})", unit, input)))
    }
}

/// Compact text form of a payload used by the echo responses.
pub fn render(payload: &Payload) -> String {
    match payload {
        Payload::Json(serde_json::Value::String(text)) => text.clone(),
        Payload::Json(value) => value.to_string(),
        Payload::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        Payload::Proto(message) => message.json_data.clone(),
        Payload::List(items) => {
            let parts: Vec<String> = items.iter().map(render).collect();
            format!("[{}]", parts.join(","))
        }
    }
}

#[async_trait]
impl UnitClient for RecordingClient {
    async fn predict(
        &self,
        _ctx: &CallContext,
        unit_name: &str,
        _host: &str,
        _port: u16,
        payload: Payload,
        headers: &Headers,
    ) -> Result<Payload, ClientError> {
        Ok(self.answer("predict", unit_name, Some(payload), headers).await)
    }

    async fn feedback(
        &self,
        _ctx: &CallContext,
        unit_name: &str,
        _host: &str,
        _port: u16,
        payload: Payload,
        headers: &Headers,
    ) -> Result<Payload, ClientError> {
        Ok(self.answer("feedback", unit_name, Some(payload), headers).await)
    }

    async fn metadata(
        &self,
        _ctx: &CallContext,
        unit_name: &str,
        _host: &str,
        _port: u16,
        payload: Option<Payload>,
        headers: &Headers,
    ) -> Result<Payload, ClientError> {
        self.answer("metadata", unit_name, payload, headers).await;
        match self.metadata.get(unit_name) {
            Some(metadata) => Ok(Payload::from_json(metadata)?),
            None => Err(ClientError::Status {
                code: 404,
                message: format!("no metadata for '{}'", unit_name),
            }),
        }
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Client that fails every call to one unit and echoes the rest.
pub struct FailingClient {
    failing_unit: String,
    delegate: RecordingClient,
}

impl FailingClient {
    pub fn new(failing_unit: &str) -> Self {
        Self {
            failing_unit: failing_unit.to_string(),
            delegate: RecordingClient::new(),
        }
    }

    pub fn with_delay(mut self, unit: &str, delay: Duration) -> Self {
        self.delegate = self.delegate.with_delay(unit, delay);
        self
    }

    pub fn delegate(&self) -> &RecordingClient {
        &self.delegate
    }

    fn check(&self, unit_name: &str) -> Result<(), ClientError> {
        if unit_name == self.failing_unit {
            return Err(ClientError::Status {
                code: 500,
                message: "Simulated backend failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl UnitClient for FailingClient {
    async fn predict(
        &self,
        ctx: &CallContext,
        unit_name: &str,
        host: &str,
        port: u16,
        payload: Payload,
        headers: &Headers,
    ) -> Result<Payload, ClientError> {
        self.check(unit_name)?;
        self.delegate
            .predict(ctx, unit_name, host, port, payload, headers)
            .await
    }

    async fn feedback(
        &self,
        ctx: &CallContext,
        unit_name: &str,
        host: &str,
        port: u16,
        payload: Payload,
        headers: &Headers,
    ) -> Result<Payload, ClientError> {
        self.check(unit_name)?;
        self.delegate
            .feedback(ctx, unit_name, host, port, payload, headers)
            .await
    }

    async fn metadata(
        &self,
        ctx: &CallContext,
        unit_name: &str,
        host: &str,
        port: u16,
        payload: Option<Payload>,
        headers: &Headers,
    ) -> Result<Payload, ClientError> {
        self.check(unit_name)?;
        self.delegate
            .metadata(ctx, unit_name, host, port, payload, headers)
            .await
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Metadata source serving fixed records by unit name.
#[derive(Default)]
pub struct MapMetadataSource {
    metadata: HashMap<String, UnitMetadata>,
    fetched: Mutex<Vec<String>>,
}

impl MapMetadataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, unit: &str, metadata: UnitMetadata) -> Self {
        self.metadata.insert(unit.to_string(), metadata);
        self
    }

    /// Units fetched so far, in fetch order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetadataSource for MapMetadataSource {
    async fn fetch(&self, unit: &PredictiveUnit) -> Result<UnitMetadata, EngineError> {
        self.fetched.lock().unwrap().push(unit.name.clone());
        if let Some(metadata) = self.metadata.get(&unit.name) {
            return Ok(metadata.clone());
        }
        // Matches the client-backed source for endpoint-less routers.
        if unit.endpoint.is_none() && !unit.unit_type.requires_endpoint() {
            return Ok(UnitMetadata {
                name: unit.name.clone(),
                ..UnitMetadata::default()
            });
        }
        Err(EngineError::BackendCallFailure {
            unit: unit.name.clone(),
            operation: Operation::Metadata,
            message: "no metadata registered".to_string(),
        })
    }
}
