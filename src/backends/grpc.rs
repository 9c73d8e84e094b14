// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! gRPC unit client over a plain `tonic` channel.
//!
//! Channels are created lazily per `host:port` and reused. Every caller header
//! is copied into request metadata, and the request deadline, when there is
//! one, goes out as `grpc-timeout`.

use crate::context::{CallContext, Headers};
use crate::errors::ClientError;
use crate::graph::{EndpointType, TensorDescriptor, UnitMetadata};
use crate::payload::Payload;
use crate::proto::unit_v1::{
    MetadataRequest, PredictionMessage, PredictionMessageList, TensorMetadata,
    UnitMetadataResponse,
};
use crate::traits::UnitClient;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::metadata::{Ascii, MetadataKey, MetadataValue};
use tonic::transport::{Channel, Endpoint};

const PREDICT_PATH: &str = "/unit.v1.Unit/Predict";
const AGGREGATE_PATH: &str = "/unit.v1.Unit/Aggregate";
const FEEDBACK_PATH: &str = "/unit.v1.Unit/SendFeedback";
const METADATA_PATH: &str = "/unit.v1.Unit/Metadata";

#[derive(Default)]
pub struct GrpcUnitClient {
    channels: Mutex<HashMap<(String, u16), Channel>>,
}

impl GrpcUnitClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn channel(&self, host: &str, port: u16) -> Result<Channel, ClientError> {
        let key = (host.to_string(), port);
        let mut channels = self
            .channels
            .lock()
            .map_err(|e| ClientError::Transport(format!("channel cache poisoned: {}", e)))?;

        if let Some(channel) = channels.get(&key) {
            return Ok(channel.clone());
        }

        let channel = Endpoint::from_shared(format!("http://{}:{}", host, port))
            .map_err(|e| {
                ClientError::Transport(format!("invalid endpoint {}:{}: {}", host, port, e))
            })?
            .connect_lazy();
        channels.insert(key, channel.clone());
        Ok(channel)
    }

    async fn unary<Req, Resp>(
        &self,
        ctx: &CallContext,
        host: &str,
        port: u16,
        path: &'static str,
        message: Req,
        headers: &Headers,
    ) -> Result<Resp, ClientError>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        let mut grpc = tonic::client::Grpc::new(self.channel(host, port)?);
        grpc.ready()
            .await
            .map_err(|e| ClientError::Transport(format!("{}:{} not ready: {}", host, port, e)))?;

        let request = build_request(ctx, message, headers);
        let codec: ProstCodec<Req, Resp> = ProstCodec::default();
        let response = grpc
            .unary(request, PathAndQuery::from_static(path), codec)
            .await
            .map_err(|status| ClientError::Status {
                code: status.code() as i32,
                message: status.message().to_string(),
            })?;

        Ok(response.into_inner())
    }
}

fn build_request<T>(ctx: &CallContext, message: T, headers: &Headers) -> tonic::Request<T> {
    let mut request = tonic::Request::new(message);

    for (name, values) in headers {
        let Ok(key) = MetadataKey::<Ascii>::from_bytes(name.as_bytes()) else {
            tracing::debug!(header = name.as_str(), "skipping header not valid as gRPC metadata");
            continue;
        };
        for value in values {
            if let Ok(value) = MetadataValue::try_from(value.as_str()) {
                request.metadata_mut().append(key.clone(), value);
            }
        }
    }

    if let Some(deadline) = ctx.deadline() {
        request.set_timeout(deadline.saturating_duration_since(tokio::time::Instant::now()));
    }

    request
}

fn tensors(slots: Vec<TensorMetadata>) -> Option<Vec<TensorDescriptor>> {
    // proto3 can't tell an absent list from an empty one; treat empty as undeclared.
    if slots.is_empty() {
        return None;
    }
    Some(
        slots
            .into_iter()
            .map(|t| TensorDescriptor::new(t.name, t.datatype, t.shape))
            .collect(),
    )
}

impl From<UnitMetadataResponse> for UnitMetadata {
    fn from(response: UnitMetadataResponse) -> Self {
        UnitMetadata {
            name: response.name,
            platform: response.platform,
            versions: response.versions,
            inputs: tensors(response.inputs),
            outputs: tensors(response.outputs),
        }
    }
}

#[async_trait]
impl UnitClient for GrpcUnitClient {
    async fn predict(
        &self,
        ctx: &CallContext,
        _unit_name: &str,
        host: &str,
        port: u16,
        payload: Payload,
        headers: &Headers,
    ) -> Result<Payload, ClientError> {
        let response: PredictionMessage = match &payload {
            Payload::List(_) => {
                let list: PredictionMessageList = payload.to_prediction_list()?;
                self.unary(ctx, host, port, AGGREGATE_PATH, list, headers)
                    .await?
            }
            _ => {
                let message = payload.to_prediction_message()?;
                self.unary(ctx, host, port, PREDICT_PATH, message, headers)
                    .await?
            }
        };
        Ok(Payload::Proto(response))
    }

    async fn feedback(
        &self,
        ctx: &CallContext,
        _unit_name: &str,
        host: &str,
        port: u16,
        payload: Payload,
        headers: &Headers,
    ) -> Result<Payload, ClientError> {
        let message = payload.to_prediction_message()?;
        let response: PredictionMessage = self
            .unary(ctx, host, port, FEEDBACK_PATH, message, headers)
            .await?;
        Ok(Payload::Proto(response))
    }

    async fn metadata(
        &self,
        ctx: &CallContext,
        unit_name: &str,
        host: &str,
        port: u16,
        _payload: Option<Payload>,
        headers: &Headers,
    ) -> Result<Payload, ClientError> {
        let request = MetadataRequest {
            name: unit_name.to_string(),
        };
        let response: UnitMetadataResponse = self
            .unary(ctx, host, port, METADATA_PATH, request, headers)
            .await?;
        Ok(Payload::from_json(&UnitMetadata::from(response))?)
    }

    fn name(&self) -> &'static str {
        "grpc"
    }

    fn supports(&self, endpoint_type: EndpointType) -> bool {
        endpoint_type == EndpointType::Grpc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CORRELATION_ID_HEADER;
    use std::time::Duration;

    #[test]
    fn test_headers_become_metadata() {
        let mut headers = Headers::new();
        headers.insert(CORRELATION_ID_HEADER.to_string(), vec!["req-1".to_string()]);
        headers.insert("x-multi".to_string(), vec!["a".to_string(), "b".to_string()]);
        headers.insert("bad header".to_string(), vec!["skipped".to_string()]);

        let request = build_request(&CallContext::new(), (), &headers);
        let metadata = request.metadata();

        assert_eq!(metadata.get(CORRELATION_ID_HEADER).unwrap(), "req-1");
        assert_eq!(metadata.get_all("x-multi").iter().count(), 2);
        assert!(metadata.get("bad header").is_none());
    }

    #[tokio::test]
    async fn test_deadline_sets_grpc_timeout() {
        let ctx = CallContext::new().with_timeout(Duration::from_secs(5));
        let request = build_request(&ctx, (), &Headers::new());
        assert!(request.metadata().get("grpc-timeout").is_some());
    }

    #[test]
    fn test_metadata_response_conversion() {
        let response = UnitMetadataResponse {
            name: "model".to_string(),
            versions: vec!["1".to_string()],
            platform: "onnx".to_string(),
            inputs: vec![TensorMetadata {
                name: "x".to_string(),
                datatype: "FP32".to_string(),
                shape: vec![1, 5],
            }],
            outputs: vec![],
        };

        let metadata = UnitMetadata::from(response);
        assert_eq!(metadata.inputs.unwrap()[0].shape, vec![1, 5]);
        assert_eq!(metadata.outputs, None);
    }

    #[test]
    fn test_only_grpc_endpoints_are_supported() {
        let client = GrpcUnitClient::new();
        assert!(client.supports(EndpointType::Grpc));
        assert!(!client.supports(EndpointType::Rest));
    }

    #[tokio::test]
    async fn test_channels_are_reused_per_address() {
        let client = GrpcUnitClient::new();
        client.channel("localhost", 9000).unwrap();
        client.channel("localhost", 9000).unwrap();
        client.channel("localhost", 9001).unwrap();
        assert_eq!(client.channels.lock().unwrap().len(), 2);
    }
}
