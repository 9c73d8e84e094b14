// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::context::{CallContext, Headers};
use crate::errors::ClientError;
use crate::graph::EndpointType;
use crate::payload::Payload;

/// Capability the engine uses to reach one predictive unit's backend.
///
/// Implementations own the transport (REST, gRPC, in-process). The engine
/// wraps every call with the request's cancellation token, deadline and
/// per-call timeout, so implementations don't need to race on `ctx`
/// themselves; it is passed through for clients that want to propagate the
/// deadline on the wire.
#[async_trait]
pub trait UnitClient: Send + Sync {
    async fn predict(
        &self,
        ctx: &CallContext,
        unit_name: &str,
        host: &str,
        port: u16,
        payload: Payload,
        headers: &Headers,
    ) -> Result<Payload, ClientError>;

    async fn feedback(
        &self,
        ctx: &CallContext,
        unit_name: &str,
        host: &str,
        port: u16,
        payload: Payload,
        headers: &Headers,
    ) -> Result<Payload, ClientError>;

    /// Fetch the unit's own metadata; `payload` is usually `None`.
    async fn metadata(
        &self,
        ctx: &CallContext,
        unit_name: &str,
        host: &str,
        port: u16,
        payload: Option<Payload>,
        headers: &Headers,
    ) -> Result<Payload, ClientError>;

    fn name(&self) -> &'static str;

    /// Whether this client can speak to an endpoint of the given protocol.
    fn supports(&self, _endpoint_type: EndpointType) -> bool {
        true
    }
}
