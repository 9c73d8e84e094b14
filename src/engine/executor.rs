// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Predict and feedback traversal over a predictive-unit tree.
//!
//! Each node follows the [`Flow`] its type maps to in the policy table. Chains
//! run strictly in sequence; a combiner's children run concurrently on a
//! [`JoinSet`] and their results are put back in declared order, whatever
//! order they finish in.
//!
//! # Concurrency Control
//!
//! Every request gets its own semaphore sized by `max_concurrency`. A permit
//! is held only for the duration of one client call, never while waiting on
//! children, so nested combiners cannot starve each other. The per-call
//! timeout starts once the permit is held; the request deadline covers the
//! wait as well.
//!
//! # Failure
//!
//! The first child failure fails the combiner and halts its fan-out: no
//! sibling sub-tree starts another call after that. Calls already issued are
//! detached and drain in the background with their results dropped.
//! Cancellation of the request surfaces as a single [`EngineError::Cancelled`].

use crate::context::{CallContext, Headers};
use crate::engine::aggregator::ClientMetadataSource;
use crate::engine::call::{backend_failure, guarded};
use crate::engine::policy::{policy_for, Flow};
use crate::errors::{EngineError, Operation};
use crate::graph::{PredictiveUnit, PredictorSpec, UnitMetadata};
use crate::observability::messages::engine::{
    CombinerFanOut, ExtraChildrenIgnored, RouteSelected, SiblingCallsDetached, UnitCallCompleted,
    UnitCallFailed, UnitCallStarted,
};
use crate::observability::{DiagnosticsSink, TracingSink};
use crate::payload::Payload;
use crate::traits::{MetadataSource, RoutingStrategy, UnitClient};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Semaphore, SemaphorePermit};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

type Dispatch = Pin<Box<dyn Future<Output = Result<Payload, EngineError>> + Send + 'static>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorOptions {
    /// Upper bound on concurrent backend calls within one request.
    pub max_concurrency: usize,
    /// Per-call timeout; the request deadline still applies when this is `None`.
    pub call_timeout: Option<Duration>,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            max_concurrency: crate::config::consts::DEFAULT_CONCURRENCY_FALLBACK,
            call_timeout: None,
        }
    }
}

/// State shared by every call made for one graph request.
///
/// `halt` stops new calls from starting in one fan-out sub-tree without
/// touching calls already in flight; `ctx` cancels everything.
struct RequestScope {
    ctx: CallContext,
    halt: CancellationToken,
    headers: Arc<Headers>,
    permits: Arc<Semaphore>,
}

impl RequestScope {
    /// Scope for one combiner's children: halted with its parent, same permits.
    fn fan_out(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            halt: self.halt.child_token(),
            headers: self.headers.clone(),
            permits: self.permits.clone(),
        }
    }

    fn halted(&self) -> bool {
        self.halt.is_cancelled()
    }
}

#[derive(Clone)]
pub struct GraphExecutor {
    client: Arc<dyn UnitClient>,
    router: Arc<dyn RoutingStrategy>,
    sink: Arc<dyn DiagnosticsSink>,
    options: ExecutorOptions,
}

impl GraphExecutor {
    pub fn new(
        client: Arc<dyn UnitClient>,
        router: Arc<dyn RoutingStrategy>,
        options: ExecutorOptions,
    ) -> Self {
        Self {
            client,
            router,
            sink: Arc::new(TracingSink),
            options: ExecutorOptions {
                max_concurrency: options.max_concurrency.max(1),
                ..options
            },
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn options(&self) -> ExecutorOptions {
        self.options
    }

    pub async fn predict(
        &self,
        spec: &PredictorSpec,
        payload: Payload,
        headers: Headers,
        ctx: &CallContext,
    ) -> Result<Payload, EngineError> {
        let scope = self.scope(headers, ctx);
        self.dispatch(spec.graph().clone(), payload, Operation::Predict, scope)
            .await
    }

    pub async fn feedback(
        &self,
        spec: &PredictorSpec,
        payload: Payload,
        headers: Headers,
        ctx: &CallContext,
    ) -> Result<Payload, EngineError> {
        let scope = self.scope(headers, ctx);
        self.dispatch(spec.graph().clone(), payload, Operation::Feedback, scope)
            .await
    }

    /// Metadata of one unit, fetched straight from its backend.
    pub async fn unit_metadata(
        &self,
        spec: &PredictorSpec,
        unit_name: &str,
        headers: Headers,
        ctx: &CallContext,
    ) -> Result<UnitMetadata, EngineError> {
        let unit = spec
            .find_unit(unit_name)
            .ok_or_else(|| EngineError::UnitNotFound {
                unit: unit_name.to_string(),
            })?;
        self.metadata_source(headers, ctx).fetch(unit).await
    }

    /// Metadata source backed by this executor's client and call timeout.
    pub fn metadata_source(&self, headers: Headers, ctx: &CallContext) -> ClientMetadataSource {
        ClientMetadataSource::new(
            self.client.clone(),
            ctx.clone(),
            headers,
            self.options.call_timeout,
        )
    }

    fn scope(&self, headers: Headers, ctx: &CallContext) -> Arc<RequestScope> {
        Arc::new(RequestScope {
            ctx: ctx.clone(),
            halt: CancellationToken::new(),
            headers: Arc::new(headers),
            permits: Arc::new(Semaphore::new(self.options.max_concurrency)),
        })
    }

    fn dispatch(
        &self,
        unit: Arc<PredictiveUnit>,
        payload: Payload,
        operation: Operation,
        scope: Arc<RequestScope>,
    ) -> Dispatch {
        let executor = self.clone();
        Box::pin(async move { executor.visit(unit, payload, operation, scope).await })
    }

    async fn visit(
        &self,
        unit: Arc<PredictiveUnit>,
        payload: Payload,
        operation: Operation,
        scope: Arc<RequestScope>,
    ) -> Result<Payload, EngineError> {
        if scope.halted() {
            return Err(EngineError::Cancelled);
        }

        let policy = policy_for(unit.unit_type).ok_or_else(|| EngineError::UnrecognizedNodeType {
            unit: unit.name.clone(),
            unit_type: unit.unit_type,
            operation,
        })?;

        let Some(first) = unit.first_child().cloned() else {
            return self.call_unit(&unit, operation, payload, &scope).await;
        };

        if policy.single_child && unit.children.len() > 1 {
            self.sink.emit(&ExtraChildrenIgnored {
                unit: &unit.name,
                unit_type: unit.unit_type.as_str(),
                ignored: unit.children.len() - 1,
            });
        }

        let chained = operation == Operation::Predict;

        match policy.flow {
            Flow::OwnThenFirstChild => {
                let own = self
                    .call_unit(&unit, operation, payload.clone(), &scope)
                    .await?;
                if chained {
                    self.dispatch(first, own, operation, scope).await
                } else {
                    self.dispatch(first, payload, operation, scope).await?;
                    Ok(own)
                }
            }
            Flow::FirstChildThenOwn => {
                let child = self
                    .dispatch(first, payload.clone(), operation, scope.clone())
                    .await?;
                let own_input = if chained { child } else { payload };
                self.call_unit(&unit, operation, own_input, &scope).await
            }
            Flow::FanOutThenOwn => {
                let results = self
                    .fan_out(&unit, payload.clone(), operation, scope.clone())
                    .await?;
                let own_input = if chained {
                    Payload::List(results)
                } else {
                    payload
                };
                self.call_unit(&unit, operation, own_input, &scope).await
            }
            Flow::Route => self.route(&unit, payload, operation, scope).await,
        }
    }

    async fn fan_out(
        &self,
        unit: &PredictiveUnit,
        payload: Payload,
        operation: Operation,
        scope: Arc<RequestScope>,
    ) -> Result<Vec<Payload>, EngineError> {
        self.sink.emit(&CombinerFanOut {
            unit: &unit.name,
            child_count: unit.children.len(),
            max_concurrency: self.options.max_concurrency,
        });

        let siblings = Arc::new(scope.fan_out());
        let mut tasks = JoinSet::new();
        for (index, child) in unit.children.iter().enumerate() {
            let call = self.dispatch(child.clone(), payload.clone(), operation, siblings.clone());
            tasks.spawn(async move { (index, call.await) });
        }

        let mut slots: Vec<Option<Payload>> = vec![None; unit.children.len()];
        while let Some(joined) = tasks.join_next().await {
            let failure = match joined {
                Ok((index, Ok(result))) => {
                    slots[index] = Some(result);
                    continue;
                }
                Ok((_, Err(error))) => error,
                Err(join_error) => EngineError::BackendCallFailure {
                    unit: unit.name.clone(),
                    operation,
                    message: format!("child task aborted: {}", join_error),
                },
            };

            siblings.halt.cancel();
            self.sink.emit(&SiblingCallsDetached {
                unit: &unit.name,
                pending: tasks.len(),
            });
            tasks.detach_all();

            if scope.ctx.is_cancelled() {
                return Err(EngineError::Cancelled);
            }
            return Err(failure);
        }

        slots
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| EngineError::BackendCallFailure {
                unit: unit.name.clone(),
                operation,
                message: "combiner lost a child result".to_string(),
            })
    }

    async fn route(
        &self,
        unit: &Arc<PredictiveUnit>,
        payload: Payload,
        operation: Operation,
        scope: Arc<RequestScope>,
    ) -> Result<Payload, EngineError> {
        let decision = match unit.endpoint {
            Some(_) => Some(
                self.call_unit(unit, operation, payload.clone(), &scope)
                    .await?,
            ),
            None => None,
        };

        let index = self
            .router
            .choose_child(unit, &payload, decision.as_ref())
            .map_err(|message| EngineError::RoutingFailure {
                unit: unit.name.clone(),
                message,
            })?;

        let child = unit
            .children
            .get(index)
            .cloned()
            .ok_or_else(|| EngineError::RoutingFailure {
                unit: unit.name.clone(),
                message: format!(
                    "selected child index {} but router has {} children",
                    index,
                    unit.children.len()
                ),
            })?;

        self.sink.emit(&RouteSelected {
            unit: &unit.name,
            strategy: self.router.name(),
            child: &child.name,
            child_index: index,
        });

        let routed = self.dispatch(child, payload, operation, scope).await?;
        match (operation, decision) {
            (Operation::Feedback, Some(own)) => Ok(own),
            _ => Ok(routed),
        }
    }

    async fn call_unit(
        &self,
        unit: &PredictiveUnit,
        operation: Operation,
        payload: Payload,
        scope: &RequestScope,
    ) -> Result<Payload, EngineError> {
        let endpoint = unit
            .endpoint
            .as_ref()
            .ok_or_else(|| EngineError::MissingEndpoint {
                unit: unit.name.clone(),
            })?;
        let operation_name = operation.to_string();

        let _permit = self.acquire(unit, operation, scope).await?;

        self.sink.emit(&UnitCallStarted {
            unit: &unit.name,
            unit_type: unit.unit_type.as_str(),
            operation: &operation_name,
            input_size: payload.byte_len(),
        });
        let started = Instant::now();

        let host = endpoint.service_host.as_str();
        let port = endpoint.service_port;
        let result = guarded(
            &scope.ctx,
            self.options.call_timeout,
            &unit.name,
            operation,
            async {
                let response = match operation {
                    Operation::Feedback => {
                        self.client
                            .feedback(&scope.ctx, &unit.name, host, port, payload, &scope.headers)
                            .await
                    }
                    _ => {
                        self.client
                            .predict(&scope.ctx, &unit.name, host, port, payload, &scope.headers)
                            .await
                    }
                };
                response.map_err(|e| backend_failure(&unit.name, operation, e))
            },
        )
        .await;

        match &result {
            Ok(response) => self.sink.emit(&UnitCallCompleted {
                unit: &unit.name,
                operation: &operation_name,
                output_size: response.byte_len(),
                duration: started.elapsed(),
            }),
            Err(error) => self.sink.emit(&UnitCallFailed {
                unit: &unit.name,
                operation: &operation_name,
                error,
            }),
        }

        result
    }

    /// Wait for a call permit under the request deadline.
    ///
    /// A halted fan-out gives up the wait, and wins over a permit that became
    /// free at the same moment.
    async fn acquire<'s>(
        &self,
        unit: &PredictiveUnit,
        operation: Operation,
        scope: &'s RequestScope,
    ) -> Result<SemaphorePermit<'s>, EngineError> {
        guarded(&scope.ctx, None, &unit.name, operation, async {
            tokio::select! {
                biased;
                _ = scope.halt.cancelled() => Err(EngineError::Cancelled),
                permit = scope.permits.acquire() => permit.map_err(|e| {
                    EngineError::BackendCallFailure {
                        unit: unit.name.clone(),
                        operation,
                        message: format!("failed to acquire call permit: {}", e),
                    }
                }),
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::{FailingClient, RecordingClient};
    use crate::engine::routing::FixedRoute;
    use crate::graph::{Endpoint, UnitType};
    use serde_json::json;

    fn unit(name: &str, unit_type: UnitType) -> PredictiveUnit {
        PredictiveUnit::new(name, unit_type, Some(Endpoint::new("localhost", 9000)))
    }

    fn executor(client: Arc<dyn UnitClient>) -> GraphExecutor {
        GraphExecutor::new(client, Arc::new(FixedRoute(0)), ExecutorOptions::default())
    }

    #[tokio::test]
    async fn test_single_model_returns_own_response() {
        let client = Arc::new(RecordingClient::new());
        let spec = PredictorSpec::new("p", unit("model", UnitType::Model)).unwrap();

        let result = executor(client.clone())
            .predict(&spec, Payload::Json(json!("in")), Headers::new(), &CallContext::new())
            .await
            .unwrap();

        assert_eq!(result, Payload::Json(json!("model(in)")));
        assert_eq!(client.calls(), vec!["predict:model".to_string()]);
    }

    #[tokio::test]
    async fn test_output_transformer_runs_child_first() {
        let client = Arc::new(RecordingClient::new());
        let graph = unit("post", UnitType::OutputTransformer)
            .with_child(unit("model", UnitType::Model));
        let spec = PredictorSpec::new("p", graph).unwrap();

        let result = executor(client.clone())
            .predict(&spec, Payload::Json(json!("in")), Headers::new(), &CallContext::new())
            .await
            .unwrap();

        assert_eq!(result, Payload::Json(json!("post(model(in))")));
        assert_eq!(
            client.calls(),
            vec!["predict:model".to_string(), "predict:post".to_string()]
        );
    }

    #[tokio::test]
    async fn test_feedback_does_not_chain_payloads() {
        let client = Arc::new(RecordingClient::new());
        let graph = unit("model-1", UnitType::Model).with_child(unit("model-2", UnitType::Model));
        let spec = PredictorSpec::new("p", graph).unwrap();

        let result = executor(client.clone())
            .feedback(&spec, Payload::Json(json!("fb")), Headers::new(), &CallContext::new())
            .await
            .unwrap();

        assert_eq!(result, Payload::Json(json!("model-1(fb)")));
        assert_eq!(
            client.inputs_for("model-2"),
            vec![Payload::Json(json!("fb"))]
        );
    }

    #[tokio::test]
    async fn test_unknown_type_is_an_error_not_a_pass_through() {
        let client = Arc::new(RecordingClient::new());
        let graph = unit("mystery", UnitType::Unknown).with_child(unit("model", UnitType::Model));
        let spec = PredictorSpec::new("p", graph).unwrap();

        let err = executor(client.clone())
            .predict(&spec, Payload::Json(json!("in")), Headers::new(), &CallContext::new())
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::UnrecognizedNodeType { .. }));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_backend_failure_names_unit() {
        let spec = PredictorSpec::new("p", unit("model", UnitType::Model)).unwrap();

        let err = executor(Arc::new(FailingClient::new("model")))
            .predict(&spec, Payload::Bytes(vec![1]), Headers::new(), &CallContext::new())
            .await
            .unwrap_err();

        match err {
            EngineError::BackendCallFailure { unit, operation, .. } => {
                assert_eq!(unit, "model");
                assert_eq!(operation, Operation::Predict);
            }
            other => panic!("expected backend failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_out_of_range_route_is_a_routing_failure() {
        let client = Arc::new(RecordingClient::new());
        let graph = PredictiveUnit::new("router", UnitType::Router, None)
            .with_child(unit("a", UnitType::Model));
        let spec = PredictorSpec::new("p", graph).unwrap();
        let executor =
            GraphExecutor::new(client.clone(), Arc::new(FixedRoute(3)), ExecutorOptions::default());

        let err = executor
            .predict(&spec, Payload::Json(json!("in")), Headers::new(), &CallContext::new())
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::RoutingFailure { .. }));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unit_metadata_for_missing_unit() {
        let client = Arc::new(RecordingClient::new());
        let spec = PredictorSpec::new("p", unit("model", UnitType::Model)).unwrap();

        let err = executor(client)
            .unit_metadata(&spec, "ghost", Headers::new(), &CallContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::UnitNotFound { unit } if unit == "ghost"));
    }

    #[test]
    fn test_zero_concurrency_is_clamped() {
        let executor = GraphExecutor::new(
            Arc::new(RecordingClient::new()),
            Arc::new(FixedRoute(0)),
            ExecutorOptions {
                max_concurrency: 0,
                call_timeout: None,
            },
        );
        assert_eq!(executor.options().max_concurrency, 1);
    }
}
