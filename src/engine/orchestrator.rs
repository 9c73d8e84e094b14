// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Entry points a front-end calls for one predictor.
//!
//! The orchestrator makes sure every request carries a correlation id before
//! any downstream call, logs the request lifecycle and caches the aggregated
//! graph metadata.

use crate::context::{ensure_correlation_id, CallContext, Headers};
use crate::engine::aggregator::MetadataAggregator;
use crate::engine::cache::GraphMetadataCache;
use crate::engine::executor::GraphExecutor;
use crate::errors::{EngineError, Operation};
use crate::graph::{GraphMetadata, PredictorSpec, UnitMetadata};
use crate::observability::messages::engine::{
    GraphRequestCompleted, GraphRequestFailed, GraphRequestStarted,
};
use crate::observability::messages::StructuredLog;
use crate::payload::Payload;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

pub struct Orchestrator {
    spec: PredictorSpec,
    executor: GraphExecutor,
    aggregator: MetadataAggregator,
    cache: GraphMetadataCache,
}

impl Orchestrator {
    pub fn new(
        spec: PredictorSpec,
        executor: GraphExecutor,
        aggregator: MetadataAggregator,
    ) -> Self {
        Self {
            spec,
            executor,
            aggregator,
            cache: GraphMetadataCache::new(),
        }
    }

    pub async fn predict(
        &self,
        payload: Payload,
        mut headers: Headers,
        ctx: &CallContext,
    ) -> Result<Payload, EngineError> {
        let correlation_id = ensure_correlation_id(&mut headers);
        self.observe(Operation::Predict, &correlation_id, async {
            self.executor.predict(&self.spec, payload, headers, ctx).await
        })
        .await
    }

    pub async fn feedback(
        &self,
        payload: Payload,
        mut headers: Headers,
        ctx: &CallContext,
    ) -> Result<Payload, EngineError> {
        let correlation_id = ensure_correlation_id(&mut headers);
        self.observe(Operation::Feedback, &correlation_id, async {
            self.executor.feedback(&self.spec, payload, headers, ctx).await
        })
        .await
    }

    /// Aggregated graph metadata, built on first use and cached afterwards.
    pub async fn metadata(
        &self,
        mut headers: Headers,
        ctx: &CallContext,
    ) -> Result<Arc<GraphMetadata>, EngineError> {
        let correlation_id = ensure_correlation_id(&mut headers);
        self.observe(Operation::Metadata, &correlation_id, async {
            self.cache
                .get_or_build(|| async {
                    let source = self.executor.metadata_source(headers, ctx);
                    self.aggregator.graph_metadata(&self.spec, &source).await
                })
                .await
        })
        .await
    }

    /// Drop the cached graph metadata so the next call re-aggregates.
    pub async fn refresh_metadata(&self) {
        self.cache.invalidate().await;
    }

    pub async fn unit_metadata(
        &self,
        unit_name: &str,
        mut headers: Headers,
        ctx: &CallContext,
    ) -> Result<UnitMetadata, EngineError> {
        let correlation_id = ensure_correlation_id(&mut headers);
        self.observe(Operation::Metadata, &correlation_id, async {
            self.executor
                .unit_metadata(&self.spec, unit_name, headers, ctx)
                .await
        })
        .await
    }

    async fn observe<T, F>(
        &self,
        operation: Operation,
        correlation_id: &str,
        work: F,
    ) -> Result<T, EngineError>
    where
        F: Future<Output = Result<T, EngineError>>,
    {
        let operation_name = operation.to_string();
        let started_msg = GraphRequestStarted {
            predictor: self.spec.name(),
            operation: &operation_name,
            correlation_id,
            unit_count: self.spec.unit_count(),
        };
        started_msg.log();
        let span = started_msg.span("orchestrator");
        let started = Instant::now();

        let result = work.instrument(span).await;

        match &result {
            Ok(_) => GraphRequestCompleted {
                predictor: self.spec.name(),
                operation: &operation_name,
                correlation_id,
                duration: started.elapsed(),
            }
            .log(),
            Err(error) => GraphRequestFailed {
                predictor: self.spec.name(),
                operation: &operation_name,
                correlation_id,
                error,
            }
            .log(),
        }

        result
    }
}
