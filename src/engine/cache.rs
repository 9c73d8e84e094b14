// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Read-mostly holder for a predictor's aggregated graph metadata.
//!
//! Readers either see nothing or a complete [`GraphMetadata`]; a value is only
//! published once aggregation has fully succeeded.

use crate::errors::EngineError;
use crate::graph::GraphMetadata;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct GraphMetadataCache {
    slot: RwLock<Slot>,
}

#[derive(Debug, Default)]
struct Slot {
    value: Option<Arc<GraphMetadata>>,
    // Bumped by every invalidation; a build started before one is stale.
    generation: u64,
}

impl GraphMetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self) -> Option<Arc<GraphMetadata>> {
        self.slot.read().await.value.clone()
    }

    /// Replace the cached value, returning the shared handle.
    pub async fn publish(&self, metadata: GraphMetadata) -> Arc<GraphMetadata> {
        let metadata = Arc::new(metadata);
        self.slot.write().await.value = Some(metadata.clone());
        metadata
    }

    pub async fn invalidate(&self) {
        let mut slot = self.slot.write().await;
        slot.value = None;
        slot.generation = slot.generation.wrapping_add(1);
    }

    /// Return the cached value or build, publish and return a new one.
    ///
    /// A failed build leaves the cache untouched, and so does a build that an
    /// [`invalidate`](Self::invalidate) overtook; its caller still gets the
    /// result. Concurrent callers racing on an empty cache may each build; the
    /// last one to finish is kept.
    pub async fn get_or_build<F, Fut>(&self, build: F) -> Result<Arc<GraphMetadata>, EngineError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<GraphMetadata, EngineError>>,
    {
        let generation = {
            let slot = self.slot.read().await;
            if let Some(cached) = &slot.value {
                return Ok(cached.clone());
            }
            slot.generation
        };

        let built = Arc::new(build().await?);

        let mut slot = self.slot.write().await;
        if slot.generation == generation {
            slot.value = Some(built.clone());
        }
        Ok(built)
    }
}
