// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Graph traversal, metadata aggregation and the orchestrator facade.

pub mod aggregator;
pub mod cache;
pub mod call;
pub mod executor;
pub mod orchestrator;
pub mod policy;
pub mod routing;
pub mod shape;

pub use aggregator::{ClientMetadataSource, MetadataAggregator, ShapeValidation};
pub use cache::GraphMetadataCache;
pub use executor::{ExecutorOptions, GraphExecutor};
pub use orchestrator::Orchestrator;
pub use routing::{BackendDecisionRoute, FixedRoute};
