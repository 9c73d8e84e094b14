// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Unit client implementations.
//!
//! # Available Backends
//!
//! ## gRPC Backend
//! Talks to predictive-unit servers over `tonic`:
//! - **Predict**: single messages to `Predict`, combiner lists to `Aggregate`
//! - **Feedback**: `SendFeedback`
//! - **Metadata**: `Metadata`, converted to the shared metadata model
//!
//! Only `GRPC` endpoints are supported; the runtime builder refuses graphs
//! with `REST` endpoints when this client is used.
//! Transport tuning (TLS, pooling, retries) is left to `tonic` defaults.
//!
//! ## Stub Backend (Test-Only)
//! In-memory clients for engine tests (only available in test builds):
//! - **RecordingClient**: echoes `unit(input)` and records calls, delays and completion order
//! - **FailingClient**: fails every call to one unit
//! - **MapMetadataSource**: serves fixed metadata records
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use predictive_graph::backends::grpc::GrpcUnitClient;
//! use predictive_graph::traits::UnitClient;
//!
//! let client: Arc<dyn UnitClient> = Arc::new(GrpcUnitClient::new());
//! assert_eq!(client.name(), "grpc");
//! ```

pub mod grpc;
#[cfg(test)]
pub mod stub;
