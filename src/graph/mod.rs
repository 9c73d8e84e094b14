// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-memory model of a predictive-unit graph and of its tensor contract.
//!
//! A graph is a rooted tree of [`PredictiveUnit`]s. Children are held behind
//! `Arc` so concurrent requests, and the tasks spawned for combiner fan-out,
//! can share sub-trees without copying them. Nothing in this module mutates a
//! tree after construction.

mod contract;
mod spec;
mod unit;

pub use contract::{GraphMetadata, Signature, TensorDescriptor, UnitMetadata};
pub use spec::PredictorSpec;
pub use unit::{Endpoint, EndpointType, PredictiveUnit, UnitType};
