// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // unit clients
pub mod config;     // graph config, validation, runtime wiring
pub mod context;    // call context + forwarded headers
pub mod engine;     // traversal, aggregation, orchestrator
pub mod errors;     // error handling
pub mod graph;      // unit tree + tensor contract
pub mod observability;
pub mod payload;    // encoding-agnostic bodies
pub mod proto;      // wire messages for gRPC backends
pub mod traits;     // unit client, routing, metadata source
