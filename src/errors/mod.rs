// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod client;
mod config;
mod execution;
mod payload;

pub use client::ClientError;
pub use config::{ConfigError, GraphValidationError};
pub use execution::{EngineError, Operation};
pub use payload::PayloadError;
