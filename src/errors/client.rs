// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::PayloadError;
use thiserror::Error;

/// Failure reported by a unit client implementation.
///
/// The engine wraps these into `EngineError::BackendCallFailure` together
/// with the unit name and operation.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The backend could not be reached.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("backend returned status {code}: {message}")]
    Status { code: i32, message: String },

    /// The client does not speak the requested protocol or operation.
    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error(transparent)]
    Payload(#[from] PayloadError),
}
