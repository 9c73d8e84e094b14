// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while extracting bytes from, or decoding, a payload.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PayloadError {
    /// JSON encoding or decoding failed.
    #[error("JSON payload error: {0}")]
    Json(#[from] serde_json::Error),

    /// Protocol-buffer decoding failed.
    #[error("protobuf payload error: {0}")]
    Proto(#[from] prost::DecodeError),

    /// The payload holds a different encoding than the caller asked for.
    #[error("expected a {expected} payload, found {found}")]
    UnexpectedEncoding {
        expected: &'static str,
        found: &'static str,
    },
}
