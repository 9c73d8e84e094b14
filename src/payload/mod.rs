// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Encoding-agnostic envelope around request and response bodies.
//!
//! The engine never inspects a payload beyond moving it between calls; unit
//! clients and routing strategies are the only places that look inside.
//! A [`Payload::List`] is what a combiner's own backend receives: the
//! ordered results of its children.

use crate::errors::PayloadError;
use crate::proto::{PredictionMessage, PredictionMessageList};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use prost::Message;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

/// Key under which binary list elements are embedded when a list is rendered as JSON.
pub const BIN_DATA_KEY: &str = "binData";

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Raw bytes, forwarded untouched.
    Bytes(Vec<u8>),
    /// Structured JSON body.
    Json(Value),
    /// Protocol-buffer message as spoken by gRPC backends.
    Proto(PredictionMessage),
    /// Ordered child results collected by a combiner.
    List(Vec<Payload>),
}

impl Payload {
    pub fn from_json<T: Serialize>(value: &T) -> Result<Self, PayloadError> {
        Ok(Payload::Json(serde_json::to_value(value)?))
    }

    /// Human-readable encoding name used in errors and logs.
    pub fn encoding(&self) -> &'static str {
        match self {
            Payload::Bytes(_) => "bytes",
            Payload::Json(_) => "json",
            Payload::Proto(_) => "proto",
            Payload::List(_) => "list",
        }
    }

    /// Serialize the payload to bytes.
    ///
    /// Lists become a JSON array; binary elements are embedded as base64
    /// under [`BIN_DATA_KEY`].
    pub fn bytes(&self) -> Result<Vec<u8>, PayloadError> {
        match self {
            Payload::Bytes(bytes) => Ok(bytes.clone()),
            Payload::Json(value) => Ok(serde_json::to_vec(value)?),
            Payload::Proto(message) => Ok(message.encode_to_vec()),
            Payload::List(_) => Ok(serde_json::to_vec(&self.to_json_value()?)?),
        }
    }

    /// Size of the serialized body, for diagnostics.
    pub fn byte_len(&self) -> usize {
        match self {
            Payload::Bytes(bytes) => bytes.len(),
            Payload::Proto(message) => message.encoded_len(),
            _ => self.bytes().map(|b| b.len()).unwrap_or(0),
        }
    }

    /// Decode the payload body as JSON into `T`.
    pub fn decode_json<T: DeserializeOwned>(&self) -> Result<T, PayloadError> {
        match self {
            Payload::Json(value) => Ok(serde_json::from_value(value.clone())?),
            Payload::Proto(message) if !message.json_data.is_empty() => {
                Ok(serde_json::from_str(&message.json_data)?)
            }
            _ => Ok(serde_json::from_slice(&self.bytes()?)?),
        }
    }

    /// Render as a JSON value; non-JSON bodies are wrapped as base64 bytes.
    pub fn to_json_value(&self) -> Result<Value, PayloadError> {
        match self {
            Payload::Json(value) => Ok(value.clone()),
            Payload::List(items) => items
                .iter()
                .map(Payload::to_json_value)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Payload::Bytes(_) | Payload::Proto(_) => {
                Ok(json!({ BIN_DATA_KEY: BASE64.encode(self.bytes()?) }))
            }
        }
    }

    /// Convert to the single-message wire form used by gRPC backends.
    pub fn to_prediction_message(&self) -> Result<PredictionMessage, PayloadError> {
        match self {
            Payload::Proto(message) => Ok(message.clone()),
            Payload::Bytes(bytes) => Ok(PredictionMessage {
                bin_data: bytes.clone(),
                ..Default::default()
            }),
            Payload::Json(value) => Ok(PredictionMessage {
                json_data: serde_json::to_string(value)?,
                ..Default::default()
            }),
            Payload::List(_) => Err(PayloadError::UnexpectedEncoding {
                expected: "single message",
                found: "list",
            }),
        }
    }

    /// Convert a combiner input to the list wire form.
    pub fn to_prediction_list(&self) -> Result<PredictionMessageList, PayloadError> {
        match self {
            Payload::List(items) => Ok(PredictionMessageList {
                messages: items
                    .iter()
                    .map(Payload::to_prediction_message)
                    .collect::<Result<Vec<_>, _>>()?,
            }),
            other => Err(PayloadError::UnexpectedEncoding {
                expected: "list",
                found: other.encoding(),
            }),
        }
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Bytes(bytes)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Json(value)
    }
}

impl From<PredictionMessage> for Payload {
    fn from(message: PredictionMessage) -> Self {
        Payload::Proto(message)
    }
}
