// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-request call context and forwarded headers.

use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Header carrying the request correlation id through every downstream call.
pub const CORRELATION_ID_HEADER: &str = "x-request-id";

/// Caller metadata forwarded to every unit call; a key may carry several values.
pub type Headers = BTreeMap<String, Vec<String>>;

/// Return the correlation id if the caller sent one.
pub fn correlation_id(headers: &Headers) -> Option<&str> {
    headers
        .get(CORRELATION_ID_HEADER)
        .and_then(|values| values.first())
        .map(String::as_str)
}

/// Make sure `headers` carries a correlation id, generating one if needed.
///
/// An existing id is never replaced.
pub fn ensure_correlation_id(headers: &mut Headers) -> String {
    if let Some(existing) = correlation_id(headers) {
        return existing.to_string();
    }
    let id = uuid::Uuid::new_v4().to_string();
    headers.insert(CORRELATION_ID_HEADER.to_string(), vec![id.clone()]);
    id
}

/// Cancellation and deadline shared by every call made for one request.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancellation: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_existing_correlation_id_is_kept() {
        let mut headers = Headers::new();
        headers.insert(CORRELATION_ID_HEADER.to_string(), vec!["req-42".to_string()]);

        assert_eq!(ensure_correlation_id(&mut headers), "req-42");
        assert_eq!(headers[CORRELATION_ID_HEADER], vec!["req-42".to_string()]);
    }

    #[test]
    fn test_missing_correlation_id_is_generated_once() {
        let mut headers = Headers::new();
        let first = ensure_correlation_id(&mut headers);
        let second = ensure_correlation_id(&mut headers);

        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_supplied_token_cancels_context() {
        let token = CancellationToken::new();
        let ctx = CallContext::new().with_cancellation(token.clone());

        assert!(!ctx.is_cancelled());
        token.cancel();
        assert!(ctx.is_cancelled());
    }
}
