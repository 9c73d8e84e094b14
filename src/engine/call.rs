// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Cancellation, deadline and timeout handling around a single backend call.

use crate::context::CallContext;
use crate::errors::{ClientError, EngineError, Operation};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Run `call` under the request's cancellation token, its deadline and the
/// per-call timeout, whichever fires first.
///
/// Cancellation wins over a timeout that fires at the same moment.
pub async fn guarded<T, F>(
    ctx: &CallContext,
    call_timeout: Option<Duration>,
    unit: &str,
    operation: Operation,
    call: F,
) -> Result<T, EngineError>
where
    F: Future<Output = Result<T, EngineError>>,
{
    if ctx.is_cancelled() {
        return Err(EngineError::Cancelled);
    }

    let limit = earliest(ctx.deadline(), call_timeout.map(|t| Instant::now() + t));
    let bounded = async {
        match limit {
            Some(at) => tokio::time::timeout_at(at, call)
                .await
                .unwrap_or_else(|_| {
                    Err(EngineError::Timeout {
                        unit: unit.to_string(),
                        operation,
                    })
                }),
            None => call.await,
        }
    };

    tokio::select! {
        biased;
        _ = ctx.cancellation().cancelled() => Err(EngineError::Cancelled),
        result = bounded => result,
    }
}

/// Wrap a client error with the unit and operation it came from.
pub fn backend_failure(unit: &str, operation: Operation, error: ClientError) -> EngineError {
    EngineError::BackendCallFailure {
        unit: unit.to_string(),
        operation,
        message: error.to_string(),
    }
}

fn earliest(a: Option<Instant>, b: Option<Instant>) -> Option<Instant> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completes_within_limits() {
        let ctx = CallContext::new();
        let result = guarded(&ctx, Some(Duration::from_secs(1)), "m", Operation::Predict, async {
            Ok::<_, EngineError>(7)
        })
        .await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_per_call_timeout_names_unit() {
        let ctx = CallContext::new();
        let result = guarded(
            &ctx,
            Some(Duration::from_millis(10)),
            "slow",
            Operation::Predict,
            async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, EngineError>(())
            },
        )
        .await;

        match result {
            Err(EngineError::Timeout { unit, operation }) => {
                assert_eq!(unit, "slow");
                assert_eq!(operation, Operation::Predict);
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_request_deadline_applies_without_call_timeout() {
        let ctx = CallContext::new().with_timeout(Duration::from_millis(10));
        let result = guarded(&ctx, None, "slow", Operation::Feedback, async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, EngineError>(())
        })
        .await;
        assert!(matches!(result, Err(EngineError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_already_cancelled_never_polls_call() {
        let ctx = CallContext::new();
        ctx.cancellation().cancel();

        let polled = std::sync::atomic::AtomicBool::new(false);
        let result = guarded(&ctx, None, "m", Operation::Predict, async {
            polled.store(true, std::sync::atomic::Ordering::SeqCst);
            Ok::<_, EngineError>(())
        })
        .await;
        assert!(!polled.load(std::sync::atomic::Ordering::SeqCst));
        assert!(matches!(result, Err(EngineError::Cancelled)));
    }

    #[tokio::test]
    async fn test_cancellation_interrupts_in_flight_call() {
        let ctx = CallContext::new();
        let token = ctx.cancellation().clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            token.cancel();
        });

        let result = guarded(&ctx, None, "m", Operation::Predict, async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, EngineError>(())
        })
        .await;
        assert!(matches!(result, Err(EngineError::Cancelled)));
    }
}
