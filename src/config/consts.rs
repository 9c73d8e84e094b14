// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Concurrent backend calls per request when the machine's parallelism is unknown
pub const DEFAULT_CONCURRENCY_FALLBACK: usize = 4;
/// Per-call timeout applied when the configuration doesn't set one (30 seconds)
pub const DEFAULT_CALL_TIMEOUT_MS: u64 = 30_000;
