// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Where engine diagnostics go.
//!
//! The aggregator and executor never call `tracing` directly for their
//! warnings. They hand messages to a [`DiagnosticsSink`] so callers can route
//! them elsewhere or capture them in tests.

use crate::observability::messages::StructuredLog;

pub trait DiagnosticsSink: Send + Sync {
    fn emit(&self, message: &dyn StructuredLog);
}

/// Default sink: every message is logged at its own level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn emit(&self, message: &dyn StructuredLog) {
        message.log();
    }
}

/// Sink that remembers the rendered text of every message.
#[derive(Debug, Default)]
pub struct RecordingSink {
    lines: std::sync::Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }
}

impl DiagnosticsSink for RecordingSink {
    fn emit(&self, message: &dyn StructuredLog) {
        let line = message.to_string();
        match self.lines.lock() {
            Ok(mut lines) => lines.push(line),
            Err(poisoned) => poisoned.into_inner().push(line),
        }
    }
}
