// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::graph::PredictiveUnit;
use crate::payload::Payload;

/// Picks which child of a ROUTER unit receives a request.
///
/// `decision` is the router backend's own response when the router has an
/// endpoint, `None` otherwise. The returned index is bounds-checked by the
/// executor; an out-of-range index is a routing failure.
pub trait RoutingStrategy: Send + Sync {
    fn choose_child(
        &self,
        router: &PredictiveUnit,
        request: &Payload,
        decision: Option<&Payload>,
    ) -> Result<usize, String>;

    fn name(&self) -> &'static str;
}
