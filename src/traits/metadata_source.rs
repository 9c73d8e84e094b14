// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::errors::EngineError;
use crate::graph::{PredictiveUnit, UnitMetadata};

/// Where the metadata aggregator gets each unit's declared signature.
///
/// The production source asks the unit's backend through a [`UnitClient`];
/// tests can serve metadata from a map.
///
/// [`UnitClient`]: crate::traits::UnitClient
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn fetch(&self, unit: &PredictiveUnit) -> Result<UnitMetadata, EngineError>;
}
