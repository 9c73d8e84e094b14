// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Graph-level metadata aggregation.
//!
//! Aggregation runs in two phases. First every unit's own metadata is fetched
//! in pre-order; any fetch failure aborts with no partial result. Then the
//! effective signature of the root is derived bottom-up from the fetched map,
//! checking tensor boundaries between parents and children on the way.
//!
//! # Shape Validation
//!
//! Parent/child boundaries on chains are always checked. Combiners and routers
//! can additionally have their siblings cross-checked:
//!
//! * [`ShapeValidation::Strict`] - every combiner child must accept the same
//!   inputs as the first one, and the combiner must accept the concatenation
//!   of its children's outputs. Every router child must share the first
//!   child's inputs and outputs.
//! * [`ShapeValidation::Lenient`] - the first child is trusted for the whole
//!   node, and a non-leaf of unknown type yields an unknown signature instead
//!   of an error.

use crate::context::{CallContext, Headers};
use crate::engine::call::{backend_failure, guarded};
use crate::engine::policy::{policy_for, ShapeRule};
use crate::engine::shape::{compatible, describe};
use crate::errors::{EngineError, Operation};
use crate::graph::{
    GraphMetadata, PredictiveUnit, PredictorSpec, Signature, TensorDescriptor, UnitMetadata,
    UnitType,
};
use crate::observability::messages::engine::ExtraChildrenIgnored;
use crate::observability::messages::metadata::{
    AggregationCompleted, AggregationStarted, LeafOfUnexpectedType, ShapeMismatch,
    UnitMetadataFetched, UnknownNodeShape,
};
use crate::observability::{DiagnosticsSink, TracingSink};
use crate::traits::{MetadataSource, UnitClient};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// How strictly combiner and router children are cross-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeValidation {
    #[default]
    Strict,
    Lenient,
}

pub struct MetadataAggregator {
    validation: ShapeValidation,
    sink: Arc<dyn DiagnosticsSink>,
}

impl MetadataAggregator {
    pub fn new(validation: ShapeValidation) -> Self {
        Self {
            validation,
            sink: Arc::new(TracingSink),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Fetch every unit's metadata and derive the predictor's graph contract.
    pub async fn graph_metadata(
        &self,
        spec: &PredictorSpec,
        source: &dyn MetadataSource,
    ) -> Result<GraphMetadata, EngineError> {
        self.sink.emit(&AggregationStarted {
            predictor: spec.name(),
            unit_count: spec.unit_count(),
            strict: self.validation == ShapeValidation::Strict,
        });

        let models = self.fetch_all(spec.graph(), source).await?;
        let signature = self.shape_of(spec.graph(), &models)?;

        self.sink.emit(&AggregationCompleted {
            predictor: spec.name(),
            model_count: models.len(),
            inputs_known: signature.inputs.is_some(),
            outputs_known: signature.outputs.is_some(),
        });

        Ok(GraphMetadata {
            name: spec.name().to_string(),
            models,
            graph_inputs: signature.inputs,
            graph_outputs: signature.outputs,
        })
    }

    async fn fetch_all(
        &self,
        root: &PredictiveUnit,
        source: &dyn MetadataSource,
    ) -> Result<BTreeMap<String, UnitMetadata>, EngineError> {
        let mut models = BTreeMap::new();

        for unit in root.walk() {
            if models.contains_key(&unit.name) {
                continue;
            }
            let metadata = source.fetch(unit).await?;
            self.sink.emit(&UnitMetadataFetched {
                unit: &unit.name,
                platform: &metadata.platform,
                input_count: metadata.inputs.as_ref().map(Vec::len),
                output_count: metadata.outputs.as_ref().map(Vec::len),
            });
            models.insert(unit.name.clone(), metadata);
        }

        Ok(models)
    }

    /// Effective signature of the sub-graph rooted at `unit`.
    pub fn shape_of(
        &self,
        unit: &PredictiveUnit,
        models: &BTreeMap<String, UnitMetadata>,
    ) -> Result<Signature, EngineError> {
        let own = models
            .get(&unit.name)
            .map(UnitMetadata::signature)
            .unwrap_or_default();

        let Some(first) = unit.first_child() else {
            if unit.unit_type != UnitType::Model {
                self.sink.emit(&LeafOfUnexpectedType {
                    unit: &unit.name,
                    unit_type: unit.unit_type.as_str(),
                });
            }
            return Ok(own);
        };

        let Some(policy) = policy_for(unit.unit_type) else {
            return match self.validation {
                ShapeValidation::Strict => Err(EngineError::UnrecognizedNodeType {
                    unit: unit.name.clone(),
                    unit_type: unit.unit_type,
                    operation: Operation::Metadata,
                }),
                ShapeValidation::Lenient => {
                    self.sink.emit(&UnknownNodeShape {
                        unit: &unit.name,
                        unit_type: unit.unit_type.as_str(),
                    });
                    Ok(Signature::unknown())
                }
            };
        };

        if policy.single_child && unit.children.len() > 1 {
            self.sink.emit(&ExtraChildrenIgnored {
                unit: &unit.name,
                unit_type: unit.unit_type.as_str(),
                ignored: unit.children.len() - 1,
            });
        }

        let first_shape = self.shape_of(first, models)?;

        match policy.shape {
            ShapeRule::Chain => {
                self.require(
                    unit,
                    own.outputs.as_deref(),
                    first_shape.inputs.as_deref(),
                    || format!("outputs of '{}' vs inputs of '{}'", unit.name, first.name),
                )?;
                Ok(Signature {
                    inputs: own.inputs,
                    outputs: first_shape.outputs,
                })
            }
            ShapeRule::Wrap => {
                self.require(
                    unit,
                    first_shape.outputs.as_deref(),
                    own.inputs.as_deref(),
                    || format!("outputs of '{}' vs inputs of '{}'", first.name, unit.name),
                )?;
                Ok(Signature {
                    inputs: first_shape.inputs,
                    outputs: own.outputs,
                })
            }
            ShapeRule::Combine => {
                let mut child_outputs: Option<Vec<TensorDescriptor>> =
                    first_shape.outputs.clone();
                for child in unit.children.iter().skip(1) {
                    let child_shape = self.shape_of(child, models)?;
                    if self.validation == ShapeValidation::Strict {
                        self.require(
                            unit,
                            first_shape.inputs.as_deref(),
                            child_shape.inputs.as_deref(),
                            || format!("inputs of '{}' vs inputs of '{}'", first.name, child.name),
                        )?;
                    }
                    child_outputs = match (child_outputs, child_shape.outputs) {
                        (Some(mut acc), Some(more)) => {
                            acc.extend(more);
                            Some(acc)
                        }
                        _ => None,
                    };
                }
                if self.validation == ShapeValidation::Strict {
                    self.require(
                        unit,
                        child_outputs.as_deref(),
                        own.inputs.as_deref(),
                        || format!("combined outputs of children vs inputs of '{}'", unit.name),
                    )?;
                }
                Ok(Signature {
                    inputs: first_shape.inputs,
                    outputs: own.outputs,
                })
            }
            ShapeRule::Route => {
                for child in unit.children.iter().skip(1) {
                    let child_shape = self.shape_of(child, models)?;
                    if self.validation == ShapeValidation::Strict {
                        self.require(
                            unit,
                            first_shape.inputs.as_deref(),
                            child_shape.inputs.as_deref(),
                            || format!("inputs of '{}' vs inputs of '{}'", first.name, child.name),
                        )?;
                        self.require(
                            unit,
                            first_shape.outputs.as_deref(),
                            child_shape.outputs.as_deref(),
                            || {
                                format!(
                                    "outputs of '{}' vs outputs of '{}'",
                                    first.name, child.name
                                )
                            },
                        )?;
                    }
                }
                Ok(first_shape)
            }
        }
    }

    fn require(
        &self,
        unit: &PredictiveUnit,
        produced: Option<&[TensorDescriptor]>,
        expected: Option<&[TensorDescriptor]>,
        boundary: impl FnOnce() -> String,
    ) -> Result<(), EngineError> {
        if compatible(produced, expected) {
            return Ok(());
        }

        let boundary = format!(
            "{} ({} vs {})",
            boundary(),
            describe(produced),
            describe(expected)
        );
        self.sink.emit(&ShapeMismatch {
            unit: &unit.name,
            boundary: &boundary,
            fatal: true,
        });
        Err(EngineError::ShapeIncompatibility {
            unit: unit.name.clone(),
            boundary,
        })
    }
}

impl Default for MetadataAggregator {
    fn default() -> Self {
        Self::new(ShapeValidation::default())
    }
}

/// Metadata source that asks each unit's backend through a [`UnitClient`].
///
/// A router with no endpoint has no metadata of its own and gets an empty
/// record; its signature comes from its children.
pub struct ClientMetadataSource {
    client: Arc<dyn UnitClient>,
    ctx: CallContext,
    headers: Headers,
    call_timeout: Option<Duration>,
}

impl ClientMetadataSource {
    pub fn new(
        client: Arc<dyn UnitClient>,
        ctx: CallContext,
        headers: Headers,
        call_timeout: Option<Duration>,
    ) -> Self {
        Self {
            client,
            ctx,
            headers,
            call_timeout,
        }
    }
}

#[async_trait]
impl MetadataSource for ClientMetadataSource {
    async fn fetch(&self, unit: &PredictiveUnit) -> Result<UnitMetadata, EngineError> {
        let Some(endpoint) = unit.endpoint.as_ref() else {
            if unit.unit_type.requires_endpoint() {
                return Err(EngineError::MissingEndpoint {
                    unit: unit.name.clone(),
                });
            }
            return Ok(UnitMetadata {
                name: unit.name.clone(),
                ..UnitMetadata::default()
            });
        };

        let operation = Operation::Metadata;
        let response = guarded(&self.ctx, self.call_timeout, &unit.name, operation, async {
            self.client
                .metadata(
                    &self.ctx,
                    &unit.name,
                    &endpoint.service_host,
                    endpoint.service_port,
                    None,
                    &self.headers,
                )
                .await
                .map_err(|e| backend_failure(&unit.name, operation, e))
        })
        .await?;

        response
            .decode_json::<UnitMetadata>()
            .map_err(|e| EngineError::MetadataDecode {
                unit: unit.name.clone(),
                message: e.to_string(),
            })
    }
}
