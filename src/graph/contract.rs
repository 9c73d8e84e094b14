// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One input or output slot of a unit: a name, a datatype and a fixed shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TensorDescriptor {
    pub name: String,
    pub datatype: String,
    pub shape: Vec<i64>,
}

impl TensorDescriptor {
    pub fn new(name: impl Into<String>, datatype: impl Into<String>, shape: Vec<i64>) -> Self {
        Self {
            name: name.into(),
            datatype: datatype.into(),
            shape,
        }
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }
}

/// Metadata a single unit reports about itself.
///
/// `inputs`/`outputs` are `None` when the backend didn't declare them, which
/// is not the same as declaring an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnitMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub versions: Vec<String>,
    #[serde(default)]
    pub inputs: Option<Vec<TensorDescriptor>>,
    #[serde(default)]
    pub outputs: Option<Vec<TensorDescriptor>>,
}

impl UnitMetadata {
    pub fn signature(&self) -> Signature {
        Signature {
            inputs: self.inputs.clone(),
            outputs: self.outputs.clone(),
        }
    }
}

/// Effective input/output contract of a node or sub-graph.
///
/// `None` on either side means "shape unknown".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Signature {
    pub inputs: Option<Vec<TensorDescriptor>>,
    pub outputs: Option<Vec<TensorDescriptor>>,
}

impl Signature {
    pub fn unknown() -> Self {
        Self::default()
    }
}

/// The externally visible contract of a whole predictor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphMetadata {
    pub name: String,
    pub models: BTreeMap<String, UnitMetadata>,
    #[serde(rename = "graphinputs")]
    pub graph_inputs: Option<Vec<TensorDescriptor>>,
    #[serde(rename = "graphoutputs")]
    pub graph_outputs: Option<Vec<TensorDescriptor>>,
}
