// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Graph configuration: file loading, validation and tree construction.
//!
//! A predictor is declared as a flat list of units that reference their
//! children by name. Loading parses YAML (or TOML for `.toml` files),
//! validation checks the list forms a proper rooted tree, and the builder
//! turns it into an `Arc`-shared [`PredictorSpec`](crate::graph::PredictorSpec).
//!
//! # Example
//!
//! ```rust
//! use predictive_graph::config::Config;
//!
//! let yaml = r#"
//! predictor:
//!   name: chain
//!   graph: model-1
//!   units:
//!     - name: model-1
//!       type: MODEL
//!       endpoint: { service_host: localhost, service_port: 9000 }
//!       children: [model-2]
//!     - name: model-2
//!       type: MODEL
//!       endpoint: { service_host: localhost, service_port: 9001 }
//! "#;
//!
//! let spec = Config::from_yaml_str(yaml)?.predictor_spec()?;
//! assert_eq!(spec.unit_count(), 2);
//! # Ok::<(), predictive_graph::errors::ConfigError>(())
//! ```

mod builder;
mod loader;
mod runtime;
mod validation;

pub mod consts;

pub use builder::build_predictor;
pub use loader::{
    load_and_validate_config, load_config, Config, EngineOptions, PredictorConfig, UnitConfig,
};
pub use runtime::RuntimeBuilder;
pub use validation::validate_graph;
