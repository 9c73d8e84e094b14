// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{DEFAULT_CALL_TIMEOUT_MS, DEFAULT_CONCURRENCY_FALLBACK};
use crate::engine::aggregator::ShapeValidation;
use crate::engine::executor::ExecutorOptions;
use crate::errors::ConfigError;
use crate::graph::{Endpoint, PredictorSpec, UnitType};
use crate::observability::messages::validation::{
    GraphProblem, ValidationCompleted, ValidationFailed, ValidationStarted,
};
use crate::observability::messages::StructuredLog;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineOptions,
    pub predictor: PredictorConfig,
}

impl Config {
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Validate the unit list and assemble the predictor's tree.
    pub fn predictor_spec(&self) -> Result<PredictorSpec, ConfigError> {
        crate::config::builder::build_predictor(&self.predictor)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineOptions {
    pub max_concurrency: Option<usize>,
    pub call_timeout_ms: Option<u64>,
    #[serde(default)]
    pub shape_validation: ShapeValidation,
    /// Send every routed request to this child index instead of asking the
    /// router's backend.
    pub fixed_route: Option<usize>,
}

impl EngineOptions {
    /// Configured limit, else the machine's available parallelism.
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(DEFAULT_CONCURRENCY_FALLBACK)
        })
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms.unwrap_or(DEFAULT_CALL_TIMEOUT_MS))
    }

    pub fn executor_options(&self) -> ExecutorOptions {
        ExecutorOptions {
            max_concurrency: self.max_concurrency(),
            call_timeout: Some(self.call_timeout()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictorConfig {
    pub name: String,
    /// Name of the root unit.
    pub graph: String,
    pub units: Vec<UnitConfig>,
}

/// One unit as declared in configuration; children are referenced by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub unit_type: UnitType,
    #[serde(default)]
    pub endpoint: Option<Endpoint>,
    #[serde(default)]
    pub children: Vec<String>,
}

/// Read a config file. `.toml` files are parsed as TOML, anything else as YAML.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => Config::from_toml_str(&content),
        _ => Config::from_yaml_str(&content),
    }
}

pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let cfg = load_config(path)?;
    let predictor = &cfg.predictor;

    ValidationStarted {
        predictor: &predictor.name,
        unit_count: predictor.units.len(),
    }
    .log();

    if let Err(errors) = crate::config::validate_graph(predictor) {
        for error in &errors {
            GraphProblem { error }.log();
        }
        ValidationFailed {
            predictor: &predictor.name,
            error_count: errors.len(),
        }
        .log();
        return Err(ConfigError::Invalid(errors));
    }

    ValidationCompleted {
        predictor: &predictor.name,
        unit_count: predictor.units.len(),
    }
    .log();

    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EndpointType;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const COMBINER_YAML: &str = r#"
engine:
  max_concurrency: 2
  call_timeout_ms: 1500
  shape_validation: lenient
predictor:
  name: ensemble
  graph: combiner
  units:
    - name: combiner
      type: COMBINER
      endpoint: { service_host: localhost, service_port: 9000 }
      children: [model-a, model-b]
    - name: model-a
      type: MODEL
      endpoint: { service_host: model-a, service_port: 9001, type: REST }
    - name: model-b
      type: MODEL
      endpoint: { service_host: model-b, service_port: 9002, type: GRPC }
"#;

    fn write_temp(content: &str, suffix: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parse_basic_config() {
        let cfg = Config::from_yaml_str(COMBINER_YAML).unwrap();

        assert_eq!(cfg.predictor.name, "ensemble");
        assert_eq!(cfg.predictor.units.len(), 3);
        assert_eq!(cfg.predictor.units[0].children, vec!["model-a", "model-b"]);
        assert_eq!(cfg.engine.shape_validation, ShapeValidation::Lenient);
        assert_eq!(
            cfg.predictor.units[1].endpoint.as_ref().map(|e| e.kind),
            Some(EndpointType::Rest)
        );
    }

    #[test]
    fn test_engine_options_default_when_absent() {
        let yaml = r#"
predictor:
  name: single
  graph: model
  units:
    - name: model
      type: MODEL
      endpoint: { service_host: localhost, service_port: 9000 }
"#;
        let cfg = Config::from_yaml_str(yaml).unwrap();

        assert_eq!(cfg.engine, EngineOptions::default());
        assert_eq!(cfg.engine.shape_validation, ShapeValidation::Strict);
        assert_eq!(
            cfg.engine.call_timeout(),
            Duration::from_millis(DEFAULT_CALL_TIMEOUT_MS)
        );
        assert!(cfg.engine.max_concurrency() >= 1);
    }

    #[test]
    fn test_executor_options_follow_config() {
        let cfg = Config::from_yaml_str(COMBINER_YAML).unwrap();
        let options = cfg.engine.executor_options();

        assert_eq!(options.max_concurrency, 2);
        assert_eq!(options.call_timeout, Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_load_yaml_file() {
        let file = write_temp(COMBINER_YAML, ".yaml");
        let cfg = load_and_validate_config(file.path()).unwrap();
        assert_eq!(cfg.predictor.graph, "combiner");
    }

    #[test]
    fn test_load_toml_file() {
        let toml = r#"
[engine]
max_concurrency = 3

[predictor]
name = "chain"
graph = "model-1"

[[predictor.units]]
name = "model-1"
type = "MODEL"
children = ["model-2"]
endpoint = { service_host = "localhost", service_port = 9000 }

[[predictor.units]]
name = "model-2"
type = "MODEL"
endpoint = { service_host = "localhost", service_port = 9001 }
"#;
        let file = write_temp(toml, ".toml");
        let cfg = load_and_validate_config(file.path()).unwrap();

        assert_eq!(cfg.engine.max_concurrency(), 3);
        assert_eq!(cfg.predictor.units[0].children, vec!["model-2"]);
    }

    #[test]
    fn test_load_and_validate_cyclic_config() {
        let yaml = r#"
predictor:
  name: loop
  graph: a
  units:
    - name: a
      type: MODEL
      endpoint: { service_host: localhost, service_port: 9000 }
      children: [b]
    - name: b
      type: MODEL
      endpoint: { service_host: localhost, service_port: 9001 }
      children: [a]
"#;
        let file = write_temp(yaml, ".yaml");
        let error_msg = load_and_validate_config(file.path())
            .unwrap_err()
            .to_string();

        assert!(error_msg.contains("Configuration validation failed"));
        assert!(error_msg.contains("Cycle detected"));
    }

    #[test]
    fn test_load_and_validate_unresolved_child() {
        let yaml = r#"
predictor:
  name: broken
  graph: model
  units:
    - name: model
      type: MODEL
      endpoint: { service_host: localhost, service_port: 9000 }
      children: [nonexistent]
"#;
        let file = write_temp(yaml, ".yml");
        let error_msg = load_and_validate_config(file.path())
            .unwrap_err()
            .to_string();

        assert!(error_msg.contains("lists child 'nonexistent' which does not exist"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_config("/definitely/not/here.yaml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
