// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::Config;
use crate::engine::aggregator::MetadataAggregator;
use crate::engine::executor::GraphExecutor;
use crate::engine::orchestrator::Orchestrator;
use crate::engine::routing::{BackendDecisionRoute, FixedRoute};
use crate::errors::ConfigError;
use crate::graph::{PredictorSpec, UnitType};
use crate::traits::{RoutingStrategy, UnitClient};
use std::sync::Arc;

/// Wires a loaded configuration and a unit client into a ready orchestrator.
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Build the orchestrator, refusing graphs the client and routing setup
    /// could never serve.
    pub fn from_config(
        cfg: &Config,
        client: Arc<dyn UnitClient>,
    ) -> Result<Orchestrator, ConfigError> {
        let spec = cfg.predictor_spec()?;
        check_endpoints(&spec, client.as_ref())?;

        let router: Arc<dyn RoutingStrategy> = match cfg.engine.fixed_route {
            Some(index) => Arc::new(FixedRoute(index)),
            None => {
                check_routers_can_decide(&spec)?;
                Arc::new(BackendDecisionRoute)
            }
        };

        let executor = GraphExecutor::new(client, router, cfg.engine.executor_options());
        let aggregator = MetadataAggregator::new(cfg.engine.shape_validation);
        Ok(Orchestrator::new(spec, executor, aggregator))
    }
}

fn check_endpoints(spec: &PredictorSpec, client: &dyn UnitClient) -> Result<(), ConfigError> {
    for unit in spec.graph().walk() {
        if let Some(endpoint) = &unit.endpoint {
            if !client.supports(endpoint.kind) {
                return Err(ConfigError::UnsupportedEndpoint {
                    unit: unit.name.clone(),
                    endpoint_type: endpoint.kind,
                    client: client.name(),
                });
            }
        }
    }
    Ok(())
}

// Backend-decided routing needs the router's own response.
fn check_routers_can_decide(spec: &PredictorSpec) -> Result<(), ConfigError> {
    match spec
        .graph()
        .walk()
        .into_iter()
        .find(|unit| unit.unit_type == UnitType::Router && unit.endpoint.is_none())
    {
        Some(router) => Err(ConfigError::UndecidableRouter {
            unit: router.name.clone(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::grpc::GrpcUnitClient;
    use crate::backends::stub::RecordingClient;
    use crate::context::{CallContext, Headers};
    use crate::graph::EndpointType;
    use crate::payload::Payload;
    use serde_json::json;

    const ROUTER_WITHOUT_ENDPOINT: &str = r#"
predictor:
  name: routed
  graph: router
  units:
    - name: router
      type: ROUTER
      children: [model-a, model-b]
    - name: model-a
      type: MODEL
      endpoint: { service_host: localhost, service_port: 9001 }
    - name: model-b
      type: MODEL
      endpoint: { service_host: localhost, service_port: 9002 }
"#;

    #[test]
    fn test_router_without_endpoint_needs_fixed_route() {
        let cfg = Config::from_yaml_str(ROUTER_WITHOUT_ENDPOINT).unwrap();

        let result = RuntimeBuilder::from_config(&cfg, Arc::new(RecordingClient::new()));
        match result {
            Err(ConfigError::UndecidableRouter { unit }) => assert_eq!(unit, "router"),
            Err(other) => panic!("expected undecidable router, got {:?}", other),
            Ok(_) => panic!("router without endpoint should not build"),
        }
    }

    #[tokio::test]
    async fn test_router_without_endpoint_uses_fixed_route() {
        let yaml =
            ROUTER_WITHOUT_ENDPOINT.replace("predictor:", "engine:\n  fixed_route: 1\npredictor:");
        let cfg = Config::from_yaml_str(&yaml).unwrap();
        let client = Arc::new(RecordingClient::new());

        let orchestrator = RuntimeBuilder::from_config(&cfg, client.clone()).unwrap();
        let result = orchestrator
            .predict(Payload::Json(json!("in")), Headers::new(), &CallContext::new())
            .await
            .unwrap();

        assert_eq!(result, Payload::Json(json!("model-b(in)")));
        assert_eq!(client.calls(), vec!["predict:model-b"]);
    }

    #[test]
    fn test_rest_endpoint_rejected_by_grpc_client() {
        let yaml = r#"
predictor:
  name: single
  graph: model
  units:
    - name: model
      type: MODEL
      endpoint: { service_host: localhost, service_port: 9000, type: REST }
"#;
        let cfg = Config::from_yaml_str(yaml).unwrap();

        let result = RuntimeBuilder::from_config(&cfg, Arc::new(GrpcUnitClient::new()));
        match result {
            Err(ConfigError::UnsupportedEndpoint {
                unit,
                endpoint_type,
                client,
            }) => {
                assert_eq!(unit, "model");
                assert_eq!(endpoint_type, EndpointType::Rest);
                assert_eq!(client, "grpc");
            }
            Err(other) => panic!("expected unsupported endpoint, got {:?}", other),
            Ok(_) => panic!("REST endpoint should not build with the gRPC client"),
        }
    }
}
