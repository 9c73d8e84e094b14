// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{bail, Context, Result};
use predictive_graph::backends::grpc::GrpcUnitClient;
use predictive_graph::config::{load_and_validate_config, RuntimeBuilder};
use predictive_graph::context::{CallContext, Headers};
use predictive_graph::payload::Payload;
use std::env;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

fn usage(program: &str) -> String {
    format!(
        "Usage: {program} <config.yaml|config.toml> metadata\n\
         \x20      {program} <config> predict '<json>'\n\
         \x20      {program} <config> feedback '<json>'"
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("predictive-graph");
    if args.len() < 3 {
        eprintln!("{}", usage(program));
        std::process::exit(1);
    }

    let config_path = &args[1];
    let command = args[2].as_str();

    let cfg = load_and_validate_config(config_path)
        .with_context(|| format!("loading {}", config_path))?;
    let orchestrator = RuntimeBuilder::from_config(&cfg, Arc::new(GrpcUnitClient::new()))
        .context("building runtime")?;

    let cancel = CancellationToken::new();
    let ctx = CallContext::new().with_cancellation(cancel.clone());
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let output = match command {
        "metadata" => {
            let metadata = orchestrator.metadata(Headers::new(), &ctx).await?;
            serde_json::to_string_pretty(metadata.as_ref())?
        }
        "predict" | "feedback" => {
            let Some(body) = args.get(3) else {
                bail!("{} needs a JSON payload\n{}", command, usage(program));
            };
            let payload = Payload::Json(
                serde_json::from_str(body).with_context(|| format!("parsing payload {}", body))?,
            );
            let response = if command == "predict" {
                orchestrator.predict(payload, Headers::new(), &ctx).await?
            } else {
                orchestrator.feedback(payload, Headers::new(), &ctx).await?
            };
            let rendered = response
                .decode_json::<serde_json::Value>()
                .or_else(|_| response.to_json_value())?;
            serde_json::to_string_pretty(&rendered)?
        }
        other => bail!("unknown command '{}'\n{}", other, usage(program)),
    };

    println!("{}", output);
    Ok(())
}
