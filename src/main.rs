// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use serde_json::json;
use the_boxwood::backends::local::ToolRegistry;
use the_boxwood::composer::MainWorkflow;
use the_boxwood::config::{load_and_validate_config, PipelineConfig};
use the_boxwood::engine::{CrashReport, EngineFactory};
use the_boxwood::pipelines::{assemble, WorkflowRegistry};
use tracing_subscriber::EnvFilter;

const RUN_FLAG: &str = "--run";
const PROGRAM_NAME: &str = "the-boxwood";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = env::args();
    let program = program_name(&mut args);
    let args: Vec<String> = args.collect();
    let run = args.iter().any(|a| a == RUN_FLAG);
    let config_files: Vec<&String> = args.iter().filter(|a| *a != RUN_FLAG).collect();

    if config_files.len() != 1 {
        eprintln!("Usage: {} <config.yaml|config.toml> [{}]", program, RUN_FLAG);
        eprintln!("Example: {} configs/anat.yaml", program);
        eprintln!("Example: {} configs/anat.yaml {}", program, RUN_FLAG);
        bail!("expected exactly one configuration file");
    }

    let config_file = config_files[0];
    let cfg = load_and_validate_config(config_file)
        .with_context(|| format!("loading {}", config_file))?;

    let started = Instant::now();
    let main = assemble(&cfg, &WorkflowRegistry::bundled(), Arc::new(ToolRegistry::new()))?;
    println!("{}", serde_json::to_string_pretty(&summary(&main))?);
    println!("Assembled in {:?}", started.elapsed());

    if run {
        execute(&cfg, main).await?;
    }
    Ok(())
}

/// Name to print in usage lines; argv may be empty.
fn program_name(args: &mut impl Iterator<Item = String>) -> String {
    args.next().unwrap_or_else(|| PROGRAM_NAME.to_string())
}

/// What was built: graph size, composed boxes, attachments and rename rules.
fn summary(main: &MainWorkflow) -> serde_json::Value {
    let graph = main.graph();
    json!({
        "workflow": main.name(),
        "nodes": graph.node_count(),
        "connections": graph.connections().len(),
        "boxes": graph.boxes(),
        "attachments": main.attachments(),
        "sink": {
            "base_directory": main.sink().base_directory(),
            "container": main.sink().container(),
            "rules": main.sink().substitutions().rules().collect::<Vec<_>>(),
        },
    })
}

/// Run the assembled graph, then copy what reached the data sink to its renamed destinations.
async fn execute(cfg: &PipelineConfig, main: MainWorkflow) -> Result<()> {
    let datasink = main.datasink().clone();
    let (graph, sink) = main.into_parts();
    let engine = EngineFactory::from_config(cfg);

    let started = Instant::now();
    let outputs = match engine.execute(&graph).await {
        Ok(outputs) => outputs,
        Err(e) => {
            let report = CrashReport::new(&graph, &e);
            let written = report.write(&cfg.crashdump_dir(graph.name())).await;
            return match written {
                Ok(path) => Err(anyhow::Error::new(e).context(format!("crash report written to {}", path.display()))),
                Err(write_error) => Err(anyhow::Error::new(e)
                    .context(format!("crash report could not be written: {}", write_error))),
            };
        }
    };

    let manifest = match outputs.get(&datasink) {
        Some(received) => sink.resolve(received),
        None => Vec::new(),
    };
    sink.persist(&manifest).await?;

    println!("{}", serde_json::to_string_pretty(&manifest)?);
    println!("Executed {} nodes in {:?}", outputs.len(), started.elapsed());
    Ok(())
}
