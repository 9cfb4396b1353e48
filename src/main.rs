//! Pipeflow CLI entry point

use anyhow::Result;
use clap::{Parser, Subcommand};
use pipeflow::core::{
    validate_connection, Pipeline, RunEvent, RunOutcome, Runner, SimulatedPerformer,
};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "pipeflow", version, about = "Pipeline graph engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Re-validate every committed edge and check the graph schedules
    Check { file: PathBuf },
    /// Print the derived execution order
    Order { file: PathBuf },
    /// Run the pipeline with the simulated step performer
    Run {
        file: PathBuf,
        /// Simulated per-step latency in milliseconds
        #[arg(long, default_value_t = 1000)]
        delay_ms: u64,
        /// Dump the final run report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Check { file } => check(&file),
        Command::Order { file } => order(&file),
        Command::Run {
            file,
            delay_ms,
            json,
        } => run(&file, delay_ms, json).await,
    }
}

fn check(file: &PathBuf) -> Result<()> {
    let pipeline = Pipeline::from_file(file)?;

    // Each edge must still be valid against the rest of the set.
    for (i, edge) in pipeline.edges.iter().enumerate() {
        let others: Vec<_> = pipeline
            .edges
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, e)| e.clone())
            .collect();
        if let Err(rejection) = validate_connection(&edge.source, &edge.target, &others) {
            anyhow::bail!(
                "edge {} ({} -> {}) is invalid: {}",
                edge.id,
                edge.source,
                edge.target,
                rejection
            );
        }
    }

    let order = pipeline.execution_order()?;
    println!(
        "OK: {} node(s), {} edge(s), schedulable in {} step(s)",
        pipeline.nodes.len(),
        pipeline.edges.len(),
        order.len()
    );
    Ok(())
}

fn order(file: &PathBuf) -> Result<()> {
    let pipeline = Pipeline::from_file(file)?;
    for node_id in pipeline.execution_order()? {
        match pipeline.node(&node_id) {
            Some(node) => println!("{} ({})", node_id, node.name),
            None => println!("{}", node_id),
        }
    }
    Ok(())
}

async fn run(file: &PathBuf, delay_ms: u64, json: bool) -> Result<()> {
    let pipeline = Pipeline::from_file(file)?;
    log::info!(
        "Loaded {} node(s), {} edge(s) from {}",
        pipeline.nodes.len(),
        pipeline.edges.len(),
        file.display()
    );

    let performer = SimulatedPerformer::with_delay(Duration::from_millis(delay_ms));
    let (mut runner, mut rx) = Runner::new(performer);

    // Stream log lines as they are appended.
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                RunEvent::LogAppended { entry, .. } => {
                    println!(
                        "[{}] {}: {}",
                        entry.timestamp.format("%H:%M:%S"),
                        entry.node_name,
                        entry.message
                    );
                }
                RunEvent::StatusChanged {
                    node_id, status, ..
                } => {
                    log::debug!("{} -> {}", node_id, status);
                }
                _ => {}
            }
        }
    });

    let report = runner.run(&pipeline.nodes, &pipeline.edges).await?;
    drop(runner);
    printer.await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    match report.outcome {
        RunOutcome::Completed => {
            println!("Run completed: {} node(s) executed", report.logs.len());
            Ok(())
        }
        RunOutcome::Failed { node_id } => {
            anyhow::bail!("run failed at node {}", node_id)
        }
    }
}
