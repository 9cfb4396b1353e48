//! Pipeflow - pipeline graph engine
//!
//! Assemble a directed graph of typed processing nodes, validate
//! connections (no self-loops, no cycles), derive a deterministic
//! execution order and run the nodes one at a time while streaming
//! status and log updates.

pub mod catalog;
pub mod core;

// Re-exports
pub use crate::core::{
    Edge, LogEntry, Node, NodeStatus, Pipeline, PipelineError, RunEvent, RunOutcome,
    RunReport, Runner, SimulatedPerformer, StepPerformer,
};

/// Result type alias
pub type Result<T> = anyhow::Result<T>;
