//! Core engine - graph model, connection validation, scheduling, execution

mod error;
mod graph;
mod runner;
mod scheduler;
mod validator;

pub use error::{ConnectionRejection, PipelineError};
pub use graph::{Edge, Node, NodeStatus, Pipeline, Position};
pub use runner::{
    LogEntry, RunEvent, RunOutcome, RunReport, Runner, SimulatedPerformer, StepPerformer,
};
pub use scheduler::execution_order;
pub use validator::{is_valid_connection, validate_connection};
