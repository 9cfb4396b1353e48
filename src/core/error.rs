//! Typed engine errors

use thiserror::Error;

/// Why a proposed connection was refused.
///
/// Never fatal: the caller simply discards the proposed edge and may
/// surface the reason however its presentation layer sees fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConnectionRejection {
    #[error("a node cannot connect to itself")]
    SelfLoop,
    #[error("the connection would create a cycle")]
    WouldCycle,
}

/// Errors raised by the engine's public operations.
///
/// Implemented by hand (not via `#[derive(Error)]`) because thiserror
/// treats any field named `source` as the error source, and ours is a
/// plain node-id `String`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// A proposed edge failed validation and was not committed.
    InvalidConnection {
        source: String,
        target: String,
        rejection: ConnectionRejection,
    },

    /// No total execution order covers every node. No partial order is
    /// returned; the run attempt is rejected as a whole.
    CyclicOrDisconnected,

    /// A run was requested on a pipeline with zero nodes.
    EmptyPipeline,
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidConnection {
                source,
                target,
                rejection,
            } => write!(f, "invalid connection {source} -> {target}: {rejection}"),
            Self::CyclicOrDisconnected => write!(
                f,
                "pipeline contains a cycle: no execution order covers every node"
            ),
            Self::EmptyPipeline => write!(f, "pipeline has no nodes to run"),
        }
    }
}

impl std::error::Error for PipelineError {}
