//! Execution driver - walks the scheduled order one node at a time
//!
//! Strictly sequential: the performer await is the only suspension
//! point, and step N+1 never starts before step N's call resolves.
//! A step failure is converted into a system log entry and an early
//! stop; it never leaves the driver as an error.

use super::error::PipelineError;
use super::graph::{Edge, Node, NodeStatus};
use super::scheduler;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;

/// One line of the run log. `node_id` is empty for system-level
/// entries (the failure notice is the only one the driver emits).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub node_id: String,
    pub node_name: String,
    pub message: String,
}

impl LogEntry {
    fn for_node(node: &Node, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            node_id: node.id.clone(),
            node_name: node.name.clone(),
            message: message.into(),
        }
    }

    fn system(message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            node_id: String::new(),
            node_name: "System".to_string(),
            message: message.into(),
        }
    }

    pub fn is_system(&self) -> bool {
        self.node_id.is_empty()
    }
}

/// Run execution event. Each variant carries the full current snapshot
/// of the state it touches, so a consumer can treat every event as
/// authoritative without diffing.
#[derive(Debug, Clone)]
pub enum RunEvent {
    RunStarted {
        statuses: HashMap<String, NodeStatus>,
    },
    StatusChanged {
        node_id: String,
        status: NodeStatus,
        statuses: HashMap<String, NodeStatus>,
    },
    LogAppended {
        entry: LogEntry,
        logs: Vec<LogEntry>,
    },
    RunFinished {
        report: RunReport,
    },
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunOutcome {
    Completed,
    Failed { node_id: String },
}

/// Final snapshot of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub statuses: HashMap<String, NodeStatus>,
    pub logs: Vec<LogEntry>,
    pub outcome: RunOutcome,
}

/// Pluggable unit that produces a node's execution result message.
/// The only suspension point in the engine.
pub trait StepPerformer {
    fn perform(&self, node: &Node) -> impl Future<Output = Result<String>> + Send;
}

/// Reference performer: a deterministic message per known kind tag and
/// a generic fallback, behind a simulated latency standing in for real
/// work.
#[derive(Debug, Clone)]
pub struct SimulatedPerformer {
    delay: Duration,
}

impl SimulatedPerformer {
    pub fn new() -> Self {
        Self::with_delay(Duration::from_secs(1))
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedPerformer {
    fn default() -> Self {
        Self::new()
    }
}

impl StepPerformer for SimulatedPerformer {
    fn perform(&self, node: &Node) -> impl Future<Output = Result<String>> + Send {
        let delay = self.delay;
        let message = match node.kind.as_str() {
            "Data Source" => "processed 100 records".to_string(),
            "Transformer" => "applied transformation".to_string(),
            "Model" => "generated predictions".to_string(),
            "Sink" => "saved results".to_string(),
            _ => format!("Node \"{}\" executed", node.name),
        };
        async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            Ok(message)
        }
    }
}

/// Execution driver. Owns the run-in-progress state for the duration
/// of one run; between runs the engine holds nothing.
pub struct Runner<P: StepPerformer> {
    performer: P,
    event_tx: mpsc::UnboundedSender<RunEvent>,
    active: bool,
}

impl<P: StepPerformer> Runner<P> {
    /// Create a runner and the receiving end of its event stream.
    /// Dropping the receiver is fine; events are then discarded.
    pub fn new(performer: P) -> (Self, mpsc::UnboundedReceiver<RunEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                performer,
                event_tx: tx,
                active: false,
            },
            rx,
        )
    }

    /// Whether a run is currently in progress. Callers should refuse
    /// structural edits while this is true.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Schedule `nodes` under `edges` and run the whole order.
    pub async fn run(
        &mut self,
        nodes: &[Node],
        edges: &[Edge],
    ) -> Result<RunReport, PipelineError> {
        if nodes.is_empty() {
            return Err(PipelineError::EmptyPipeline);
        }
        let order = scheduler::execution_order(nodes, edges)?;
        Ok(self.run_order(&order, nodes).await)
    }

    /// Walk a precomputed order over the live node set.
    ///
    /// Ids in `order` that are absent from `nodes` (removed since the
    /// order was derived) are skipped silently. The walk stops at the
    /// first step failure; later nodes are never started.
    pub async fn run_order(&mut self, order: &[String], nodes: &[Node]) -> RunReport {
        self.active = true;

        let node_map: HashMap<&str, &Node> =
            nodes.iter().map(|n| (n.id.as_str(), n)).collect();
        let mut statuses: HashMap<String, NodeStatus> = nodes
            .iter()
            .map(|n| (n.id.clone(), NodeStatus::Idle))
            .collect();
        let mut logs: Vec<LogEntry> = Vec::new();
        let mut outcome = RunOutcome::Completed;

        let _ = self.event_tx.send(RunEvent::RunStarted {
            statuses: statuses.clone(),
        });
        log::info!("Run started: {} node(s) scheduled", order.len());

        for node_id in order {
            let Some(&node) = node_map.get(node_id.as_str()) else {
                log::debug!("Node {} no longer present, skipping", node_id);
                continue;
            };

            // Observable before the step completes.
            self.set_status(&mut statuses, node_id, NodeStatus::Running);

            match self.performer.perform(node).await {
                Ok(message) => {
                    self.append_log(&mut logs, LogEntry::for_node(node, message));
                    self.set_status(&mut statuses, node_id, NodeStatus::Completed);
                }
                Err(e) => {
                    log::warn!("Node {} failed: {}", node_id, e);
                    self.set_status(&mut statuses, node_id, NodeStatus::Error);
                    self.append_log(
                        &mut logs,
                        LogEntry::system(format!(
                            "Execution failed at node \"{}\": {}",
                            node.name, e
                        )),
                    );
                    outcome = RunOutcome::Failed {
                        node_id: node_id.clone(),
                    };
                    break;
                }
            }
        }

        self.active = false;
        let report = RunReport {
            statuses,
            logs,
            outcome,
        };
        let _ = self.event_tx.send(RunEvent::RunFinished {
            report: report.clone(),
        });
        report
    }

    fn set_status(
        &self,
        statuses: &mut HashMap<String, NodeStatus>,
        node_id: &str,
        status: NodeStatus,
    ) {
        statuses.insert(node_id.to_string(), status);
        let _ = self.event_tx.send(RunEvent::StatusChanged {
            node_id: node_id.to_string(),
            status,
            statuses: statuses.clone(),
        });
    }

    fn append_log(&self, logs: &mut Vec<LogEntry>, entry: LogEntry) {
        logs.push(entry.clone());
        let _ = self.event_tx.send(RunEvent::LogAppended {
            entry,
            logs: logs.clone(),
        });
    }
}
