//! Connection validator - pure predicates over a proposed edge
//!
//! Must be consulted before an edge is committed; the engine never
//! retroactively repairs an edge set that bypassed validation (the
//! scheduler still refuses to order a cyclic set).

use super::error::ConnectionRejection;
use super::graph::Edge;
use std::collections::HashSet;

/// Decide whether the directed edge `source -> target` may join
/// `edges`. Rejects self-loops and edges that would close a cycle.
///
/// Operates on the edge list alone: edges naming ids absent from any
/// node set still participate in reachability.
pub fn validate_connection(
    source: &str,
    target: &str,
    edges: &[Edge],
) -> Result<(), ConnectionRejection> {
    if source == target {
        return Err(ConnectionRejection::SelfLoop);
    }

    // Adding source -> target closes a cycle exactly when source is
    // already reachable from target.
    if reachable(target, source, edges) {
        return Err(ConnectionRejection::WouldCycle);
    }

    Ok(())
}

/// Boolean convenience over [`validate_connection`].
pub fn is_valid_connection(source: &str, target: &str, edges: &[Edge]) -> bool {
    validate_connection(source, target, edges).is_ok()
}

/// Depth-first reachability of `to` from `from` over the edge list.
fn reachable(from: &str, to: &str, edges: &[Edge]) -> bool {
    let mut stack = vec![from];
    let mut visited: HashSet<&str> = HashSet::new();

    while let Some(current) = stack.pop() {
        if current == to {
            return true;
        }
        if !visited.insert(current) {
            continue;
        }
        for edge in edges.iter().filter(|e| e.source == current) {
            stack.push(edge.target.as_str());
        }
    }

    false
}
