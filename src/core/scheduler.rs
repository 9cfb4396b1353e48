//! Execution-order scheduler - Kahn's algorithm over the pipeline DAG
//!
//! Ties among simultaneously-ready nodes are broken by the input order
//! of `nodes`. That is a documented contract, not an accident: callers
//! relying on the order of independent branches must control the order
//! they supply nodes in.

use super::error::PipelineError;
use super::graph::{Edge, Node};
use std::collections::{HashMap, HashSet, VecDeque};

/// Derive a total execution order for `nodes` under `edges`.
///
/// Edges with an endpoint missing from `nodes` are ignored. Fails with
/// [`PipelineError::CyclicOrDisconnected`] when a cycle prevents a
/// total order; no partial order is returned.
pub fn execution_order(nodes: &[Node], edges: &[Edge]) -> Result<Vec<String>, PipelineError> {
    let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();

    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut in_degree: HashMap<&str, usize> =
        nodes.iter().map(|n| (n.id.as_str(), 0)).collect();

    for edge in edges {
        if !ids.contains(edge.source.as_str()) || !ids.contains(edge.target.as_str()) {
            log::debug!(
                "Ignoring edge {} with missing endpoint ({} -> {})",
                edge.id,
                edge.source,
                edge.target
            );
            continue;
        }
        adjacency
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
        if let Some(d) = in_degree.get_mut(edge.target.as_str()) {
            *d += 1;
        }
    }

    // Seed with every zero-in-degree node, in input order.
    let mut queue: VecDeque<&str> = nodes
        .iter()
        .map(|n| n.id.as_str())
        .filter(|id| in_degree.get(id) == Some(&0))
        .collect();

    let mut order: Vec<String> = Vec::with_capacity(nodes.len());
    while let Some(current) = queue.pop_front() {
        order.push(current.to_string());
        if let Some(targets) = adjacency.get(current) {
            for &target in targets {
                if let Some(d) = in_degree.get_mut(target) {
                    *d -= 1;
                    if *d == 0 {
                        queue.push_back(target);
                    }
                }
            }
        }
    }

    // Anything left over sits on or behind a cycle.
    if order.len() < nodes.len() {
        return Err(PipelineError::CyclicOrDisconnected);
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes(ids: &[&str]) -> Vec<Node> {
        ids.iter()
            .map(|id| Node::new(*id, "Transformer", format!("Node {}", id)))
            .collect()
    }

    fn edges(pairs: &[(&str, &str)]) -> Vec<Edge> {
        pairs
            .iter()
            .enumerate()
            .map(|(i, (s, t))| Edge::new(format!("e{}", i), *s, *t))
            .collect()
    }

    #[test]
    fn test_linear_chain() {
        let order =
            execution_order(&nodes(&["1", "2", "3"]), &edges(&[("1", "2"), ("2", "3")]))
                .unwrap();
        assert_eq!(order, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_fan_in_sources_precede_target() {
        let order =
            execution_order(&nodes(&["1", "2", "3"]), &edges(&[("1", "3"), ("2", "3")]))
                .unwrap();
        assert_eq!(order.len(), 3);
        let pos = |id: &str| order.iter().position(|x| x == id).unwrap();
        assert!(pos("1") < pos("3"));
        assert!(pos("2") < pos("3"));
    }

    #[test]
    fn test_cycle_rejected() {
        let err = execution_order(&nodes(&["1", "2"]), &edges(&[("1", "2"), ("2", "1")]))
            .unwrap_err();
        assert_eq!(err, PipelineError::CyclicOrDisconnected);
    }

    #[test]
    fn test_partial_cycle_rejected() {
        // An acyclic prefix does not rescue a cyclic tail.
        let err = execution_order(
            &nodes(&["a", "b", "c"]),
            &edges(&[("a", "b"), ("b", "c"), ("c", "b")]),
        )
        .unwrap_err();
        assert_eq!(err, PipelineError::CyclicOrDisconnected);
    }

    #[test]
    fn test_ties_follow_input_order() {
        // No edges at all: the order is exactly the input order.
        let order = execution_order(&nodes(&["b", "a", "c"]), &[]).unwrap();
        assert_eq!(order, vec!["b", "a", "c"]);

        // Two independent roots feeding one sink: roots keep input order.
        let order = execution_order(
            &nodes(&["z", "a", "sink"]),
            &edges(&[("z", "sink"), ("a", "sink")]),
        )
        .unwrap();
        assert_eq!(order, vec!["z", "a", "sink"]);
    }

    #[test]
    fn test_dangling_edges_ignored() {
        let order = execution_order(
            &nodes(&["1", "2"]),
            &edges(&[("1", "2"), ("2", "ghost"), ("ghost", "1")]),
        )
        .unwrap();
        assert_eq!(order, vec!["1", "2"]);
    }

    #[test]
    fn test_empty_input() {
        let order = execution_order(&[], &[]).unwrap();
        assert!(order.is_empty());
    }

    #[test]
    fn test_idempotent() {
        let n = nodes(&["3", "1", "2"]);
        let e = edges(&[("3", "1"), ("3", "2")]);
        let first = execution_order(&n, &e).unwrap();
        let second = execution_order(&n, &e).unwrap();
        assert_eq!(first, second);
    }
}
