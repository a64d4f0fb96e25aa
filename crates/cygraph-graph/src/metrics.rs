//! Summary metrics for a raw dependency graph.
//!
//! # Metrics Provided
//!
//! - **edges**: Number of qualifying edges that have a right endpoint.
//! - **nodes**: Number of node *occurrences* across qualifying edges: each
//!   edge contributes its left and right endpoint when present. A task that
//!   appears in three edges is counted three times.
//! - **average num dependencies**: Mean out-degree over the distinct left
//!   endpoints of counted edges.
//! - **max num dependencies**: Highest out-degree of any left endpoint.
//!
//! An edge qualifies when suicide edges are included or the edge is not a
//! suicide trigger.
//!
//! # Empty Input
//!
//! An empty raw graph has nothing to report and yields `Ok(None)`. A
//! non-empty graph whose filter leaves no out-degree to average yields
//! [`MetricsError::NoQualifyingEdges`].

use std::collections::HashMap;

use cygraph_core::ErrorCode;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::edge::GraphEdge;

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Summary statistics for a raw dependency graph.
///
/// Field order and names match the reference text output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    /// Qualifying edges with a right endpoint.
    pub edges: usize,
    /// Mean out-degree over distinct left endpoints.
    #[serde(rename = "average num dependencies")]
    pub average_dependencies: f64,
    /// Highest out-degree of any left endpoint.
    #[serde(rename = "max num dependencies")]
    pub max_dependencies: usize,
    /// Node occurrences across qualifying edges (not unique nodes).
    pub nodes: usize,
}

/// The graph had edges, but none survived filtering.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetricsError {
    #[error("none of the {total} graph edges qualify for dependency metrics")]
    NoQualifyingEdges { total: usize },
}

impl MetricsError {
    /// Stable error code for this failure.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::NoQualifyingEdges { .. } => ErrorCode::NoQualifyingEdges,
        }
    }
}

/// Compute summary metrics for `edges`.
///
/// Returns `Ok(None)` for an empty graph.
///
/// # Errors
///
/// Returns [`MetricsError::NoQualifyingEdges`] if `edges` is non-empty but
/// no qualifying edge has both a left and a right endpoint.
#[instrument(level = "debug", skip(edges), fields(total = edges.len()))]
pub fn compute_metrics(
    edges: &[GraphEdge],
    include_suicide: bool,
) -> Result<Option<Metrics>, MetricsError> {
    if edges.is_empty() {
        return Ok(None);
    }

    let qualifying = || {
        edges
            .iter()
            .filter(move |edge| include_suicide || !edge.suicide)
    };

    let mut edge_count = 0_usize;
    let mut out_degree: HashMap<&str, usize> = HashMap::new();
    for edge in qualifying().filter(|edge| edge.right.is_some()) {
        edge_count += 1;
        if let Some(left) = edge.left.as_deref() {
            *out_degree.entry(left).or_default() += 1;
        }
    }

    let nodes = qualifying()
        .map(|edge| usize::from(edge.left.is_some()) + usize::from(edge.right.is_some()))
        .sum();

    let Some(max_dependencies) = out_degree.values().copied().max() else {
        return Err(MetricsError::NoQualifyingEdges { total: edges.len() });
    };
    let total_dependencies: usize = out_degree.values().sum();
    let average_dependencies = compute_average(total_dependencies, out_degree.len());

    debug!(
        edges = edge_count,
        nodes,
        sources = out_degree.len(),
        "graph metrics computed"
    );

    Ok(Some(Metrics {
        edges: edge_count,
        average_dependencies,
        max_dependencies,
        nodes,
    }))
}

// ---------------------------------------------------------------------------
// Internal helpers (cast precision suppressed at function scope)
// ---------------------------------------------------------------------------

#[allow(clippy::cast_precision_loss)]
fn compute_average(total: usize, count: usize) -> f64 {
    total as f64 / count as f64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(left: Option<&str>, right: Option<&str>, suicide: bool) -> GraphEdge {
        GraphEdge {
            left: left.map(str::to_string),
            right: right.map(str::to_string),
            suicide,
            ..GraphEdge::default()
        }
    }

    fn sample() -> Vec<GraphEdge> {
        vec![
            edge(Some("A"), Some("B"), false),
            edge(Some("A"), Some("C"), false),
            edge(Some("B"), Some("D"), true),
        ]
    }

    #[test]
    fn empty_graph_has_no_metrics() {
        assert_eq!(compute_metrics(&[], true), Ok(None));
        assert_eq!(compute_metrics(&[], false), Ok(None));
    }

    #[test]
    fn excluding_suicide_edges() {
        let m = compute_metrics(&sample(), false)
            .expect("metrics")
            .expect("non-empty");
        assert_eq!(m.edges, 2);
        assert_eq!(m.nodes, 4, "A, B, A, C");
        assert!((m.average_dependencies - 2.0).abs() < f64::EPSILON);
        assert_eq!(m.max_dependencies, 2);
    }

    #[test]
    fn including_suicide_edges() {
        let m = compute_metrics(&sample(), true)
            .expect("metrics")
            .expect("non-empty");
        assert_eq!(m.edges, 3);
        assert_eq!(m.nodes, 6);
        assert!((m.average_dependencies - 1.5).abs() < f64::EPSILON);
        assert_eq!(m.max_dependencies, 2);
    }

    #[test]
    fn nodes_count_occurrences_not_identities() {
        // A → B → C: B appears twice.
        let edges = vec![edge(Some("A"), Some("B"), false), edge(Some("B"), Some("C"), false)];
        let m = compute_metrics(&edges, true).expect("metrics").expect("non-empty");
        assert_eq!(m.nodes, 4);
        assert_eq!(m.edges, 2);
        assert!((m.average_dependencies - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_right_endpoints_only_add_nodes() {
        let edges = vec![
            edge(Some("A"), Some("B"), false),
            edge(Some("solo"), None, false),
        ];
        let m = compute_metrics(&edges, true).expect("metrics").expect("non-empty");
        assert_eq!(m.edges, 1);
        assert_eq!(m.nodes, 3);
        assert_eq!(m.max_dependencies, 1);
        assert!((m.average_dependencies - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_left_endpoints_count_as_edges_but_not_degree() {
        let edges = vec![
            edge(None, Some("B"), false),
            edge(Some("A"), Some("B"), false),
            edge(Some("A"), Some("C"), false),
        ];
        let m = compute_metrics(&edges, true).expect("metrics").expect("non-empty");
        assert_eq!(m.edges, 3);
        assert_eq!(m.nodes, 5);
        assert_eq!(m.max_dependencies, 2);
        assert!((m.average_dependencies - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn all_right_endpoints_missing_is_an_error() {
        let edges = vec![edge(Some("A"), None, false), edge(Some("B"), None, false)];
        assert_eq!(
            compute_metrics(&edges, true),
            Err(MetricsError::NoQualifyingEdges { total: 2 })
        );
    }

    #[test]
    fn everything_filtered_out_is_an_error() {
        let edges = vec![edge(Some("A"), Some("B"), true)];
        let err = compute_metrics(&edges, false).expect_err("all suicide");
        assert_eq!(err.error_code(), ErrorCode::NoQualifyingEdges);
        assert!(compute_metrics(&edges, true).is_ok());
    }

    #[test]
    fn only_left_less_edges_is_an_error() {
        let edges = vec![edge(None, Some("B"), false)];
        assert!(matches!(
            compute_metrics(&edges, true),
            Err(MetricsError::NoQualifyingEdges { total: 1 })
        ));
    }

    #[test]
    fn repeated_calls_agree() {
        let edges = sample();
        assert_eq!(compute_metrics(&edges, true), compute_metrics(&edges, true));
        assert_eq!(compute_metrics(&edges, false), compute_metrics(&edges, false));
    }

    #[test]
    fn serializes_with_reference_keys_in_order() {
        let m = compute_metrics(&sample(), true).expect("metrics").expect("non-empty");
        let json = serde_json::to_string(&m).expect("json");
        assert_eq!(
            json,
            r#"{"edges":3,"average num dependencies":1.5,"max num dependencies":2,"nodes":6}"#
        );
    }
}
