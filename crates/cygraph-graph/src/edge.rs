//! Raw graph edges.

use std::fmt;

/// A task instance identifier: `name.point`.
pub type NodeId = String;

/// One dependency arrow in the raw graph.
///
/// Either endpoint may be absent. An edge with no `right` marks a task that
/// appears in the graph without a downstream dependency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct GraphEdge {
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    /// Free-form edge label; not used by metrics.
    pub label: Option<String>,
    /// Suicide (cancelling) trigger.
    pub suicide: bool,
    /// Part of a conditional expression; not used by metrics.
    pub conditional: bool,
}

impl GraphEdge {
    /// A plain `left => right` edge.
    #[must_use]
    pub fn new(left: impl Into<NodeId>, right: impl Into<NodeId>) -> Self {
        Self {
            left: Some(left.into()),
            right: Some(right.into()),
            ..Self::default()
        }
    }

    /// An edge with only a left endpoint.
    #[must_use]
    pub fn standalone(left: impl Into<NodeId>) -> Self {
        Self {
            left: Some(left.into()),
            ..Self::default()
        }
    }

    /// Mark this edge as a suicide trigger.
    #[must_use]
    pub fn with_suicide(mut self, suicide: bool) -> Self {
        self.suicide = suicide;
        self
    }
}

/// Build a node identifier from a task name and cycle point.
#[must_use]
pub fn node_id(name: &str, point: &impl fmt::Display) -> NodeId {
    format!("{name}.{point}")
}

impl fmt::Display for GraphEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arrow = if self.suicide { "=>!" } else { "=>" };
        match (&self.left, &self.right) {
            (Some(l), Some(r)) => write!(f, "{l} {arrow} {r}"),
            (Some(l), None) => write!(f, "{l}"),
            (None, Some(r)) => write!(f, "{arrow} {r}"),
            (None, None) => f.write_str("(empty)"),
        }
    }
}
