//! Raw graph generation from a suite definition.
//!
//! # Overview
//!
//! A [`GraphSource`] produces the raw edge list for a cycle range. The suite
//! implementation, [`SuiteGraph`], repeats each `[[graph]]` section's edge
//! templates at every cycle point of the section's recurrence that falls
//! inside the range.
//!
//! ## Unbounded Ranges
//!
//! Without a stop point a section contributes at most
//! [`DEFAULT_POINT_LIMIT`] points, counted from the range start (the start
//! point plus three more).
//!
//! ## Grouping
//!
//! When `ungroup_all` is false, task names that belong to a family are
//! replaced by the family name. Edges that become identical are collapsed,
//! and edges that collapse onto a single node are dropped.

use std::collections::{BTreeMap, HashSet};

use cygraph_core::{Bounds, ErrorCode};
use cygraph_core::config::{ConfigError, EdgeTemplate, SuiteConfig};
use cygraph_core::cycling::{CycleError, CyclingDomain};
use tracing::{debug, instrument};

use crate::edge::{GraphEdge, NodeId, node_id};

/// Points per section when the range has no stop point.
pub const DEFAULT_POINT_LIMIT: usize = 4;

/// Upper bound on the points a single section may place in one range.
pub const MAX_EXPANSION_STEPS: usize = 1_000_000;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while expanding a suite graph.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error(transparent)]
    Cycle(#[from] CycleError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("graph section {section} edge {index} has neither a left nor a right task")]
    EmptyEdge { section: usize, index: usize },

    #[error("graph section {section} needs more than {limit} recurrence steps")]
    ExpansionLimit { section: usize, limit: usize },
}

impl GraphError {
    /// Stable error code for this failure.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Cycle(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::EmptyEdge { .. } => ErrorCode::EmptyEdge,
            Self::ExpansionLimit { .. } => ErrorCode::ExpansionLimit,
        }
    }
}

// ---------------------------------------------------------------------------
// GraphSource
// ---------------------------------------------------------------------------

/// Anything that can list the raw dependency edges of a cycle range.
pub trait GraphSource {
    type Point;

    /// Edges for points in `[start, stop]`; `stop = None` means unbounded.
    ///
    /// # Errors
    ///
    /// Implementation-specific expansion failures.
    fn raw_graph(
        &self,
        start: &Self::Point,
        stop: Option<&Self::Point>,
        ungroup_all: bool,
    ) -> Result<Vec<GraphEdge>, GraphError>;
}

// ---------------------------------------------------------------------------
// SuiteGraph
// ---------------------------------------------------------------------------

struct Section<'a, D: CyclingDomain> {
    start: D::Point,
    interval: D::Interval,
    edges: &'a [EdgeTemplate],
}

/// Graph source backed by a suite's `[[graph]]` sections.
pub struct SuiteGraph<'a, D: CyclingDomain> {
    domain: &'a D,
    sections: Vec<Section<'a, D>>,
    family_of: BTreeMap<&'a str, &'a str>,
}

fn is_blank(name: Option<&String>) -> bool {
    name.is_none_or(|n| n.trim().is_empty())
}

impl<'a, D: CyclingDomain> SuiteGraph<'a, D> {
    /// Validate and pre-parse the graph sections of `config`.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingInitialPoint`] if the suite has no initial point.
    /// - [`CycleError`] if a section start or interval does not parse.
    /// - [`GraphError::EmptyEdge`] if an edge template names no task.
    pub fn new(domain: &'a D, config: &'a SuiteConfig) -> Result<Self, GraphError> {
        let initial = config
            .initial_point()
            .ok_or(ConfigError::MissingInitialPoint)?;
        let initial = domain.parse_point(&initial)?;

        let mut sections = Vec::with_capacity(config.graph.len());
        for (index, section) in config.graph.iter().enumerate() {
            let start = match section.start.as_deref().filter(|s| !s.trim().is_empty()) {
                Some(raw) => domain.parse_point(raw)?,
                None => initial.clone(),
            };
            let interval = match section.interval.as_deref().filter(|s| !s.trim().is_empty()) {
                Some(raw) => domain.parse_interval(raw)?,
                None => domain.default_interval(),
            };
            if let Some(edge) = section
                .edges
                .iter()
                .position(|t| is_blank(t.left.as_ref()) && is_blank(t.right.as_ref()))
            {
                return Err(GraphError::EmptyEdge {
                    section: index,
                    index: edge,
                });
            }
            sections.push(Section {
                start,
                interval,
                edges: &section.edges,
            });
        }

        Ok(Self {
            domain,
            sections,
            family_of: config.family_of(),
        })
    }

    /// Cycle points of one section that fall within `bounds`.
    ///
    /// The walk starts at the first recurrence point not before the range
    /// start, so only points inside the range count toward the step limit.
    fn section_points(
        &self,
        index: usize,
        section: &Section<'a, D>,
        bounds: &Bounds<D::Point>,
    ) -> Result<Vec<D::Point>, GraphError> {
        let mut points = Vec::new();
        let first = self
            .domain
            .first_at_or_after(&section.start, &section.interval, &bounds.start);
        let mut point = match first {
            Ok(point) => point,
            Err(CycleError::PointOverflow { .. }) => return Ok(points),
            Err(e) => return Err(e.into()),
        };
        loop {
            if !bounds.contains(self.domain, &point)
                || (bounds.stop.is_none() && points.len() >= DEFAULT_POINT_LIMIT)
            {
                return Ok(points);
            }
            if points.len() >= MAX_EXPANSION_STEPS {
                return Err(GraphError::ExpansionLimit {
                    section: index,
                    limit: MAX_EXPANSION_STEPS,
                });
            }
            points.push(point.clone());
            point = match self.domain.add(&point, &section.interval) {
                Ok(next) => next,
                // Nothing representable lies beyond this point.
                Err(CycleError::PointOverflow { .. }) => return Ok(points),
                Err(e) => return Err(e.into()),
            };
        }
    }

    fn endpoint(&self, name: Option<&String>, point: &D::Point, ungroup_all: bool) -> Option<NodeId> {
        let name = name.map(|n| n.trim()).filter(|n| !n.is_empty())?;
        let name = if ungroup_all {
            name
        } else {
            self.family_of.get(name).copied().unwrap_or(name)
        };
        Some(node_id(name, point))
    }

    fn instantiate(&self, template: &EdgeTemplate, point: &D::Point, ungroup_all: bool) -> GraphEdge {
        GraphEdge {
            left: self.endpoint(template.left.as_ref(), point, ungroup_all),
            right: self.endpoint(template.right.as_ref(), point, ungroup_all),
            label: template.label.clone(),
            suicide: template.suicide,
            conditional: template.conditional,
        }
    }
}

impl<D: CyclingDomain> GraphSource for SuiteGraph<'_, D> {
    type Point = D::Point;

    #[instrument(level = "debug", skip_all, fields(%start, ?stop, ungroup_all))]
    fn raw_graph(
        &self,
        start: &D::Point,
        stop: Option<&D::Point>,
        ungroup_all: bool,
    ) -> Result<Vec<GraphEdge>, GraphError> {
        let bounds = Bounds {
            start: start.clone(),
            stop: stop.cloned(),
        };
        let mut entries: Vec<(D::Point, usize, GraphEdge)> = Vec::new();
        let mut declared = 0_usize;
        for (index, section) in self.sections.iter().enumerate() {
            let points = self.section_points(index, section, &bounds)?;
            for point in &points {
                for (offset, template) in section.edges.iter().enumerate() {
                    let edge = self.instantiate(template, point, ungroup_all);
                    entries.push((point.clone(), declared + offset, edge));
                }
            }
            declared += section.edges.len();
        }

        entries.sort_by(|a, b| self.domain.compare(&a.0, &b.0).then(a.1.cmp(&b.1)));
        let mut edges: Vec<GraphEdge> = entries.into_iter().map(|(_, _, edge)| edge).collect();

        if !ungroup_all {
            let before = edges.len();
            let mut seen = HashSet::new();
            edges.retain(|e| {
                let self_loop = e.left.is_some() && e.left == e.right;
                !self_loop && seen.insert((e.left.clone(), e.right.clone(), e.suicide))
            });
            debug!(collapsed = before - edges.len(), "grouped family edges");
        }

        debug!(edges = edges.len(), "raw graph expanded");
        Ok(edges)
    }
}
