#![forbid(unsafe_code)]
//! cygraph-graph library.
//!
//! # Overview
//!
//! Turns a suite's `[[graph]]` sections into a raw, range-bounded edge list
//! and reduces that list to summary metrics.
//!
//! ## Pipeline
//!
//! ```text
//! SuiteConfig + CyclingDomain
//!        ↓  source::SuiteGraph::new()
//! SuiteGraph
//!        ↓  GraphSource::raw_graph(start, stop, ungroup_all)
//! Vec<GraphEdge>
//!        ↓  metrics::compute_metrics(edges, include_suicide)
//! Option<Metrics> (edges, nodes, average/max dependencies)
//! ```
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums carrying a `cygraph_core::ErrorCode`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod edge;
pub mod metrics;
pub mod source;

pub use edge::{GraphEdge, NodeId};
pub use metrics::{Metrics, MetricsError, compute_metrics};
pub use source::{GraphError, GraphSource, SuiteGraph};
