use std::io::{self, Write};

use anyhow::Result;
use clap::Args;
use cygraph_core::{CyclingDomain, CyclingMode, IntegerDomain};
use cygraph_graph::{GraphSource, Metrics, MetricsError, SuiteGraph, compute_metrics};
use tracing::{info, warn};

use super::suite::{LoadedSuite, SuiteArgs, load_suite};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `cygraph metrics`.
#[derive(Args, Debug)]
pub struct MetricsArgs {
    #[command(flatten)]
    pub suite: SuiteArgs,

    /// Collapse family members into their family node.
    #[arg(long)]
    pub group: bool,

    /// Leave suicide triggers out of the metrics.
    #[arg(long)]
    pub exclude_suicide: bool,
}

fn metrics_in<D: CyclingDomain>(
    domain: &D,
    suite: &LoadedSuite,
    args: &MetricsArgs,
) -> Result<Option<Metrics>> {
    let bounds = suite.bounds(domain, &args.suite)?;
    let graph = SuiteGraph::new(domain, &suite.config)?;
    let edges = graph.raw_graph(&bounds.start, bounds.stop.as_ref(), !args.group)?;

    match compute_metrics(&edges, !args.exclude_suicide) {
        Ok(metrics) => Ok(metrics),
        Err(err @ MetricsError::NoQualifyingEdges { .. }) => {
            warn!(code = %err.error_code(), "{err}");
            Ok(None)
        }
    }
}

fn render_text(m: &Metrics, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "edges: {}", m.edges)?;
    writeln!(w, "average num dependencies: {}", m.average_dependencies)?;
    writeln!(w, "max num dependencies: {}", m.max_dependencies)?;
    writeln!(w, "nodes: {}", m.nodes)
}

fn render_pretty(m: &Metrics, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Graph metrics")?;
    pretty_kv(w, "edges", m.edges.to_string())?;
    pretty_kv(w, "nodes", m.nodes.to_string())?;
    pretty_kv(w, "average num dependencies", format!("{:.2}", m.average_dependencies))?;
    pretty_kv(w, "max num dependencies", m.max_dependencies.to_string())
}

/// Compute and print dependency metrics for a suite's graph window.
///
/// Prints nothing when the window holds no edges, or when none of them
/// have a dependency to count.
///
/// # Errors
///
/// Returns an error if the suite cannot be loaded, its points do not parse,
/// or its graph cannot be expanded.
pub fn run_metrics(args: &MetricsArgs, output: OutputMode) -> Result<()> {
    let suite = load_suite(&args.suite)?;
    let metrics = match suite.config.scheduling.cycling_mode {
        CyclingMode::Integer => metrics_in(&IntegerDomain, &suite, args)?,
        CyclingMode::Gregorian => metrics_in(&suite.gregorian_domain()?, &suite, args)?,
    };

    let Some(metrics) = metrics else {
        info!(suite = %suite.location.name, "no metrics to report");
        return Ok(());
    };
    render_mode(output, &metrics, render_text, render_pretty)
}
