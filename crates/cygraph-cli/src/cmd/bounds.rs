use std::io::{self, Write};

use anyhow::Result;
use clap::Args;
use cygraph_core::{CyclingDomain, CyclingMode, IntegerDomain};
use serde::Serialize;

use super::suite::{LoadedSuite, SuiteArgs, load_suite};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `cygraph bounds`.
#[derive(Args, Debug)]
pub struct BoundsArgs {
    #[command(flatten)]
    pub suite: SuiteArgs,
}

/// The resolved graphing window, with points in their domain's display form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundsReport {
    pub suite: String,
    pub cycling_mode: String,
    pub start: String,
    pub stop: Option<String>,
}

fn report_in<D: CyclingDomain>(
    domain: &D,
    suite: &LoadedSuite,
    args: &SuiteArgs,
) -> Result<BoundsReport> {
    let bounds = suite.bounds(domain, args)?;
    Ok(BoundsReport {
        suite: suite.location.name.clone(),
        cycling_mode: suite.config.scheduling.cycling_mode.to_string(),
        start: bounds.start.to_string(),
        stop: bounds.stop.as_ref().map(ToString::to_string),
    })
}

fn stop_text(report: &BoundsReport) -> &str {
    report.stop.as_deref().unwrap_or("(unbounded)")
}

fn render_text(report: &BoundsReport, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "start: {}", report.start)?;
    writeln!(w, "stop: {}", stop_text(report))
}

fn render_pretty(report: &BoundsReport, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &format!("Bounds: {}", report.suite))?;
    pretty_kv(w, "cycling mode", &report.cycling_mode)?;
    pretty_kv(w, "start", &report.start)?;
    pretty_kv(w, "stop", stop_text(report))
}

/// Print the start and stop points a `metrics` run would graph.
///
/// # Errors
///
/// Returns an error if the suite cannot be loaded or its points do not parse.
pub fn run_bounds(args: &BoundsArgs, output: OutputMode) -> Result<()> {
    let suite = load_suite(&args.suite)?;
    let report = match suite.config.scheduling.cycling_mode {
        CyclingMode::Integer => report_in(&IntegerDomain, &suite, &args.suite)?,
        CyclingMode::Gregorian => report_in(&suite.gregorian_domain()?, &suite, &args.suite)?,
    };
    render_mode(output, &report, render_text, render_pretty)
}
