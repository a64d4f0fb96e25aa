//! Suite arguments and loading shared by `metrics` and `bounds`.

use anyhow::{Context as _, Result};
use clap::Args;
use cygraph_core::{
    Bounds, CycleError, CyclingDomain, GregorianDomain, SuiteConfig, SuiteLocation, locate_suite,
    resolve_bounds,
};
use tracing::debug;

/// Positional suite arguments: which suite and which cycle-point window.
#[derive(Args, Debug, Clone)]
pub struct SuiteArgs {
    /// Registered suite name, suite directory, or suite file path.
    pub suite: String,

    /// Initial cycle point (default: the suite's initial point).
    #[arg(allow_negative_numbers = true)]
    pub start: Option<String>,

    /// Final cycle point (default: the suite's final point, else a few cycles
    /// past the start).
    #[arg(allow_negative_numbers = true)]
    pub stop: Option<String>,

    /// Initial cycle point to use when the suite does not define one.
    #[arg(long, value_name = "CYCLE_POINT")]
    pub icp: Option<String>,
}

/// A located and parsed suite.
#[derive(Debug)]
pub struct LoadedSuite {
    pub location: SuiteLocation,
    pub config: SuiteConfig,
}

/// Locate and parse the suite named by `args`.
///
/// # Errors
///
/// Returns an error if the suite cannot be found, read, or parsed.
pub fn load_suite(args: &SuiteArgs) -> Result<LoadedSuite> {
    let location = locate_suite(&args.suite)?;
    let config = SuiteConfig::load(&location.path)
        .with_context(|| format!("loading suite '{}'", location.name))?
        .with_icp(args.icp.as_deref());
    debug!(
        suite = %location.name,
        path = %location.path.display(),
        mode = %config.scheduling.cycling_mode,
        sections = config.graph.len(),
        "loaded suite"
    );
    Ok(LoadedSuite { location, config })
}

impl LoadedSuite {
    /// Build the calendar domain for this suite's configured time zone.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::InvalidTimeZone`] for an unparseable zone.
    pub fn gregorian_domain(&self) -> Result<GregorianDomain, CycleError> {
        GregorianDomain::from_time_zone(self.config.scheduling.cycle_point_time_zone.as_deref())
    }

    /// Resolve the graphing window from suite defaults and command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the suite has no initial point or a point does not parse.
    pub fn bounds<D: CyclingDomain>(
        &self,
        domain: &D,
        args: &SuiteArgs,
    ) -> Result<Bounds<D::Point>> {
        let defaults = self.config.point_defaults()?;
        let bounds = resolve_bounds(domain, &defaults, args.start.as_deref(), args.stop.as_deref())?;
        Ok(bounds)
    }
}
