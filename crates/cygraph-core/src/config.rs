//! Suite configuration: the `suite.toml` file and suite discovery.
//!
//! Only the settings graph metrics need are modelled: the cycling mode, the
//! scheduling and visualization cycle points, family membership, and the
//! `[[graph]]` edge templates.

use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::bounds::PointDefaults;
use crate::cycling::CyclingMode;
use crate::error::ErrorCode;

/// File name of a suite definition inside a suite directory.
pub const SUITE_FILE: &str = "suite.toml";

/// Environment variable overriding the registered-suite run directory.
pub const RUN_DIR_ENV: &str = "CYGRAPH_RUN_DIR";

/// Suite name used when the suite was given as a path rather than a registration.
pub const UNREGISTERED_SUITE_NAME: &str = "test";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while locating or reading a suite.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("suite {0:?} is neither a registered suite nor a path to one")]
    SuiteNotFound(String),

    #[error("no initial cycle point: set [scheduling] initial_cycle_point or pass --icp")]
    MissingInitialPoint,

    #[error("failed to read suite file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse suite file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    /// Stable error code for this failure.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::SuiteNotFound(_) => ErrorCode::SuiteNotFound,
            Self::MissingInitialPoint => ErrorCode::MissingInitialPoint,
            Self::Read { .. } => ErrorCode::ConfigReadError,
            Self::Parse { .. } => ErrorCode::ConfigParseError,
        }
    }
}

// ---------------------------------------------------------------------------
// Suite file model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuiteConfig {
    #[serde(default)]
    pub scheduling: SchedulingConfig,
    #[serde(default)]
    pub visualization: VisualizationConfig,
    /// Family name → member task names.
    #[serde(default)]
    pub families: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub graph: Vec<GraphSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulingConfig {
    #[serde(default)]
    pub cycling_mode: CyclingMode,
    #[serde(default)]
    pub initial_cycle_point: Option<String>,
    #[serde(default)]
    pub final_cycle_point: Option<String>,
    /// Zone for gregorian points written without one.
    #[serde(default)]
    pub cycle_point_time_zone: Option<String>,
}

/// Graphing window defaults; unset values fall back to `[scheduling]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisualizationConfig {
    #[serde(default)]
    pub initial_cycle_point: Option<String>,
    #[serde(default)]
    pub final_cycle_point: Option<String>,
}

/// One `[[graph]]` section: edge templates repeated on a recurrence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSection {
    /// Step between cycle points; the domain default when unset.
    #[serde(default)]
    pub interval: Option<String>,
    /// First cycle point of the recurrence; the suite initial point when unset.
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub edges: Vec<EdgeTemplate>,
}

/// A dependency arrow between two task names, instantiated once per cycle point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeTemplate {
    #[serde(default)]
    pub left: Option<String>,
    #[serde(default)]
    pub right: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub suicide: bool,
    #[serde(default)]
    pub conditional: bool,
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).cloned()
}

impl SuiteConfig {
    /// Load and parse a suite file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is not a valid suite definition.
    #[instrument(level = "debug")]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            sections = config.graph.len(),
            families = config.families.len(),
            mode = %config.scheduling.cycling_mode,
            "suite file loaded"
        );
        Ok(config)
    }

    /// Parse suite file content.
    ///
    /// # Errors
    ///
    /// Returns the TOML error if `content` is not a valid suite definition.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Override the scheduling initial cycle point (the `--icp` flag).
    #[must_use]
    pub fn with_icp(mut self, icp: Option<&str>) -> Self {
        if let Some(icp) = icp.filter(|s| !s.trim().is_empty()) {
            self.scheduling.initial_cycle_point = Some(icp.to_string());
        }
        self
    }

    /// The suite initial cycle point, from scheduling then visualization.
    #[must_use]
    pub fn initial_point(&self) -> Option<String> {
        non_empty(self.scheduling.initial_cycle_point.as_ref())
            .or_else(|| non_empty(self.visualization.initial_cycle_point.as_ref()))
    }

    /// Default graphing window: visualization points, falling back to scheduling.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingInitialPoint`] if no initial point is
    /// configured anywhere.
    pub fn point_defaults(&self) -> Result<PointDefaults, ConfigError> {
        let initial_point = non_empty(self.visualization.initial_cycle_point.as_ref())
            .or_else(|| non_empty(self.scheduling.initial_cycle_point.as_ref()))
            .ok_or(ConfigError::MissingInitialPoint)?;
        let final_point = non_empty(self.visualization.final_cycle_point.as_ref())
            .or_else(|| non_empty(self.scheduling.final_cycle_point.as_ref()));
        Ok(PointDefaults {
            initial_point,
            final_point,
        })
    }

    /// Map each family member task to its family name.
    ///
    /// A task listed in several families maps to the first in name order.
    #[must_use]
    pub fn family_of(&self) -> BTreeMap<&str, &str> {
        let mut map = BTreeMap::new();
        for (family, members) in &self.families {
            for member in members {
                map.entry(member.as_str()).or_insert(family.as_str());
            }
        }
        map
    }
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// Where a suite definition was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteLocation {
    /// Registered name, or [`UNREGISTERED_SUITE_NAME`] for plain paths.
    pub name: String,
    /// Path to the suite file.
    pub path: PathBuf,
}

/// Default run directory for registered suites: `$CYGRAPH_RUN_DIR` or `~/cylc-run`.
#[must_use]
pub fn default_run_dir() -> Option<PathBuf> {
    env::var_os(RUN_DIR_ENV)
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join("cylc-run")))
}

/// Resolve a suite identifier to a suite file.
///
/// Registered suites (`<run dir>/<id>/suite.toml`) win; otherwise `id` is
/// treated as a suite directory or a suite file path.
///
/// # Errors
///
/// Returns [`ConfigError::SuiteNotFound`] if neither lookup succeeds.
pub fn locate_suite(id: &str) -> Result<SuiteLocation, ConfigError> {
    locate_suite_in(id, default_run_dir().as_deref())
}

/// Core lookup logic, separated from the environment for testability.
///
/// # Errors
///
/// Returns [`ConfigError::SuiteNotFound`] if neither lookup succeeds.
pub fn locate_suite_in(id: &str, run_dir: Option<&Path>) -> Result<SuiteLocation, ConfigError> {
    if let Some(run_dir) = run_dir {
        let registered = run_dir.join(id).join(SUITE_FILE);
        if !id.is_empty() && registered.is_file() {
            debug!(path = %registered.display(), "found registered suite");
            return Ok(SuiteLocation {
                name: id.to_string(),
                path: registered,
            });
        }
    }

    // Could not find a registration; assume we have been given a path instead.
    let path = Path::new(id);
    let suite_file = if path.is_dir() {
        path.join(SUITE_FILE)
    } else {
        path.to_path_buf()
    };
    if suite_file.is_file() {
        debug!(path = %suite_file.display(), "using suite path");
        return Ok(SuiteLocation {
            name: UNREGISTERED_SUITE_NAME.to_string(),
            path: suite_file,
        });
    }

    Err(ConfigError::SuiteNotFound(id.to_string()))
}
