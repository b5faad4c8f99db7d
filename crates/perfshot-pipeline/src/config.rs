//! Run configuration.
//!
//! All knobs of a run live in one explicit [`RunConfig`] value constructed
//! at startup and passed down; there is no module-level state. Defaults
//! reproduce the harness's original fixed constants.

use perfshot_common::{HarnessError, HarnessResult};
use perfshot_process::CommandSpec;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default target URLs for the shot loop.
pub const DEFAULT_AMMUNITION: [&str; 2] = [
    "localhost:8080/api/v1/maps/map1",
    "localhost:8080/api/v1/maps",
];

/// Default number of shots per run.
pub const DEFAULT_SHOT_COUNT: u32 = 100;

/// Default delay between consecutive shots.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(100);

/// Default seed for the shot sequence. A fixed seed makes the URL order
/// reproducible across runs.
pub const DEFAULT_SEED: u64 = 123_456_789;

/// Default upper bound of the raw random draw; the draw is reduced modulo
/// the ammunition pool size.
pub const DEFAULT_RANDOM_LIMIT: u32 = 1000;

/// Default bound on the profiler wait and on each post-processing stage.
pub const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default pause after the profiler wait, giving the trace file time to
/// land on disk.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Configuration for one profiling run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Command that launches the server under test.
    pub server: CommandSpec,
    /// Target URL pool.
    pub ammunition: Vec<String>,
    /// Number of shots to fire.
    pub shot_count: u32,
    /// Delay between consecutive shots.
    pub cooldown: Duration,
    /// Seed for the shot sequence.
    pub seed: u64,
    /// Upper bound of the raw random draw.
    pub random_limit: u32,
    /// Directory receiving all artifacts.
    pub output_dir: PathBuf,
    /// HTTP client executable used to fire shots.
    pub http_client: String,
    /// Sampling profiler executable.
    pub profiler: String,
    /// Directory containing `stackcollapse-perf.pl` and `flamegraph.pl`.
    pub flamegraph_dir: PathBuf,
    /// Bound on the profiler wait and each post-processing stage.
    pub stage_timeout: Duration,
    /// Pause after the profiler wait.
    pub settle_delay: Duration,
}

impl RunConfig {
    /// Build a configuration with default knobs for the given server command.
    pub fn new(server: CommandSpec) -> Self {
        Self {
            server,
            ammunition: DEFAULT_AMMUNITION.iter().map(|s| s.to_string()).collect(),
            shot_count: DEFAULT_SHOT_COUNT,
            cooldown: DEFAULT_COOLDOWN,
            seed: DEFAULT_SEED,
            random_limit: DEFAULT_RANDOM_LIMIT,
            output_dir: PathBuf::from("."),
            http_client: "curl".to_string(),
            profiler: "perf".to_string(),
            flamegraph_dir: default_flamegraph_dir(),
            stage_timeout: DEFAULT_STAGE_TIMEOUT,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    /// Validate the configuration before a run.
    pub fn validate(&self) -> HarnessResult<()> {
        if self.server.program.is_empty() {
            return Err(HarnessError::config("server command cannot be empty"));
        }
        if self.ammunition.is_empty() {
            return Err(HarnessError::config("ammunition pool cannot be empty"));
        }
        if self.ammunition.iter().any(|url| url.is_empty()) {
            return Err(HarnessError::config("ammunition URLs cannot be empty"));
        }
        if self.shot_count == 0 {
            return Err(HarnessError::config("shot count must be at least 1"));
        }
        if self.random_limit == 0 {
            return Err(HarnessError::config("random limit must be at least 1"));
        }
        if self.http_client.is_empty() {
            return Err(HarnessError::config("HTTP client cannot be empty"));
        }
        if self.profiler.is_empty() {
            return Err(HarnessError::config("profiler cannot be empty"));
        }
        Ok(())
    }
}

/// The default location of the FlameGraph scripts.
pub fn default_flamegraph_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("FlameGraph")
}

/// Fixed artifact paths of a run, in strict production order:
/// trace, stack text, collapsed stacks, rendered graph.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactPaths {
    /// Binary profiler trace.
    pub trace: PathBuf,
    /// Readable stack text dumped from the trace.
    pub stacks: PathBuf,
    /// Collapsed one-line-per-stack text.
    pub collapsed: PathBuf,
    /// Rendered flame graph.
    pub graph: PathBuf,
}

impl ArtifactPaths {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            trace: output_dir.join("perf.data"),
            stacks: output_dir.join("stacks.txt"),
            collapsed: output_dir.join("collapsed.txt"),
            graph: output_dir.join("graph.svg"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> RunConfig {
        RunConfig::new(CommandSpec::new("./server"))
    }

    #[test]
    fn test_defaults_match_constants() {
        let config = test_config();
        assert_eq!(config.shot_count, 100);
        assert_eq!(config.cooldown, Duration::from_millis(100));
        assert_eq!(config.seed, 123_456_789);
        assert_eq!(config.random_limit, 1000);
        assert_eq!(config.ammunition.len(), 2);
        assert_eq!(config.ammunition[0], "localhost:8080/api/v1/maps/map1");
        assert_eq!(config.http_client, "curl");
        assert_eq!(config.profiler, "perf");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_empty_fields() {
        let mut config = test_config();
        config.ammunition.clear();
        assert!(config.validate().is_err());

        let mut config = test_config();
        config.shot_count = 0;
        assert!(config.validate().is_err());

        let mut config = test_config();
        config.random_limit = 0;
        assert!(config.validate().is_err());

        let mut config = test_config();
        config.server.program = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_artifact_paths() {
        let paths = ArtifactPaths::new(Path::new("/tmp/run"));
        assert_eq!(paths.trace, Path::new("/tmp/run/perf.data"));
        assert_eq!(paths.stacks, Path::new("/tmp/run/stacks.txt"));
        assert_eq!(paths.collapsed, Path::new("/tmp/run/collapsed.txt"));
        assert_eq!(paths.graph, Path::new("/tmp/run/graph.svg"));
    }
}
