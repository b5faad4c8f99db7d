//! Run report.

use crate::config::ArtifactPaths;
use crate::stage::StageTransition;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

/// Summary of one profiling run, written next to the artifacts.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub server_pid: u32,
    pub shots_fired: u32,
    pub stages: Vec<StageTransition>,
    pub artifacts: ArtifactPaths,
}

impl RunReport {
    pub const FILE_NAME: &'static str = "run-report.json";

    /// Write the report into `dir` as JSON. Best-effort: failures are
    /// logged, never fatal.
    pub fn write_to(&self, dir: &Path) {
        let path = dir.join(Self::FILE_NAME);
        match serde_json::to_string_pretty(self) {
            Ok(json) => match std::fs::write(&path, json) {
                Ok(()) => debug!("Run report written to {}", path.display()),
                Err(e) => warn!("Failed to write run report to {}: {}", path.display(), e),
            },
            Err(e) => warn!("Failed to serialize run report: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_report_serializes_and_writes() {
        let dir = tempfile::tempdir().unwrap();
        let report = RunReport {
            started_at: Utc::now(),
            finished_at: Utc::now(),
            server_pid: 4242,
            shots_fired: 100,
            stages: Vec::new(),
            artifacts: ArtifactPaths::new(&PathBuf::from("/tmp/run")),
        };

        report.write_to(dir.path());

        let content = std::fs::read_to_string(dir.path().join(RunReport::FILE_NAME)).unwrap();
        assert!(content.contains("\"server_pid\": 4242"));
        assert!(content.contains("perf.data"));
    }
}
