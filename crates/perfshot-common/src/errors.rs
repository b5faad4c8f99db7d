//! Error types for the perfshot harness.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for low-level process operations.
pub type ProcessResult<T> = std::result::Result<T, ProcessError>;

/// Errors raised by process spawning, waiting, probing, and termination.
#[derive(Error, Debug, Clone)]
pub enum ProcessError {
    #[error("Process spawn failed: {program} - {reason}")]
    SpawnFailed { program: String, reason: String },

    #[error("Process stop failed: {pid} - {reason}")]
    StopFailed { pid: u32, reason: String },

    #[error("Process wait failed: {program} - {reason}")]
    WaitFailed { program: String, reason: String },

    #[error("Process check failed: {pid} - {reason}")]
    CheckFailed { pid: u32, reason: String },
}

impl ProcessError {
    pub fn spawn_failed(program: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SpawnFailed {
            program: program.into(),
            reason: reason.into(),
        }
    }

    pub fn stop_failed(pid: u32, reason: impl Into<String>) -> Self {
        Self::StopFailed {
            pid,
            reason: reason.into(),
        }
    }

    pub fn wait_failed(program: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::WaitFailed {
            program: program.into(),
            reason: reason.into(),
        }
    }

    pub fn check_failed(pid: u32, reason: impl Into<String>) -> Self {
        Self::CheckFailed {
            pid,
            reason: reason.into(),
        }
    }
}

/// Result type for harness-level operations.
pub type HarnessResult<T> = std::result::Result<T, HarnessError>;

/// Errors raised by the profiling pipeline and its configuration.
#[derive(Error, Debug)]
pub enum HarnessError {
    /// Invalid run configuration.
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    /// The profiler trace file was absent after the bounded profiler wait.
    /// No post-processing stage runs once this is raised.
    #[error("Trace file not found: {}", path.display())]
    TraceMissing { path: PathBuf },

    /// A pipeline stage was entered out of order.
    #[error("Invalid stage transition: {from} -> {to}")]
    StageOrder { from: String, to: String },

    /// A process operation failed.
    #[error(transparent)]
    Process(#[from] ProcessError),
}

impl HarnessError {
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    pub fn trace_missing(path: impl AsRef<Path>) -> Self {
        Self::TraceMissing {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn stage_order(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::StageOrder {
            from: from.into(),
            to: to.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_error_construction() {
        let error = ProcessError::spawn_failed("curl", "executable not found");
        assert!(matches!(error, ProcessError::SpawnFailed { .. }));
        assert!(format!("{}", error).contains("spawn failed"));

        let error = ProcessError::stop_failed(4242, "no such process");
        assert_eq!(
            format!("{}", error),
            "Process stop failed: 4242 - no such process"
        );
    }

    #[test]
    fn test_trace_missing_names_path() {
        let error = HarnessError::trace_missing("/tmp/out/perf.data");
        assert!(format!("{}", error).contains("/tmp/out/perf.data"));
    }

    #[test]
    fn test_process_error_converts_to_harness_error() {
        fn inner() -> ProcessResult<()> {
            Err(ProcessError::wait_failed("perf", "interrupted"))
        }

        fn outer() -> HarnessResult<()> {
            inner()?;
            Ok(())
        }

        assert!(matches!(outer(), Err(HarnessError::Process(_))));
    }
}
