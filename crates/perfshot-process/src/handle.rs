//! Process spawning and the owned process handle.
//!
//! The launcher returns immediately; callers decide whether and how long
//! to wait. Every handle is spawned with kill-on-drop so that no exit
//! path of the orchestrator leaks a running child.

use crate::{CommandSpec, OutputSink};
use perfshot_common::{ProcessError, ProcessResult};
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{debug, warn};

/// Spawn a process with stdout redirected to the given sink.
///
/// Standard error is discarded and standard input is closed. Returns a
/// handle immediately without waiting for completion.
pub fn spawn(spec: &CommandSpec, sink: OutputSink) -> ProcessResult<ProcessHandle> {
    let stdout = match &sink {
        OutputSink::Inherit => Stdio::inherit(),
        OutputSink::Discard => Stdio::null(),
        OutputSink::File(path) => {
            let file = std::fs::File::create(path).map_err(|e| {
                ProcessError::spawn_failed(
                    &spec.program,
                    format!("failed to create output file {}: {}", path.display(), e),
                )
            })?;
            Stdio::from(file)
        }
    };

    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .stdout(stdout)
        .stderr(Stdio::null())
        .stdin(Stdio::null())
        .kill_on_drop(true);

    let child = cmd
        .spawn()
        .map_err(|e| ProcessError::spawn_failed(&spec.program, e.to_string()))?;

    debug!("Spawned '{}' (PID: {:?})", spec, child.id());

    Ok(ProcessHandle {
        program: spec.program.clone(),
        child,
        exit_status: None,
    })
}

/// An owned handle to a spawned process.
///
/// The handle is the sole owner of the child: the orchestrator that holds
/// it is responsible for waiting on or terminating it.
pub struct ProcessHandle {
    program: String,
    child: Child,
    exit_status: Option<ExitStatus>,
}

impl ProcessHandle {
    /// The OS process identifier, if the process has not been reaped yet.
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    /// The program this handle was spawned from.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Non-blocking liveness probe.
    pub fn is_running(&mut self) -> bool {
        if self.exit_status.is_some() {
            return false;
        }
        match self.child.try_wait() {
            Ok(Some(status)) => {
                self.exit_status = Some(status);
                false
            }
            Ok(None) => true,
            Err(e) => {
                warn!("Failed to poll '{}': {}", self.program, e);
                false
            }
        }
    }

    /// Block until the process exits.
    pub async fn wait(&mut self) -> ProcessResult<ExitStatus> {
        if let Some(status) = self.exit_status {
            return Ok(status);
        }
        let status = self
            .child
            .wait()
            .await
            .map_err(|e| ProcessError::wait_failed(&self.program, e.to_string()))?;
        self.exit_status = Some(status);
        Ok(status)
    }

    /// Block until the process exits or the timeout elapses.
    ///
    /// Returns `Ok(None)` on expiry; the process keeps running and expiry
    /// is not an error.
    pub async fn wait_timeout(&mut self, dur: Duration) -> ProcessResult<Option<ExitStatus>> {
        if let Some(status) = self.exit_status {
            return Ok(Some(status));
        }
        match timeout(dur, self.child.wait()).await {
            Ok(Ok(status)) => {
                self.exit_status = Some(status);
                Ok(Some(status))
            }
            Ok(Err(e)) => Err(ProcessError::wait_failed(&self.program, e.to_string())),
            Err(_) => Ok(None),
        }
    }

    /// Send a graceful termination signal.
    ///
    /// Idempotent: a handle whose process has already exited is a no-op
    /// success, and the call never blocks.
    pub fn terminate(&mut self) -> ProcessResult<()> {
        if !self.is_running() {
            return Ok(());
        }
        match self.child.id() {
            Some(pid) => {
                #[cfg(unix)]
                {
                    crate::terminate_gracefully(pid)
                }
                #[cfg(not(unix))]
                {
                    self.child
                        .start_kill()
                        .map_err(|e| ProcessError::stop_failed(pid, e.to_string()))
                }
            }
            None => Ok(()),
        }
    }

    /// Force kill the process. No-op if it has already exited.
    pub fn kill(&mut self) -> ProcessResult<()> {
        if !self.is_running() {
            return Ok(());
        }
        match self.child.id() {
            Some(pid) => {
                #[cfg(unix)]
                {
                    crate::force_kill(pid)
                }
                #[cfg(not(unix))]
                {
                    self.child
                        .start_kill()
                        .map_err(|e| ProcessError::stop_failed(pid, e.to_string()))
                }
            }
            None => Ok(()),
        }
    }
}

/// Run a command to completion with stdout captured to a file.
///
/// Opens (truncating) the file at `path`, spawns the command with that
/// file as its stdout, and waits up to `wait`. Each post-processing stage
/// goes through here so it fully completes before the next stage reads
/// its output. Returns `Ok(None)` if the wait expired; the overrunning
/// process is terminated.
pub async fn run_to_file(
    spec: &CommandSpec,
    path: &Path,
    wait: Duration,
) -> ProcessResult<Option<ExitStatus>> {
    let mut handle = spawn(spec, OutputSink::File(path.to_path_buf()))?;
    let status = handle.wait_timeout(wait).await?;
    if status.is_none() {
        warn!("'{}' did not finish within {:?}, terminating", spec, wait);
        handle.terminate()?;
    }
    Ok(status)
}
