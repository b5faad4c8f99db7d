//! The profiling pipeline.
//!
//! Strictly ordered, non-retrying: launch the server, attach the
//! profiler to its PID, generate load, stop the server, wait for the
//! trace, then convert it to a flame graph through three external-tool
//! stages. Only the trace-existence guard aborts a run; every other
//! stage failure is logged and the pipeline proceeds.

use crate::config::{ArtifactPaths, RunConfig};
use crate::report::RunReport;
use crate::shooter;
use crate::stage::{Stage, StageTracker};
use chrono::Utc;
use perfshot_common::{HarnessError, HarnessResult};
use perfshot_process::{self as process, CommandSpec, OutputSink};
use std::path::Path;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

const FORCE_KILL_TIMEOUT: Duration = Duration::from_secs(3);

/// Execute one full profiling run.
pub async fn run(config: &RunConfig) -> HarnessResult<RunReport> {
    config.validate()?;

    std::fs::create_dir_all(&config.output_dir).map_err(|e| {
        HarnessError::config(format!(
            "failed to create output directory {}: {}",
            config.output_dir.display(),
            e
        ))
    })?;

    let paths = ArtifactPaths::new(&config.output_dir);
    let started_at = Utc::now();
    let mut tracker = StageTracker::new();

    // Server under test
    tracker.advance_to(Stage::StartServer)?;
    let mut server = process::spawn(&config.server, OutputSink::Inherit)?;
    let server_pid = server.pid().unwrap_or(0);
    info!("Server started: {} (PID: {})", config.server, server_pid);
    info!("Output directory: {}", config.output_dir.display());

    // Profiler attached to the server's PID, running alongside the shot loop
    tracker.advance_to(Stage::StartProfiler)?;
    let record = CommandSpec::new(&config.profiler)
        .arg("record")
        .arg("-o")
        .arg(paths.trace.display().to_string())
        .arg("-p")
        .arg(server_pid.to_string());
    let mut profiler = match process::spawn(&record, OutputSink::Discard) {
        Ok(handle) => handle,
        Err(e) => {
            // A run that profiles nothing is useless; don't leave the server behind.
            let _ = server.terminate();
            return Err(e.into());
        }
    };
    info!("Profiler attached: {}", record);

    // Load generation
    tracker.advance_to(Stage::Shoot)?;
    let shots_fired = shooter::fire_all(config).await?;

    // Stop the server without waiting on it
    tracker.advance_to(Stage::StopServer)?;
    if let Err(e) = server.terminate() {
        warn!("Failed to terminate server (PID: {}): {}", server_pid, e);
    }
    if let Some(pid) = server.pid() {
        match process::process_exists(pid) {
            Ok(true) => debug!("Server still shutting down (PID: {})", pid),
            Ok(false) => debug!("Server exited (PID: {})", pid),
            Err(e) => warn!("Failed to check server (PID: {}): {}", pid, e),
        }
    }

    // Bounded wait for the profiler to finish writing its trace.
    // Expiry is not fatal; the trace check below decides.
    tracker.advance_to(Stage::WaitProfiler)?;
    match profiler.wait_timeout(config.stage_timeout).await {
        Ok(Some(status)) => info!("Profiler exited with {}", status),
        Ok(None) => warn!(
            "Profiler did not exit within {:?}, proceeding",
            config.stage_timeout
        ),
        Err(e) => warn!("Failed to wait for profiler: {}", e),
    }
    sleep(config.settle_delay).await;

    // The one hard guard: without a trace there is nothing to process
    tracker.advance_to(Stage::VerifyTrace)?;
    if !paths.trace.exists() {
        error!("Trace file not found: {}", paths.trace.display());
        if profiler.is_running() {
            warn!("Terminating still-running profiler");
            let _ = profiler.terminate();
        }
        return Err(HarnessError::trace_missing(&paths.trace));
    }

    // Trace -> readable stack text
    tracker.advance_to(Stage::DumpTrace)?;
    let dump = CommandSpec::new(&config.profiler)
        .arg("script")
        .arg("-i")
        .arg(paths.trace.display().to_string());
    run_stage(Stage::DumpTrace, &dump, &paths.stacks, config.stage_timeout).await;

    // Collapse stacks: one line per unique stack
    tracker.advance_to(Stage::CollapseStacks)?;
    let collapse = CommandSpec::new(
        config
            .flamegraph_dir
            .join("stackcollapse-perf.pl")
            .display()
            .to_string(),
    )
    .arg(paths.stacks.display().to_string());
    run_stage(
        Stage::CollapseStacks,
        &collapse,
        &paths.collapsed,
        config.stage_timeout,
    )
    .await;

    // Render the flame graph from the collapsed stacks
    tracker.advance_to(Stage::RenderGraph)?;
    let render = CommandSpec::new(
        config
            .flamegraph_dir
            .join("flamegraph.pl")
            .display()
            .to_string(),
    )
    .arg(paths.collapsed.display().to_string());
    run_stage(Stage::RenderGraph, &render, &paths.graph, config.stage_timeout).await;

    // The profiler normally exits once its target dies; if it is still
    // around, take it down before finishing the run.
    if profiler.is_running() {
        warn!("Profiler still running after post-processing, terminating");
        let _ = profiler.terminate();
        if let Ok(None) = profiler.wait_timeout(FORCE_KILL_TIMEOUT).await {
            warn!("Profiler ignored termination, force killing");
            let _ = profiler.kill();
        }
    }

    tracker.advance_to(Stage::Done)?;
    let report = RunReport {
        started_at,
        finished_at: Utc::now(),
        server_pid,
        shots_fired,
        stages: tracker.into_history(),
        artifacts: paths,
    };
    report.write_to(&config.output_dir);
    info!("Job done");
    Ok(report)
}

/// Run one post-processing stage to completion, capturing stdout to `output`.
async fn run_stage(stage: Stage, spec: &CommandSpec, output: &Path, timeout: Duration) {
    info!("Stage {}: {}", stage, spec);
    match process::run_to_file(spec, output, timeout).await {
        Ok(Some(status)) if status.success() => {}
        Ok(Some(status)) => warn!("Stage {} exited with {}", stage, status),
        Ok(None) => warn!("Stage {} did not finish within {:?}", stage, timeout),
        Err(e) => warn!("Stage {} failed: {}", stage, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_config_is_rejected_before_any_spawn() {
        let mut config = RunConfig::new(CommandSpec::new("./server"));
        config.ammunition.clear();

        let result = run(&config).await;
        assert!(matches!(result, Err(HarnessError::Config { .. })));
    }
}
