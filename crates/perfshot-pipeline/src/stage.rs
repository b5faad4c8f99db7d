//! Pipeline stage tracking.
//!
//! The pipeline is strictly ordered and never retries: the only legal
//! move is from a stage to its immediate successor. The tracker records
//! each transition with a timestamp for the run report.

use chrono::{DateTime, Utc};
use perfshot_common::{HarnessError, HarnessResult};
use serde::Serialize;
use std::fmt;

/// One step of the profiling pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Idle,
    StartServer,
    StartProfiler,
    Shoot,
    StopServer,
    WaitProfiler,
    VerifyTrace,
    DumpTrace,
    CollapseStacks,
    RenderGraph,
    Done,
}

impl Stage {
    /// The stage that must follow this one; `None` after the last.
    pub fn successor(self) -> Option<Stage> {
        match self {
            Stage::Idle => Some(Stage::StartServer),
            Stage::StartServer => Some(Stage::StartProfiler),
            Stage::StartProfiler => Some(Stage::Shoot),
            Stage::Shoot => Some(Stage::StopServer),
            Stage::StopServer => Some(Stage::WaitProfiler),
            Stage::WaitProfiler => Some(Stage::VerifyTrace),
            Stage::VerifyTrace => Some(Stage::DumpTrace),
            Stage::DumpTrace => Some(Stage::CollapseStacks),
            Stage::CollapseStacks => Some(Stage::RenderGraph),
            Stage::RenderGraph => Some(Stage::Done),
            Stage::Done => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Idle => write!(f, "idle"),
            Stage::StartServer => write!(f, "start_server"),
            Stage::StartProfiler => write!(f, "start_profiler"),
            Stage::Shoot => write!(f, "shoot"),
            Stage::StopServer => write!(f, "stop_server"),
            Stage::WaitProfiler => write!(f, "wait_profiler"),
            Stage::VerifyTrace => write!(f, "verify_trace"),
            Stage::DumpTrace => write!(f, "dump_trace"),
            Stage::CollapseStacks => write!(f, "collapse_stacks"),
            Stage::RenderGraph => write!(f, "render_graph"),
            Stage::Done => write!(f, "done"),
        }
    }
}

/// A completed stage transition, kept for the run report.
#[derive(Debug, Clone, Serialize)]
pub struct StageTransition {
    pub from: Stage,
    pub to: Stage,
    pub timestamp: DateTime<Utc>,
}

/// Tracks progression through the pipeline.
#[derive(Debug, Default)]
pub struct StageTracker {
    current: Stage,
    history: Vec<StageTransition>,
}

impl StageTracker {
    pub fn new() -> Self {
        Self {
            current: Stage::Idle,
            history: Vec::new(),
        }
    }

    pub fn current(&self) -> Stage {
        self.current
    }

    pub fn history(&self) -> &[StageTransition] {
        &self.history
    }

    /// Advance to the given stage.
    ///
    /// Errors unless `stage` is the immediate successor of the current
    /// stage; the pipeline never skips, repeats, or retries a step.
    pub fn advance_to(&mut self, stage: Stage) -> HarnessResult<()> {
        if self.current.successor() != Some(stage) {
            return Err(HarnessError::stage_order(
                self.current.to_string(),
                stage.to_string(),
            ));
        }

        self.history.push(StageTransition {
            from: self.current,
            to: stage,
            timestamp: Utc::now(),
        });
        self.current = stage;
        tracing::debug!("Pipeline stage: {}", stage);
        Ok(())
    }

    /// Take the transition history, consuming the record.
    pub fn into_history(self) -> Vec<StageTransition> {
        self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDER: [Stage; 10] = [
        Stage::StartServer,
        Stage::StartProfiler,
        Stage::Shoot,
        Stage::StopServer,
        Stage::WaitProfiler,
        Stage::VerifyTrace,
        Stage::DumpTrace,
        Stage::CollapseStacks,
        Stage::RenderGraph,
        Stage::Done,
    ];

    #[test]
    fn test_ordered_walk_succeeds() {
        let mut tracker = StageTracker::new();
        assert_eq!(tracker.current(), Stage::Idle);

        for stage in ORDER {
            tracker.advance_to(stage).unwrap();
            assert_eq!(tracker.current(), stage);
        }

        assert_eq!(tracker.history().len(), ORDER.len());
        assert_eq!(tracker.history()[0].from, Stage::Idle);
        assert_eq!(tracker.history()[0].to, Stage::StartServer);
    }

    #[test]
    fn test_skipping_a_stage_fails() {
        let mut tracker = StageTracker::new();
        tracker.advance_to(Stage::StartServer).unwrap();

        let result = tracker.advance_to(Stage::Shoot);
        assert!(matches!(result, Err(HarnessError::StageOrder { .. })));
        assert_eq!(tracker.current(), Stage::StartServer);
    }

    #[test]
    fn test_no_retry_and_no_backward_moves() {
        let mut tracker = StageTracker::new();
        tracker.advance_to(Stage::StartServer).unwrap();
        tracker.advance_to(Stage::StartProfiler).unwrap();

        assert!(tracker.advance_to(Stage::StartProfiler).is_err());
        assert!(tracker.advance_to(Stage::StartServer).is_err());
    }

    #[test]
    fn test_done_has_no_successor() {
        assert_eq!(Stage::Done.successor(), None);
    }
}
