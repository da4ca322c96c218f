//! Step-and-deliver orchestration
//!
//! Each iteration issues one blocking step and, if the sink wants that step,
//! reads the positions back and hands them over. Step `k + 1` is never issued
//! before step `k` returned, and a run only stops between steps.

use crate::backend::{ComputeBackend, Snapshot};
use crate::error::Result;
use nbody_physics::diagnostics;
use std::time::{Duration, Instant};

/// When a run ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCondition {
    /// Stop after this many steps (warm-up not included)
    Steps(u64),
    /// Run until the sink returns [`SinkControl::Stop`]
    Indefinite,
}

/// Returned by a sink after each snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkControl {
    Continue,
    Stop,
}

/// Output collaborator fed with per-step snapshots (renderer, encoder, logger)
pub trait SnapshotSink {
    /// Whether the snapshot after `step` should be read back at all
    fn wants(&self, _step: u64) -> bool {
        true
    }

    fn consume(&mut self, snapshot: Snapshot<'_>) -> SinkControl;
}

impl<F> SnapshotSink for F
where
    F: FnMut(Snapshot<'_>) -> SinkControl,
{
    fn consume(&mut self, snapshot: Snapshot<'_>) -> SinkControl {
        self(snapshot)
    }
}

/// Discards everything and never triggers a readback
pub struct NullSink;

impl SnapshotSink for NullSink {
    fn wants(&self, _step: u64) -> bool {
        false
    }

    fn consume(&mut self, _snapshot: Snapshot<'_>) -> SinkControl {
        SinkControl::Continue
    }
}

/// Keeps a copy of every `every`-th snapshot
#[derive(Debug, Default)]
pub struct CollectSink {
    every: u64,
    pub frames: Vec<(u64, Vec<glam::Vec3>)>,
}

impl CollectSink {
    pub fn every(every: u64) -> Self {
        Self {
            every: every.max(1),
            frames: Vec::new(),
        }
    }
}

impl SnapshotSink for CollectSink {
    fn wants(&self, step: u64) -> bool {
        step % self.every.max(1) == 0
    }

    fn consume(&mut self, snapshot: Snapshot<'_>) -> SinkControl {
        self.frames.push((snapshot.step(), snapshot.to_vec()));
        SinkControl::Continue
    }
}

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub stop: StopCondition,
    /// Steps advanced before the first snapshot, never read back
    pub warmup: u64,
    /// Log progress every this many steps
    pub log_every: Option<u64>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            stop: StopCondition::Indefinite,
            warmup: 0,
            log_every: Some(100),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Steps advanced, warm-up included
    pub steps: u64,
    pub snapshots: u64,
    pub stopped_by_sink: bool,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn steps_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.steps as f64 / secs
        } else {
            0.0
        }
    }
}

pub struct SimulationLoop<B: ComputeBackend> {
    backend: B,
    config: LoopConfig,
}

impl<B: ComputeBackend> SimulationLoop<B> {
    /// Wrap an already uploaded backend
    pub fn new(backend: B, config: LoopConfig) -> Self {
        Self { backend, config }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Run until the stop condition or the sink ends it. Any error aborts
    /// the run and is returned as is.
    pub fn run(&mut self, sink: &mut impl SnapshotSink) -> Result<RunSummary> {
        let start = Instant::now();
        let mut steps = 0u64;
        let mut snapshots = 0u64;

        log::info!(
            "Running {} bodies on the {} backend ({:?}, {} warm-up steps)",
            self.backend.body_count(),
            self.backend.name(),
            self.config.stop,
            self.config.warmup
        );

        for _ in 0..self.config.warmup {
            self.backend.step()?;
            steps += 1;
        }

        let mut delivered_steps = 0u64;
        let mut stopped_by_sink = false;
        loop {
            if let StopCondition::Steps(limit) = self.config.stop {
                if delivered_steps >= limit {
                    break;
                }
            }

            self.backend.step()?;
            steps += 1;
            delivered_steps += 1;

            let step = self.backend.steps_completed();
            let wanted = sink.wants(step);
            // Progress lines are debug-only, so skip their readback otherwise
            let log_now = log::log_enabled!(log::Level::Debug)
                && self
                    .config
                    .log_every
                    .is_some_and(|every| every > 0 && step % every == 0);

            if wanted || log_now {
                let snapshot = self.backend.read_positions()?;
                if log_now {
                    log_progress(&snapshot, start.elapsed());
                }
                if wanted {
                    snapshots += 1;
                    if sink.consume(snapshot) == SinkControl::Stop {
                        stopped_by_sink = true;
                        break;
                    }
                }
            }
        }

        let summary = RunSummary {
            steps,
            snapshots,
            stopped_by_sink,
            elapsed: start.elapsed(),
        };
        log::info!(
            "Run finished: {} steps, {} snapshots in {:.2?} ({:.1} steps/s)",
            summary.steps,
            summary.snapshots,
            summary.elapsed,
            summary.steps_per_second()
        );
        Ok(summary)
    }
}

fn log_progress(snapshot: &Snapshot<'_>, elapsed: Duration) {
    match diagnostics::bounds(snapshot.positions()) {
        Some((lo, hi)) => log::debug!(
            "step {}: extent {:.3} (min {:.3}, max {:.3}) after {:.2?}",
            snapshot.step(),
            (hi - lo).length(),
            lo,
            hi,
            elapsed
        ),
        None => log::debug!("step {}: empty system", snapshot.step()),
    }
}
