//! Progress and result reporting.
//!
//! The engine hands the tracked best tour to a [`Reporter`] every
//! `report_interval` generations and once more when the run stops.

use crate::ga::{GaResult, Tour};

/// Receives the best tour during and after a run.
pub trait Reporter {
    /// Called every `report_interval` generations.
    fn progress(&mut self, _generation: usize, _best: &Tour) {}

    /// Called once when the run stops.
    fn finished(&mut self, _result: &GaResult) {}
}

/// Discards every report.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl Reporter for NoopReporter {}

/// Emits reports as `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn progress(&mut self, generation: usize, best: &Tour) {
        tracing::info!(generation, best = %best, "progress");
    }

    fn finished(&mut self, result: &GaResult) {
        tracing::info!(
            generations = result.generations,
            reason = %result.stop_reason,
            best = %result.best,
            "finished"
        );
    }
}

/// Collects every report in memory.
#[derive(Debug, Default, Clone)]
pub struct RecordingReporter {
    /// `(generation, best tour)` per progress report.
    pub progress: Vec<(usize, Tour)>,
    /// The final result, once the run has stopped.
    pub result: Option<GaResult>,
}

impl Reporter for RecordingReporter {
    fn progress(&mut self, generation: usize, best: &Tour) {
        self.progress.push((generation, best.clone()));
    }

    fn finished(&mut self, result: &GaResult) {
        self.result = Some(result.clone());
    }
}
