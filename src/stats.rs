use crate::types::RunStats;
use std::sync::Mutex;
use tracing::info;

/// Sink receiving per-run totals. One call per completed monitoring run.
pub trait StatsSink: Send + Sync {
    fn record_run(&self, stats: &RunStats);
}

/// Default sink: structured log line per run.
#[derive(Default)]
pub struct LogStatsSink;

impl LogStatsSink {
    pub fn new() -> Self {
        Self
    }
}

impl StatsSink for LogStatsSink {
    fn record_run(&self, stats: &RunStats) {
        info!(
            total_found = stats.total_found,
            total_relevant = stats.total_relevant,
            source_count = stats.source_count,
            elapsed_seconds = stats.elapsed_seconds,
            "Monitoring run completed"
        );
    }
}

/// Collecting sink for tests.
#[derive(Default)]
pub struct MemoryStatsSink {
    runs: Mutex<Vec<RunStats>>,
}

impl MemoryStatsSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn runs(&self) -> Vec<RunStats> {
        self.runs.lock().expect("stats sink poisoned").clone()
    }
}

impl StatsSink for MemoryStatsSink {
    fn record_run(&self, stats: &RunStats) {
        self.runs.lock().expect("stats sink poisoned").push(*stats);
    }
}
