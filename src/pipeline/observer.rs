//! Stage boundary hooks
//!
//! A [`PipelineObserver`] is notified before and after every stage and can
//! inspect the main intermediate artifacts. All methods have empty default
//! bodies, so an observer only implements what it needs.

use crate::clustering::{BaseCluster, MergedCluster};
use crate::phrase::PhraseCandidate;
use std::time::{Duration, Instant};

pub const STAGE_TOKENIZE: &str = "tokenize";
pub const STAGE_INDEX: &str = "index";
pub const STAGE_SUFFIX_ARRAY: &str = "suffix_array";
pub const STAGE_PHRASES: &str = "phrases";
pub const STAGE_BASE_CLUSTERS: &str = "base_clusters";
pub const STAGE_MERGE: &str = "merge";
pub const STAGE_RANK: &str = "rank";
pub const STAGE_ASSEMBLE: &str = "assemble";

/// All stages in execution order
pub const STAGES: [&str; 8] = [
    STAGE_TOKENIZE,
    STAGE_INDEX,
    STAGE_SUFFIX_ARRAY,
    STAGE_PHRASES,
    STAGE_BASE_CLUSTERS,
    STAGE_MERGE,
    STAGE_RANK,
    STAGE_ASSEMBLE,
];

/// Wall-clock timer for one stage
#[derive(Debug, Clone, Copy)]
pub struct StageClock(Instant);

impl StageClock {
    pub fn start() -> Self {
        Self(Instant::now())
    }

    pub fn elapsed(&self) -> Duration {
        self.0.elapsed()
    }
}

/// What a stage did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageReport {
    elapsed: Duration,
    items: Option<usize>,
}

impl StageReport {
    pub fn new(elapsed: Duration) -> Self {
        Self {
            elapsed,
            items: None,
        }
    }

    /// Number of items the stage produced (documents, terms, clusters...)
    pub fn with_items(mut self, items: usize) -> Self {
        self.items = Some(items);
        self
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn items(&self) -> Option<usize> {
        self.items
    }
}

pub trait PipelineObserver {
    fn on_stage_start(&mut self, _stage: &'static str) {}

    fn on_stage_end(&mut self, _stage: &'static str, _report: &StageReport) {}

    fn on_phrases(&mut self, _phrases: &[PhraseCandidate]) {}

    fn on_base_clusters(&mut self, _clusters: &[BaseCluster]) {}

    fn on_merged_clusters(&mut self, _clusters: &[MergedCluster]) {}
}

/// Observer that ignores every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Records the report of every finished stage
#[derive(Debug, Clone, Default)]
pub struct StageTimingObserver {
    reports: Vec<(&'static str, StageReport)>,
}

impl StageTimingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(stage, report)` pairs in execution order
    pub fn reports(&self) -> &[(&'static str, StageReport)] {
        &self.reports
    }

    pub fn report(&self, stage: &str) -> Option<&StageReport> {
        self.reports
            .iter()
            .find(|(name, _)| *name == stage)
            .map(|(_, report)| report)
    }

    pub fn total_elapsed(&self) -> Duration {
        self.reports.iter().map(|(_, r)| r.elapsed()).sum()
    }
}

impl PipelineObserver for StageTimingObserver {
    fn on_stage_end(&mut self, stage: &'static str, report: &StageReport) {
        self.reports.push((stage, *report));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_builder() {
        let report = StageReport::new(Duration::from_millis(3)).with_items(42);
        assert_eq!(report.elapsed(), Duration::from_millis(3));
        assert_eq!(report.items(), Some(42));
        assert_eq!(StageReport::new(Duration::ZERO).items(), None);
    }

    #[test]
    fn test_timing_observer_records() {
        let mut obs = StageTimingObserver::new();
        obs.on_stage_start(STAGE_TOKENIZE);
        obs.on_stage_end(STAGE_TOKENIZE, &StageReport::new(Duration::from_millis(2)));
        obs.on_stage_end(STAGE_INDEX, &StageReport::new(Duration::from_millis(1)).with_items(7));

        assert_eq!(obs.reports().len(), 2);
        assert_eq!(obs.report(STAGE_INDEX).and_then(|r| r.items()), Some(7));
        assert!(obs.report(STAGE_MERGE).is_none());
        assert_eq!(obs.total_elapsed(), Duration::from_millis(3));
    }

    #[test]
    fn test_stage_names_unique() {
        for (i, a) in STAGES.iter().enumerate() {
            for b in &STAGES[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
