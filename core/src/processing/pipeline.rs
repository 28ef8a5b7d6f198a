use super::bucketizer::Buckets;
use super::classifier::{BucketClassification, MultiResolutionClassifier};
use super::dedup::{CandidateSets, CrossResolutionDeduplicator, LevelOutcome};
use super::runs::RunExtractor;
use crate::ais_interface::{
    deployment::start_of_day, Deployment, DeploymentWindow, IntervalKind, PersistedInterval,
    Timeline,
};
use crate::prelude::{DetectionResult, DetectorConfig, RadiusLevel};
use crate::telemetry::{DayProgress, ProgressObserver, ZoneMapHook};
use chrono::Duration;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

/// Deduplicated runs for both classifications of one deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionOutcome {
    pub window: DeploymentWindow,
    pub bucket_width: Duration,
    pub buckets_scanned: usize,
    /// Widest level first.
    pub background: Vec<LevelOutcome>,
    /// Widest level first.
    pub scenario: Vec<LevelOutcome>,
}

impl DetectionOutcome {
    pub fn levels(&self, kind: IntervalKind) -> &[LevelOutcome] {
        match kind {
            IntervalKind::Background => &self.background,
            IntervalKind::Scenario => &self.scenario,
        }
    }

    pub fn intervals(&self, kind: IntervalKind) -> Vec<PersistedInterval> {
        self.levels(kind)
            .iter()
            .flat_map(|outcome| {
                outcome
                    .runs
                    .iter()
                    .map(move |run| run.into_interval(kind, outcome.level, self.bucket_width))
            })
            .collect()
    }

    pub fn counts(&self, kind: IntervalKind) -> BTreeMap<RadiusLevel, usize> {
        self.levels(kind)
            .iter()
            .map(|outcome| (outcome.level, outcome.runs.len()))
            .collect()
    }
}

/// Interval counts reported when a deployment completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentSummary {
    pub device: String,
    pub buckets_scanned: usize,
    pub background: BTreeMap<RadiusLevel, usize>,
    pub scenario: BTreeMap<RadiusLevel, usize>,
    pub flagged_snapshots: usize,
}

impl DeploymentSummary {
    pub fn new(device: &str, outcome: &DetectionOutcome, flagged_snapshots: usize) -> Self {
        Self {
            device: device.to_string(),
            buckets_scanned: outcome.buckets_scanned,
            background: outcome.counts(IntervalKind::Background),
            scenario: outcome.counts(IntervalKind::Scenario),
            flagged_snapshots,
        }
    }

    pub fn total(&self, kind: IntervalKind) -> usize {
        match kind {
            IntervalKind::Background => self.background.values().sum(),
            IntervalKind::Scenario => self.scenario.values().sum(),
        }
    }
}

/// Single scan over a deployment's timeline followed by cross-level resolution.
pub struct DeploymentPass<'a> {
    config: &'a DetectorConfig,
    observer: &'a dyn ProgressObserver,
    map_hook: Option<&'a dyn ZoneMapHook>,
}

impl<'a> DeploymentPass<'a> {
    pub fn new(config: &'a DetectorConfig, observer: &'a dyn ProgressObserver) -> Self {
        Self {
            config,
            observer,
            map_hook: None,
        }
    }

    pub fn with_map_hook(mut self, hook: &'a dyn ZoneMapHook) -> Self {
        self.map_hook = Some(hook);
        self
    }

    pub fn detect(
        &self,
        deployment: &Deployment,
        timeline: &Timeline,
    ) -> DetectionResult<DetectionOutcome> {
        self.config.validate()?;
        let window = deployment.window();
        let width = self.config.bucket_width();
        self.observer.deployment_started(deployment, &window);

        let classifier =
            MultiResolutionClassifier::new(self.config.radius_levels(), self.config.boundary_policy);
        let empty_sets = || -> CandidateSets {
            classifier
                .levels()
                .iter()
                .map(|&level| (level, BTreeSet::new()))
                .collect()
        };
        let mut background = empty_sets();
        let mut scenario = empty_sets();
        let mut mapped_exclusion = BTreeSet::new();
        let mut mapped_inclusion = BTreeSet::new();

        let started = Instant::now();
        let total_days = window.days();
        let mut reporting_day = window.begin;
        let mut days_processed = 0usize;
        let mut buckets_scanned = 0usize;

        for bucket in Buckets::new(timeline.reports(), &window, width) {
            let day = start_of_day(bucket.start);
            if day > reporting_day {
                days_processed += 1;
                reporting_day = day;
                self.observer
                    .day_completed(&day_progress(days_processed, total_days, &started));
            }
            buckets_scanned += 1;

            for (level, verdict) in classifier.classify_all(bucket.reports) {
                match verdict {
                    BucketClassification::Background => {
                        if let Some(starts) = background.get_mut(&level) {
                            starts.insert(bucket.start);
                        }
                        if mapped_exclusion.insert(level.exclusion) {
                            self.notify_zone(deployment, level, IntervalKind::Background);
                        }
                    }
                    BucketClassification::ScenarioCandidate(_) => {
                        if let Some(starts) = scenario.get_mut(&level) {
                            starts.insert(bucket.start);
                        }
                        if mapped_inclusion.insert(level.inclusion) {
                            self.notify_zone(deployment, level, IntervalKind::Scenario);
                        }
                    }
                    BucketClassification::Neither => {}
                }
            }
        }
        if buckets_scanned > 0 {
            self.observer
                .day_completed(&day_progress(days_processed + 1, total_days, &started));
        }

        let background = self.resolve(IntervalKind::Background, background, width);
        let scenario = self.resolve(IntervalKind::Scenario, scenario, width);

        Ok(DetectionOutcome {
            window,
            bucket_width: width,
            buckets_scanned,
            background,
            scenario,
        })
    }

    fn resolve(
        &self,
        kind: IntervalKind,
        candidates: CandidateSets,
        width: Duration,
    ) -> Vec<LevelOutcome> {
        let minimum = match kind {
            IntervalKind::Background => self.config.min_background_run,
            IntervalKind::Scenario => self.config.min_scenario_run,
        };
        let outcomes = CrossResolutionDeduplicator::new(RunExtractor::new(width, minimum))
            .resolve(candidates);
        for outcome in &outcomes {
            self.observer
                .level_resolved(kind, outcome.level, outcome.runs.len());
        }
        outcomes
    }

    fn notify_zone(&self, deployment: &Deployment, level: RadiusLevel, kind: IntervalKind) {
        if let Some(hook) = self.map_hook {
            hook.zone_first_seen(deployment.reference, level, kind);
        }
    }
}

fn day_progress(day: usize, total_days: f64, started: &Instant) -> DayProgress {
    let elapsed = started.elapsed().as_secs_f64();
    let completed = day as f64 / total_days;
    DayProgress {
        day,
        elapsed_seconds: elapsed,
        completed_percent: completed * 100.0,
        remaining_seconds: (elapsed / completed - elapsed).max(0.0),
    }
}
