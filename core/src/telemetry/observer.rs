use crate::ais_interface::{Deployment, DeploymentWindow, IntervalKind, PersistedInterval};
use crate::math::GeoPoint;
use crate::prelude::{DetectionError, RadiusLevel};
use crate::processing::annotator::AnnotationStats;
use crate::processing::pipeline::DeploymentSummary;
use std::path::Path;

/// Progress of a classification scan, emitted once per completed day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayProgress {
    pub day: usize,
    pub elapsed_seconds: f64,
    pub completed_percent: f64,
    pub remaining_seconds: f64,
}

/// Receives progress and outcome notifications. Every method defaults to a no-op.
pub trait ProgressObserver {
    fn deployment_started(&self, _deployment: &Deployment, _window: &DeploymentWindow) {}

    fn day_completed(&self, _progress: &DayProgress) {}

    fn level_resolved(&self, _kind: IntervalKind, _level: RadiusLevel, _intervals: usize) {}

    /// An interval whose padded slice of the timeline held no reports.
    fn snapshot_flagged(&self, _interval: &PersistedInterval, _path: &Path) {}

    fn file_annotated(&self, _path: &Path, _stats: &AnnotationStats) {}

    fn file_failed(&self, _path: &Path, _error: &DetectionError) {}

    fn deployment_finished(&self, _summary: &DeploymentSummary) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentObserver;

impl ProgressObserver for SilentObserver {}

/// Side-effect hook fired the first time a zone takes part in a classification.
///
/// Background zones are keyed by exclusion radius and scenario zones by
/// inclusion radius.
pub trait ZoneMapHook {
    fn zone_first_seen(&self, center: GeoPoint, level: RadiusLevel, kind: IntervalKind);
}
