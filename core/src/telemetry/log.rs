use super::observer::{DayProgress, ProgressObserver};
use crate::ais_interface::{to_zulu, Deployment, DeploymentWindow, IntervalKind, PersistedInterval};
use crate::prelude::{DetectionError, RadiusLevel};
use crate::processing::annotator::AnnotationStats;
use crate::processing::pipeline::DeploymentSummary;
use log::{debug, info, warn};
use std::path::Path;

const DASHES: &str = "-----------------------------------------------------------";

/// Observer that renders progress through the `log` facade.
pub struct LogObserver;

impl LogObserver {
    pub fn new() -> Self {
        Self
    }

    pub fn record(&self, message: &str) {
        info!("{}", message);
    }
}

impl Default for LogObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for LogObserver {
    fn deployment_started(&self, deployment: &Deployment, window: &DeploymentWindow) {
        self.record(&format!(
            "Working on {} for {} to {}",
            deployment.device,
            to_zulu(window.begin),
            to_zulu(window.end)
        ));
        self.record(DASHES);
        self.record(&format!(
            "{:^9}|{:^13}|{:^15}|{:^19}",
            "Day (#)", "Elapsed (s)", "Completed (%)", "Estimated TTC (s)"
        ));
        self.record(DASHES);
    }

    fn day_completed(&self, progress: &DayProgress) {
        self.record(&format!(
            "{:^9}|{:^13.3}|{:^15.2}|{:^19.3}",
            progress.day,
            progress.elapsed_seconds,
            progress.completed_percent,
            progress.remaining_seconds
        ));
    }

    fn level_resolved(&self, kind: IntervalKind, level: RadiusLevel, intervals: usize) {
        debug!(
            "{} level in {:05} out {:05}: {} intervals",
            kind, level.inclusion, level.exclusion, intervals
        );
    }

    fn snapshot_flagged(&self, interval: &PersistedInterval, path: &Path) {
        warn!(
            "{} interval {} - {} at {:05} m has no reports; wrote empty snapshot {} for review",
            interval.kind,
            to_zulu(interval.begin),
            to_zulu(interval.end),
            interval.level.exclusion,
            path.display()
        );
    }

    fn file_annotated(&self, path: &Path, stats: &AnnotationStats) {
        debug!(
            "annotated {}: {} in range, {} geodesic, {} prefiltered, {} undefined",
            path.display(),
            stats.within,
            stats.geodesic,
            stats.prefiltered,
            stats.undefined
        );
    }

    fn file_failed(&self, path: &Path, error: &DetectionError) {
        warn!("skipping {}: {}", path.display(), error);
    }

    fn deployment_finished(&self, summary: &DeploymentSummary) {
        self.record(&format!(
            "Finished {}: {} buckets scanned",
            summary.device, summary.buckets_scanned
        ));
        for (kind, counts) in [
            (IntervalKind::Background, &summary.background),
            (IntervalKind::Scenario, &summary.scenario),
        ] {
            for (level, count) in counts.iter().rev() {
                self.record(&format!(
                    "  {:<10} in {:05} out {:05}: {}",
                    kind.to_string(),
                    level.inclusion,
                    level.exclusion,
                    count
                ));
            }
        }
        if summary.flagged_snapshots > 0 {
            warn!(
                "{} interval snapshots were empty and need manual review",
                summary.flagged_snapshots
            );
        }
    }
}
