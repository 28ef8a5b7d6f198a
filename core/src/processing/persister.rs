use super::pipeline::DetectionOutcome;
use crate::ais_interface::{
    to_zulu, Deployment, IntervalKind, PersistedInterval, Timeline, TimelineSnapshot,
};
use crate::prelude::{DetectionError, DetectionResult};
use crate::telemetry::ProgressObserver;
use chrono::Duration;
use csv::Writer;
use std::fs;
use std::path::{Path, PathBuf};

/// Files written for one deployment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistReport {
    pub background_table: PathBuf,
    pub scenario_table: PathBuf,
    pub snapshots_written: usize,
    /// Intervals whose padded timeline slice was empty.
    pub flagged: Vec<PersistedInterval>,
}

/// Writes interval tables and the padded timeline slice behind each interval.
#[derive(Debug, Clone)]
pub struct IntervalPersister {
    intervals_dir: PathBuf,
    snapshots_dir: PathBuf,
    padding: Duration,
}

impl IntervalPersister {
    pub fn new(intervals_dir: &Path, snapshots_dir: &Path, padding: Duration) -> Self {
        Self {
            intervals_dir: intervals_dir.to_path_buf(),
            snapshots_dir: snapshots_dir.to_path_buf(),
            padding,
        }
    }

    pub fn persist(
        &self,
        deployment: &Deployment,
        outcome: &DetectionOutcome,
        timeline: &Timeline,
        observer: &dyn ProgressObserver,
    ) -> DetectionResult<PersistReport> {
        let snapshot_dir = self.snapshots_dir.join(deployment.key());
        for dir in [&self.intervals_dir, &snapshot_dir] {
            fs::create_dir_all(dir).map_err(|err| DetectionError::io(dir, err))?;
        }

        let prefix = format!(
            "{}_{}_{}",
            deployment.device,
            to_zulu(outcome.window.begin),
            to_zulu(outcome.window.end)
        );
        let mut report = PersistReport {
            background_table: self
                .intervals_dir
                .join(format!("{prefix}_exclusion_intervals.csv")),
            scenario_table: self
                .intervals_dir
                .join(format!("{prefix}_inclusion_intervals.csv")),
            ..Default::default()
        };

        let background = outcome.intervals(IntervalKind::Background);
        let mut writer = Writer::from_path(&report.background_table)?;
        writer.write_record(["exclusion_radius", "begin", "end"])?;
        for interval in &background {
            writer.write_record([
                format!("{:05}", interval.level.exclusion),
                to_zulu(interval.begin),
                to_zulu(interval.end),
            ])?;
        }
        writer.flush().map_err(|err| DetectionError::io(&report.background_table, err))?;

        let scenario = outcome.intervals(IntervalKind::Scenario);
        let mut writer = Writer::from_path(&report.scenario_table)?;
        writer.write_record(["inclusion_radius", "exclusion_radius", "begin", "end"])?;
        for interval in &scenario {
            writer.write_record([
                format!("{:05}", interval.level.inclusion),
                format!("{:05}", interval.level.exclusion),
                to_zulu(interval.begin),
                to_zulu(interval.end),
            ])?;
        }
        writer.flush().map_err(|err| DetectionError::io(&report.scenario_table, err))?;

        for interval in background.iter().chain(&scenario) {
            let path = self.snapshot_path(deployment, interval);
            let rows = timeline.slice(interval.begin - self.padding, interval.end + self.padding);
            TimelineSnapshot::from_reports(rows).write(&path)?;
            report.snapshots_written += 1;
            if rows.is_empty() {
                observer.snapshot_flagged(interval, &path);
                report.flagged.push(*interval);
            }
        }

        Ok(report)
    }

    pub fn snapshot_path(&self, deployment: &Deployment, interval: &PersistedInterval) -> PathBuf {
        self.snapshots_dir.join(deployment.key()).join(format!(
            "{}_{}_interval_data.bin",
            to_zulu(interval.begin),
            to_zulu(interval.end)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ais_interface::PositionReport;
    use crate::math::GeoPoint;
    use crate::prelude::{DetectorConfig, RadiusLevel};
    use crate::processing::pipeline::DeploymentPass;
    use crate::telemetry::SilentObserver;
    use chrono::{TimeZone, Utc};
    use std::fs;
    use tempfile::tempdir;

    fn deployment() -> Deployment {
        Deployment {
            device: "ICLISTENHF1251".into(),
            reference: GeoPoint::new(49.0, -123.0),
            begin: Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2019, 1, 1, 12, 0, 0).unwrap(),
            depth: None,
            location: String::new(),
        }
    }

    fn nearby_vessel() -> Timeline {
        let start = deployment().begin + Duration::minutes(60);
        Timeline::from_reports(
            (0..30)
                .map(|step| {
                    PositionReport::new(7, -123.0, 49.0, start + Duration::seconds(step * 20))
                        .with_distance(250.0)
                })
                .collect(),
        )
    }

    #[test]
    fn writes_tables_and_padded_snapshots() {
        let dir = tempdir().unwrap();
        let config = DetectorConfig::default();
        let timeline = nearby_vessel();
        let outcome = DeploymentPass::new(&config, &SilentObserver)
            .detect(&deployment(), &timeline)
            .unwrap();

        let persister = IntervalPersister::new(
            &dir.path().join("intervals"),
            &dir.path().join("snapshots"),
            config.snapshot_padding(),
        );
        let report = persister
            .persist(&deployment(), &outcome, &timeline, &SilentObserver)
            .unwrap();

        let scenario_csv = fs::read_to_string(&report.scenario_table).unwrap();
        let lines: Vec<_> = scenario_csv.lines().collect();
        assert_eq!(lines[0], "inclusion_radius,exclusion_radius,begin,end");
        assert_eq!(lines[1], "10000,12000,20190101T010000.000Z,20190101T011000.000Z");
        assert!(report
            .scenario_table
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("ICLISTENHF1251_20190101T000000.000Z_20190102T000000.000Z"));

        let background_csv = fs::read_to_string(&report.background_table).unwrap();
        assert!(background_csv.starts_with("exclusion_radius,begin,end\n12000,"));

        let scenario = outcome.intervals(IntervalKind::Scenario)[0];
        let snapshot = TimelineSnapshot::read(&persister.snapshot_path(&deployment(), &scenario)).unwrap();
        assert_eq!(snapshot.len(), 30);
        assert_eq!(
            report.snapshots_written,
            outcome.intervals(IntervalKind::Background).len() + 1
        );
    }

    #[test]
    fn padding_reaches_neighbouring_buckets() {
        let dir = tempdir().unwrap();
        let timeline = nearby_vessel();
        let persister = IntervalPersister::new(dir.path(), dir.path(), Duration::minutes(1));
        let after = |begin: i64| PersistedInterval {
            kind: IntervalKind::Background,
            level: RadiusLevel::new(1_000, 2_000),
            begin: deployment().begin + Duration::minutes(begin),
            end: deployment().begin + Duration::minutes(100),
        };

        // last report sits at 01:09:40, so one minute of padding reaches back into the vessel's bucket
        let touching = after(70);
        let rows = timeline.slice(
            touching.begin - persister.padding,
            touching.end + persister.padding,
        );
        assert_eq!(rows.len(), 3);

        let clear = after(71);
        assert!(timeline
            .slice(clear.begin - persister.padding, clear.end + persister.padding)
            .is_empty());
    }

    #[test]
    fn empty_slices_are_flagged_not_fatal() {
        let dir = tempdir().unwrap();
        let config = DetectorConfig::default();
        let timeline = Timeline::default();
        let outcome = DeploymentPass::new(&config, &SilentObserver)
            .detect(&deployment(), &timeline)
            .unwrap();
        let persister =
            IntervalPersister::new(dir.path(), &dir.path().join("snapshots"), config.snapshot_padding());
        let report = persister
            .persist(&deployment(), &outcome, &timeline, &SilentObserver)
            .unwrap();

        assert_eq!(report.flagged.len(), 1);
        let path = persister.snapshot_path(&deployment(), &report.flagged[0]);
        assert!(TimelineSnapshot::read(&path).unwrap().is_empty());
    }

    #[test]
    fn overlapping_deployments_keep_separate_snapshots() {
        let dir = tempdir().unwrap();
        let config = DetectorConfig::default();
        let timeline = nearby_vessel();
        let outcome = DeploymentPass::new(&config, &SilentObserver)
            .detect(&deployment(), &timeline)
            .unwrap();
        let persister = IntervalPersister::new(
            &dir.path().join("intervals"),
            &dir.path().join("snapshots"),
            config.snapshot_padding(),
        );
        let neighbour = Deployment {
            device: "ICLISTENHF1252".into(),
            ..deployment()
        };
        persister
            .persist(&deployment(), &outcome, &timeline, &SilentObserver)
            .unwrap();
        persister
            .persist(&neighbour, &outcome, &Timeline::default(), &SilentObserver)
            .unwrap();

        let scenario = outcome.intervals(IntervalKind::Scenario)[0];
        let own = persister.snapshot_path(&deployment(), &scenario);
        let other = persister.snapshot_path(&neighbour, &scenario);
        assert_ne!(own, other);
        assert_eq!(TimelineSnapshot::read(&own).unwrap().len(), 30);
        assert!(TimelineSnapshot::read(&other).unwrap().is_empty());
    }
}
