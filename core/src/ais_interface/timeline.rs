use super::deployment::DeploymentWindow;
use super::report::{Mmsi, PositionReport};
use crate::prelude::{DetectionError, DetectionResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Column-oriented on-disk form of a run of annotated reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineSnapshot {
    pub mmsi: Vec<Mmsi>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub timestamp_ms: Vec<i64>,
    pub type_and_cargo: Vec<Option<u16>>,
    pub distance_to_hydrophone: Vec<Option<f64>>,
}

impl TimelineSnapshot {
    pub fn from_reports(reports: &[PositionReport]) -> Self {
        let mut snapshot = Self::default();
        for report in reports {
            snapshot.mmsi.push(report.mmsi);
            snapshot.x.push(report.x);
            snapshot.y.push(report.y);
            snapshot.timestamp_ms.push(report.timestamp.timestamp_millis());
            snapshot.type_and_cargo.push(report.type_and_cargo);
            snapshot
                .distance_to_hydrophone
                .push(report.distance_to_hydrophone);
        }
        snapshot
    }

    pub fn len(&self) -> usize {
        self.mmsi.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mmsi.is_empty()
    }

    pub fn into_reports(self) -> DetectionResult<Vec<PositionReport>> {
        let rows = self.len();
        if [
            self.x.len(),
            self.y.len(),
            self.timestamp_ms.len(),
            self.type_and_cargo.len(),
            self.distance_to_hydrophone.len(),
        ]
        .iter()
        .any(|&len| len != rows)
        {
            return Err(DetectionError::CorruptSnapshot(format!(
                "{rows} rows but column lengths differ"
            )));
        }

        let mut reports = Vec::with_capacity(rows);
        for row in 0..rows {
            let millis = self.timestamp_ms[row];
            let timestamp = DateTime::<Utc>::from_timestamp_millis(millis)
                .ok_or_else(|| DetectionError::Timestamp(millis.to_string()))?;
            reports.push(PositionReport {
                mmsi: self.mmsi[row],
                x: self.x[row],
                y: self.y[row],
                timestamp,
                type_and_cargo: self.type_and_cargo[row],
                distance_to_hydrophone: self.distance_to_hydrophone[row],
            });
        }
        Ok(reports)
    }

    pub fn write(&self, path: &Path) -> DetectionResult<()> {
        let file = File::create(path).map_err(|err| DetectionError::io(path, err))?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, self)?;
        writer.flush().map_err(|err| DetectionError::io(path, err))
    }

    pub fn read(path: &Path) -> DetectionResult<Self> {
        let file = File::open(path).map_err(|err| DetectionError::io(path, err))?;
        Ok(bincode::deserialize_from(BufReader::new(file))?)
    }
}

/// A deployment's annotated reports, sorted by timestamp.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    reports: Vec<PositionReport>,
}

impl Timeline {
    pub fn from_reports(mut reports: Vec<PositionReport>) -> Self {
        reports.sort_by_key(|report| report.timestamp);
        Self { reports }
    }

    /// Concatenates snapshot files, keeping only reports inside `window`.
    pub fn load<P: AsRef<Path>>(paths: &[P], window: &DeploymentWindow) -> DetectionResult<Self> {
        let mut reports = Vec::new();
        for path in paths {
            let snapshot = TimelineSnapshot::read(path.as_ref())?;
            reports.extend(
                snapshot
                    .into_reports()?
                    .into_iter()
                    .filter(|report| window.contains(report.timestamp)),
            );
        }
        Ok(Self::from_reports(reports))
    }

    pub fn reports(&self) -> &[PositionReport] {
        &self.reports
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Reports with `from <= timestamp <= to`.
    pub fn slice(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> &[PositionReport] {
        let start = self.reports.partition_point(|report| report.timestamp < from);
        let stop = self.reports.partition_point(|report| report.timestamp <= to);
        &self.reports[start..stop.max(start)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use tempfile::tempdir;

    fn report_at(minute: i64) -> PositionReport {
        let base = Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap();
        PositionReport::new(316_000_001, -123.0, 49.0, base + Duration::minutes(minute))
            .with_distance(minute as f64 * 10.0)
    }

    #[test]
    fn snapshot_survives_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("day_cleaned.bin");
        let mut reports = vec![report_at(0), report_at(1)];
        reports[1].type_and_cargo = Some(70);
        reports[1].distance_to_hydrophone = None;

        TimelineSnapshot::from_reports(&reports).write(&path).unwrap();
        let restored = TimelineSnapshot::read(&path).unwrap().into_reports().unwrap();
        assert_eq!(restored, reports);
    }

    #[test]
    fn ragged_snapshot_is_rejected() {
        let mut snapshot = TimelineSnapshot::from_reports(&[report_at(0)]);
        snapshot.x.clear();
        assert!(snapshot.into_reports().is_err());
    }

    #[test]
    fn slice_is_inclusive_on_both_ends() {
        let timeline = Timeline::from_reports((0..10).rev().map(report_at).collect());
        let from = report_at(2).timestamp;
        let to = report_at(5).timestamp;
        let slice = timeline.slice(from, to);
        assert_eq!(slice.len(), 4);
        assert_eq!(slice[0].timestamp, from);
        assert!(timeline.slice(to, from).is_empty());
    }

    #[test]
    fn load_filters_to_window() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a_cleaned.bin");
        let mut outside = report_at(0);
        outside.timestamp = outside.timestamp - Duration::days(1);
        TimelineSnapshot::from_reports(&[report_at(3), outside])
            .write(&path)
            .unwrap();

        let window = DeploymentWindow {
            begin: Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2019, 1, 2, 0, 0, 0).unwrap(),
        };
        let timeline = Timeline::load(&[path], &window).unwrap();
        assert_eq!(timeline.len(), 1);
    }
}
