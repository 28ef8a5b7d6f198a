use super::zulu::to_zulu;
use crate::math::GeoPoint;
use crate::prelude::{DetectionError, DetectionResult};
use chrono::{DateTime, Duration, Timelike, Utc};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// One row of a `<device>.csv` deployment descriptor.
#[derive(Debug, Clone, Deserialize)]
struct DescriptorRow {
    begin: DateTime<Utc>,
    end: DateTime<Utc>,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    depth: Option<f64>,
    #[serde(default)]
    location: String,
}

/// A hydrophone placed at a fixed reference point for a validity interval.
#[derive(Debug, Clone, PartialEq)]
pub struct Deployment {
    pub device: String,
    pub reference: GeoPoint,
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub depth: Option<f64>,
    pub location: String,
}

/// Day-aligned processing window `[begin, end)` covering a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeploymentWindow {
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DeploymentWindow {
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.begin <= timestamp && timestamp < self.end
    }

    pub fn days(&self) -> f64 {
        (self.end - self.begin).num_seconds() as f64 / 86_400.0
    }
}

/// Truncates a timestamp to midnight UTC of the same day.
pub fn start_of_day(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    timestamp
        - Duration::seconds(i64::from(timestamp.num_seconds_from_midnight()))
        - Duration::nanoseconds(i64::from(timestamp.nanosecond()))
}

impl Deployment {
    /// Window from midnight of the first day to midnight after the last day.
    pub fn window(&self) -> DeploymentWindow {
        DeploymentWindow {
            begin: start_of_day(self.begin),
            end: start_of_day(self.end) + Duration::days(1),
        }
    }

    /// `<device>_<begin>`; distinguishes deployments whose windows overlap.
    pub fn key(&self) -> String {
        format!("{}_{}", self.device, to_zulu(self.begin))
    }
}

/// Reads every `*.csv` descriptor in `directory`; the file stem is the device id.
pub fn load_deployments(directory: &Path) -> DetectionResult<Vec<Deployment>> {
    let entries = fs::read_dir(directory).map_err(|err| DetectionError::io(directory, err))?;
    let mut deployments = Vec::new();

    for entry in entries {
        let path = entry.map_err(|err| DetectionError::io(directory, err))?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("csv") {
            continue;
        }
        let Some(device) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        deployments.extend(read_descriptor(&path, device)?);
    }

    deployments.sort_by(|a, b| a.device.cmp(&b.device).then(a.begin.cmp(&b.begin)));
    Ok(deployments)
}

fn read_descriptor(path: &Path, device: &str) -> DetectionResult<Vec<Deployment>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut deployments = Vec::new();
    for row in reader.deserialize::<DescriptorRow>() {
        let row = row?;
        deployments.push(Deployment {
            device: device.to_string(),
            reference: GeoPoint::new(row.latitude, row.longitude),
            begin: row.begin,
            end: row.end,
            depth: row.depth,
            location: row.location,
        });
    }
    Ok(deployments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn window_spans_whole_days() {
        let deployment = Deployment {
            device: "ICLISTENHF1251".into(),
            reference: GeoPoint::new(49.0, -123.0),
            begin: Utc.with_ymd_and_hms(2019, 1, 1, 13, 20, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2019, 1, 3, 1, 0, 0).unwrap(),
            depth: None,
            location: String::new(),
        };
        let window = deployment.window();
        assert_eq!(window.begin, Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2019, 1, 4, 0, 0, 0).unwrap());
        assert_eq!(window.days(), 3.0);
        assert!(!window.contains(window.end));
        assert_eq!(deployment.key(), "ICLISTENHF1251_20190101T132000.000Z");
    }

    #[test]
    fn loads_descriptor_directory() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("ICLISTENHF1251.csv"),
            "begin,end,latitude,longitude,depth,location\n\
             2019-01-01T00:00:00.000Z,2019-01-05T12:00:00.000Z,49.04,-123.31,170.0,SEVIP\n",
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let deployments = load_deployments(dir.path()).unwrap();
        assert_eq!(deployments.len(), 1);
        assert_eq!(deployments[0].device, "ICLISTENHF1251");
        assert_eq!(deployments[0].reference.latitude, 49.04);
        assert_eq!(deployments[0].depth, Some(170.0));
        assert_eq!(deployments[0].location, "SEVIP");
    }
}
