use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type Mmsi = u32;

/// Position report as emitted by the upstream parser; coordinates may be absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReport {
    pub mmsi: Mmsi,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    pub ais_timestamp: DateTime<Utc>,
    #[serde(default)]
    pub type_and_cargo: Option<u16>,
}

/// Normalized position report. `x` is longitude and `y` latitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionReport {
    pub mmsi: Mmsi,
    pub x: f64,
    pub y: f64,
    pub timestamp: DateTime<Utc>,
    pub type_and_cargo: Option<u16>,
    /// Metres to the hydrophone; `None` when undefined or beyond the annotation radius.
    pub distance_to_hydrophone: Option<f64>,
}

impl PositionReport {
    pub fn new(mmsi: Mmsi, x: f64, y: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            mmsi,
            x,
            y,
            timestamp,
            type_and_cargo: None,
            distance_to_hydrophone: None,
        }
    }

    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance_to_hydrophone = Some(distance);
        self
    }

    /// True when the report has a distance no greater than `radius` metres.
    pub fn within(&self, radius: u32) -> bool {
        self.distance_to_hydrophone
            .map_or(false, |distance| distance <= f64::from(radius))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn raw_report_tolerates_missing_fields() {
        let raw: RawReport =
            serde_json::from_str(r#"{"mmsi": 316001234, "ais_timestamp": "2019-01-01T00:00:12.500Z"}"#)
                .unwrap();
        assert_eq!(raw.x, None);
        assert_eq!(raw.type_and_cargo, None);
    }

    #[test]
    fn undefined_distance_is_never_within() {
        let ts = Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap();
        let report = PositionReport::new(1, -123.0, 49.0, ts);
        assert!(!report.within(u32::MAX));
        assert!(report.with_distance(1_000.0).within(1_000));
    }
}
