use chrono::{DateTime, Duration, Utc};
use hydrocore::ais_interface::RawReport;
use hydrocore::math::GeoPoint;

/// A vessel crossing past the hydrophone on a straight line at constant speed.
#[derive(Debug, Clone, PartialEq)]
pub struct Transit {
    pub mmsi: u32,
    pub type_and_cargo: u16,
    /// Metres between the track and the hydrophone at the closest point.
    pub closest_approach: f64,
    /// Degrees clockwise from north.
    pub heading: f64,
    /// Metres per second.
    pub speed: f64,
    pub start: DateTime<Utc>,
    pub duration: Duration,
}

impl Transit {
    /// Reports every `interval` seconds; the closest approach falls halfway through.
    /// Only the first report carries the vessel type.
    pub fn reports(&self, hydrophone: GeoPoint, interval: i64) -> Vec<RawReport> {
        let interval = interval.max(1);
        let abeam = hydrophone.offset((self.heading + 90.0).rem_euclid(360.0), self.closest_approach);
        let half_track = self.speed * self.duration.num_seconds() as f64 / 2.0;
        let origin = abeam.offset((self.heading + 180.0).rem_euclid(360.0), half_track);

        (0..=self.duration.num_seconds() / interval)
            .map(|step| {
                let elapsed = step * interval;
                let position = origin.offset(self.heading, self.speed * elapsed as f64);
                RawReport {
                    mmsi: self.mmsi,
                    x: Some(position.longitude),
                    y: Some(position.latitude),
                    ais_timestamp: self.start + Duration::seconds(elapsed),
                    type_and_cargo: (step == 0).then_some(self.type_and_cargo),
                }
            })
            .collect()
    }
}
