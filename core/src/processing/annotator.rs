use crate::ais_interface::PositionReport;
use crate::math::{CoarseBound, GeoPoint};
use crate::prelude::DetectorConfig;

/// Outcome of locating one report relative to the hydrophone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Proximity {
    /// A coordinate is missing or not a number.
    Undefined,
    OutOfRange,
    Within(f64),
}

impl Proximity {
    pub fn distance(self) -> Option<f64> {
        match self {
            Proximity::Within(distance) => Some(distance),
            _ => None,
        }
    }
}

/// Tally of how many reports each filter stage handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnotationStats {
    pub undefined: usize,
    pub prefiltered: usize,
    pub geodesic: usize,
    pub within: usize,
}

impl AnnotationStats {
    fn record(&mut self, proximity: Proximity, geodesic: bool) {
        if geodesic {
            self.geodesic += 1;
        }
        match proximity {
            Proximity::Undefined => self.undefined += 1,
            Proximity::OutOfRange if !geodesic => self.prefiltered += 1,
            Proximity::OutOfRange => {}
            Proximity::Within(_) => self.within += 1,
        }
    }
}

/// Two-stage distance filter around a fixed reference point.
#[derive(Debug, Clone)]
pub struct DistanceAnnotator {
    reference: GeoPoint,
    inclusion_radius: u32,
    bound: CoarseBound,
}

impl DistanceAnnotator {
    pub fn new(reference: GeoPoint, inclusion_radius: u32, coarse_offset: f64) -> Self {
        Self {
            reference,
            inclusion_radius,
            bound: CoarseBound::around(reference, coarse_offset),
        }
    }

    pub fn from_config(reference: GeoPoint, config: &DetectorConfig) -> Self {
        Self::new(reference, config.annotation_radius, config.coarse_offset())
    }

    pub fn bound(&self) -> &CoarseBound {
        &self.bound
    }

    /// Classifies a longitude/latitude pair.
    pub fn proximity(&self, x: Option<f64>, y: Option<f64>) -> Proximity {
        self.evaluate(x, y).0
    }

    fn evaluate(&self, x: Option<f64>, y: Option<f64>) -> (Proximity, bool) {
        let (Some(x), Some(y)) = (x, y) else {
            return (Proximity::Undefined, false);
        };
        if x.is_nan() || y.is_nan() {
            return (Proximity::Undefined, false);
        }

        let point = GeoPoint::new(y, x);
        if !self.bound.contains(point) {
            return (Proximity::OutOfRange, false);
        }

        let distance = self.reference.geodesic_distance(point);
        if distance.ceil() > f64::from(self.inclusion_radius) {
            (Proximity::OutOfRange, true)
        } else {
            (Proximity::Within(distance), true)
        }
    }

    /// Overwrites each report's distance and returns the per-stage tally.
    pub fn annotate(&self, reports: &mut [PositionReport]) -> AnnotationStats {
        let mut stats = AnnotationStats::default();
        for report in reports.iter_mut() {
            let (proximity, geodesic) = self.evaluate(Some(report.x), Some(report.y));
            stats.record(proximity, geodesic);
            report.distance_to_hydrophone = proximity.distance();
        }
        stats
    }

    /// Annotates and keeps only the reports inside the inclusion radius.
    pub fn annotate_in_range(
        &self,
        mut reports: Vec<PositionReport>,
    ) -> (Vec<PositionReport>, AnnotationStats) {
        let stats = self.annotate(&mut reports);
        reports.retain(|report| report.distance_to_hydrophone.is_some());
        (reports, stats)
    }
}
