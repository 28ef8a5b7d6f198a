use geo::{Destination, Distance, Geodesic, Point};
use serde::{Deserialize, Serialize};

const WGS84_SEMI_MAJOR_AXIS: f64 = 6_378_137.0;
const WGS84_ECCENTRICITY_SQUARED: f64 = 6.694_379_990_14e-3;

/// Latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    fn to_point(self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }

    /// Geodesic (WGS84) distance in metres.
    pub fn geodesic_distance(self, other: GeoPoint) -> f64 {
        Geodesic::distance(self.to_point(), other.to_point())
    }

    /// Point reached by travelling `distance` metres on `bearing` degrees from here.
    pub fn offset(self, bearing: f64, distance: f64) -> GeoPoint {
        let point = Geodesic::destination(self.to_point(), bearing, distance);
        GeoPoint::new(point.y(), point.x())
    }
}

/// Axis-aligned lat/lon rectangle that contains every point within a given
/// geodesic distance of its centre.
///
/// `west` and `east` may run past ±180°; longitudes are compared modulo 360°.
/// A rectangle whose disk reaches a pole spans every longitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoarseBound {
    pub south: f64,
    pub north: f64,
    pub west: f64,
    pub east: f64,
}

impl CoarseBound {
    /// Builds the rectangle from the local radii of curvature. Each half-width
    /// is taken where a degree is shortest: the meridional radius at the
    /// equatorward edge and the parallel circle at the poleward edge.
    pub fn around(center: GeoPoint, offset_metres: f64) -> Self {
        let nominal = (offset_metres / meridional_radius(center.latitude)).to_degrees();
        let equatorward = (center.latitude.abs() - nominal).max(0.0);
        let latitude_offset = (offset_metres / meridional_radius(equatorward)).to_degrees();

        let poleward = center.latitude.abs() + latitude_offset;
        let longitude_offset = if poleward >= 90.0 {
            180.0
        } else {
            let parallel = prime_vertical_radius(center.latitude) * poleward.to_radians().cos();
            (offset_metres / parallel).to_degrees().min(180.0)
        };

        Self {
            south: center.latitude - latitude_offset,
            north: center.latitude + latitude_offset,
            west: center.longitude - longitude_offset,
            east: center.longitude + longitude_offset,
        }
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        if !(self.south..=self.north).contains(&point.latitude) {
            return false;
        }
        let half_width = (self.east - self.west) / 2.0;
        if half_width >= 180.0 {
            return true;
        }
        let middle = (self.west + self.east) / 2.0;
        let delta = (point.longitude - middle + 180.0).rem_euclid(360.0) - 180.0;
        delta.abs() <= half_width
    }
}

fn curvature_denominator(latitude: f64) -> f64 {
    (1.0 - WGS84_ECCENTRICITY_SQUARED * latitude.to_radians().sin().powi(2)).sqrt()
}

fn meridional_radius(latitude: f64) -> f64 {
    WGS84_SEMI_MAJOR_AXIS * (1.0 - WGS84_ECCENTRICITY_SQUARED)
        / curvature_denominator(latitude).powi(3)
}

fn prime_vertical_radius(latitude: f64) -> f64 {
    WGS84_SEMI_MAJOR_AXIS / curvature_denominator(latitude)
}
