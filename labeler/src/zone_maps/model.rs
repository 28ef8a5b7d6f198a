use hydrocore::math::GeoPoint;
use serde_json::{json, Value};

const RING_VERTICES: usize = 72;

/// Hydrophone position plus the named rings drawn around it.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneMap {
    pub device: String,
    pub center: GeoPoint,
    pub rings: Vec<(&'static str, u32)>,
}

impl ZoneMap {
    pub fn to_geojson(&self) -> Value {
        let mut features = vec![json!({
            "type": "Feature",
            "properties": { "name": "hydrophone", "device": self.device },
            "geometry": {
                "type": "Point",
                "coordinates": [self.center.longitude, self.center.latitude]
            }
        })];
        for (name, radius) in &self.rings {
            features.push(json!({
                "type": "Feature",
                "properties": { "name": name, "radius_metres": radius },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [circle_ring(self.center, f64::from(*radius))]
                }
            }));
        }
        json!({ "type": "FeatureCollection", "features": features })
    }
}

/// Closed `[lon, lat]` ring approximating a geodesic circle.
pub fn circle_ring(center: GeoPoint, radius: f64) -> Vec<[f64; 2]> {
    let step = 360.0 / RING_VERTICES as f64;
    let mut ring: Vec<[f64; 2]> = (0..RING_VERTICES)
        .map(|index| {
            let vertex = center.offset(index as f64 * step, radius);
            [vertex.longitude, vertex.latitude]
        })
        .collect();
    if let Some(&first) = ring.first() {
        ring.push(first);
    }
    ring
}
