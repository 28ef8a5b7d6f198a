use super::model::ZoneMap;
use anyhow::Context;
use hydrocore::ais_interface::IntervalKind;
use hydrocore::math::GeoPoint;
use hydrocore::prelude::RadiusLevel;
use hydrocore::telemetry::ZoneMapHook;
use log::{debug, warn};
use std::cell::Cell;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes one GeoJSON document per zone the first time it is classified.
pub struct GeoJsonZoneWriter {
    directory: PathBuf,
    device: String,
    written: Cell<usize>,
}

impl GeoJsonZoneWriter {
    pub fn new(directory: &Path, device: &str) -> Self {
        Self {
            directory: directory.to_path_buf(),
            device: device.to_string(),
            written: Cell::new(0),
        }
    }

    pub fn written(&self) -> usize {
        self.written.get()
    }

    pub fn file_name(level: RadiusLevel, kind: IntervalKind) -> String {
        match kind {
            IntervalKind::Background => {
                format!("exclusion_radius_{:05}_metres.geojson", level.exclusion)
            }
            IntervalKind::Scenario => format!(
                "inclusion_radius_{:05}_metres_exclusion_radius_{:05}_metres.geojson",
                level.inclusion, level.exclusion
            ),
        }
    }

    fn write(&self, map: &ZoneMap, path: &Path) -> anyhow::Result<()> {
        fs::create_dir_all(&self.directory)
            .with_context(|| format!("creating {}", self.directory.display()))?;
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &map.to_geojson())
            .with_context(|| format!("writing {}", path.display()))?;
        writer
            .flush()
            .with_context(|| format!("flushing {}", path.display()))
    }
}

impl ZoneMapHook for GeoJsonZoneWriter {
    fn zone_first_seen(&self, center: GeoPoint, level: RadiusLevel, kind: IntervalKind) {
        let rings = match kind {
            IntervalKind::Background => vec![("exclusion", level.exclusion)],
            IntervalKind::Scenario => vec![
                ("inclusion", level.inclusion),
                ("exclusion", level.exclusion),
            ],
        };
        let map = ZoneMap {
            device: self.device.clone(),
            center,
            rings,
        };
        let path = self.directory.join(Self::file_name(level, kind));
        match self.write(&map, &path) {
            Ok(()) => {
                self.written.set(self.written.get() + 1);
                debug!("zone map {}", path.display());
            }
            Err(err) => warn!("zone map for {} not written: {:#}", self.device, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn names_follow_zone_radii() {
        let level = RadiusLevel::new(5_000, 2_000);
        assert_eq!(
            GeoJsonZoneWriter::file_name(level, IntervalKind::Background),
            "exclusion_radius_07000_metres.geojson"
        );
        assert_eq!(
            GeoJsonZoneWriter::file_name(level, IntervalKind::Scenario),
            "inclusion_radius_05000_metres_exclusion_radius_07000_metres.geojson"
        );
    }

    #[test]
    fn writes_geojson_document() {
        let dir = tempdir().unwrap();
        let maps = dir.path().join("ICLISTENHF1251");
        let writer = GeoJsonZoneWriter::new(&maps, "ICLISTENHF1251");
        writer.zone_first_seen(
            GeoPoint::new(49.0, -123.0),
            RadiusLevel::new(1_000, 2_000),
            IntervalKind::Scenario,
        );

        assert_eq!(writer.written(), 1);
        let text = fs::read_to_string(maps.join(
            "inclusion_radius_01000_metres_exclusion_radius_03000_metres.geojson",
        ))
        .unwrap();
        let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(doc["features"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn unwritable_directory_is_logged_not_fatal() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("occupied");
        fs::write(&blocker, "file in the way").unwrap();
        let writer = GeoJsonZoneWriter::new(&blocker, "ICLISTENHF1251");
        writer.zone_first_seen(
            GeoPoint::new(49.0, -123.0),
            RadiusLevel::new(1_000, 2_000),
            IntervalKind::Background,
        );
        assert_eq!(writer.written(), 0);
    }
}
