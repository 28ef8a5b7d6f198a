use crate::ais_interface::{PositionReport, RawReport};
use std::collections::HashSet;

/// Prepares a file's raw reports for annotation.
///
/// Reports are ordered by vessel then time, `type_and_cargo` is carried
/// forward within each vessel, reports without coordinates are dropped, and
/// exact repeats are collapsed onto their first occurrence.
pub fn normalize(mut raw: Vec<RawReport>) -> Vec<PositionReport> {
    raw.sort_by(|a, b| {
        a.mmsi
            .cmp(&b.mmsi)
            .then(a.ais_timestamp.cmp(&b.ais_timestamp))
    });

    let mut last_vessel = None;
    let mut last_type = None;
    for report in raw.iter_mut() {
        if last_vessel != Some(report.mmsi) {
            last_vessel = Some(report.mmsi);
            last_type = None;
        }
        match report.type_and_cargo {
            Some(code) => last_type = Some(code),
            None => report.type_and_cargo = last_type,
        }
    }

    let mut seen = HashSet::new();
    raw.into_iter()
        .filter_map(|report| {
            let (x, y) = (report.x?, report.y?);
            let key = (
                report.mmsi,
                x.to_bits(),
                y.to_bits(),
                report.ais_timestamp,
                report.type_and_cargo,
            );
            seen.insert(key).then(|| PositionReport {
                mmsi: report.mmsi,
                x,
                y,
                timestamp: report.ais_timestamp,
                type_and_cargo: report.type_and_cargo,
                distance_to_hydrophone: None,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn raw(mmsi: u32, second: i64, coords: Option<(f64, f64)>, kind: Option<u16>) -> RawReport {
        RawReport {
            mmsi,
            x: coords.map(|c| c.0),
            y: coords.map(|c| c.1),
            ais_timestamp: Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap()
                + Duration::seconds(second),
            type_and_cargo: kind,
        }
    }

    #[test]
    fn fills_vessel_type_forward_per_vessel() {
        let reports = normalize(vec![
            raw(2, 5, Some((-123.0, 49.0)), None),
            raw(1, 1, Some((-123.0, 49.0)), Some(70)),
            raw(1, 2, Some((-123.1, 49.0)), None),
            raw(2, 1, Some((-123.0, 49.1)), Some(30)),
        ]);
        let kinds: Vec<_> = reports.iter().map(|r| (r.mmsi, r.type_and_cargo)).collect();
        assert_eq!(
            kinds,
            vec![(1, Some(70)), (1, Some(70)), (2, Some(30)), (2, Some(30))]
        );
    }

    #[test]
    fn type_does_not_leak_across_vessels() {
        let reports = normalize(vec![
            raw(1, 1, Some((-123.0, 49.0)), Some(70)),
            raw(2, 2, Some((-123.0, 49.0)), None),
        ]);
        assert_eq!(reports[1].type_and_cargo, None);
    }

    #[test]
    fn drops_reports_without_coordinates() {
        let reports = normalize(vec![
            raw(1, 1, None, Some(70)),
            raw(1, 2, Some((-123.0, 49.0)), None),
        ]);
        assert_eq!(reports.len(), 1);
        // The dropped report still seeds the forward fill.
        assert_eq!(reports[0].type_and_cargo, Some(70));
    }

    #[test]
    fn collapses_exact_duplicates() {
        let reports = normalize(vec![
            raw(1, 1, Some((-123.0, 49.0)), Some(70)),
            raw(1, 1, Some((-123.0, 49.0)), Some(70)),
            raw(1, 1, Some((-123.0, 49.5)), Some(70)),
        ]);
        assert_eq!(reports.len(), 2);
    }
}
