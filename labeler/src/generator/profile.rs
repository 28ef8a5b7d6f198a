use super::template::Transit;
use crate::workflow::config::WorkingLayout;
use anyhow::Context;
use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};
use hydrocore::ais_interface::{to_zulu, RawReport};
use hydrocore::math::GeoPoint;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Configuration for generating a synthetic working directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    pub seed: u64,
    pub device: String,
    pub hydrophone: GeoPoint,
    pub start: DateTime<Utc>,
    pub days: u32,
    pub vessels_per_day: u32,
    pub report_interval_seconds: i64,
    /// Vessels far outside any zone, exercising the rectangular prefilter.
    pub distant_vessels_per_day: u32,
    pub depth: f64,
    pub location: String,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            device: "SYNTHETICHF0001".into(),
            hydrophone: GeoPoint::new(48.65, -123.48),
            start: Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).single().unwrap_or_default(),
            days: 2,
            vessels_per_day: 6,
            report_interval_seconds: 20,
            distant_vessels_per_day: 2,
            depth: 150.0,
            location: "Synthetic Passage".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyntheticSummary {
    pub deployment_file: PathBuf,
    pub parsed_files: Vec<PathBuf>,
    pub reports: usize,
}

fn day_reports(config: &SyntheticConfig, day: u32, rng: &mut StdRng) -> Vec<RawReport> {
    let day_start = config.start + Duration::days(i64::from(day));
    let mut reports = Vec::new();

    for vessel in 0..config.vessels_per_day {
        let transit = Transit {
            mmsi: 316_000_000 + day * 1_000 + vessel,
            type_and_cargo: rng.gen_range(60..90),
            closest_approach: rng.gen_range(300.0..14_000.0),
            heading: rng.gen_range(0.0..360.0),
            speed: rng.gen_range(3.0..9.0),
            start: day_start + Duration::seconds(rng.gen_range(0..20 * 3_600)),
            duration: Duration::minutes(rng.gen_range(30..120)),
        };
        reports.extend(transit.reports(config.hydrophone, config.report_interval_seconds));
    }

    for vessel in 0..config.distant_vessels_per_day {
        let far_away = config.hydrophone.offset(rng.gen_range(0.0..360.0), 150_000.0);
        let transit = Transit {
            mmsi: 367_000_000 + day * 1_000 + vessel,
            type_and_cargo: 30,
            closest_approach: 0.0,
            heading: rng.gen_range(0.0..360.0),
            speed: 6.0,
            start: day_start + Duration::seconds(rng.gen_range(0..20 * 3_600)),
            duration: Duration::minutes(90),
        };
        reports.extend(transit.reports(far_away, config.report_interval_seconds));
    }

    // an exact repeat and a report without a position
    if let Some(first) = reports.first().cloned() {
        reports.push(first.clone());
        reports.push(RawReport {
            x: None,
            y: None,
            ..first
        });
    }
    reports
}

/// Writes a deployment descriptor and one parsed file per day under `layout`.
pub fn generate_working_directory(
    layout: &WorkingLayout,
    config: &SyntheticConfig,
) -> anyhow::Result<SyntheticSummary> {
    layout.ensure()?;
    let mut rng = StdRng::seed_from_u64(config.seed);

    let deployment_file = layout.deployments.join(format!("{}.csv", config.device));
    let end = config.start + Duration::days(i64::from(config.days.max(1))) - Duration::hours(1);
    let descriptor = format!(
        "begin,end,latitude,longitude,depth,location\n{},{},{},{},{},{}\n",
        config.start.to_rfc3339_opts(SecondsFormat::Millis, true),
        end.to_rfc3339_opts(SecondsFormat::Millis, true),
        config.hydrophone.latitude,
        config.hydrophone.longitude,
        config.depth,
        config.location
    );
    fs::write(&deployment_file, descriptor)
        .with_context(|| format!("writing {}", deployment_file.display()))?;

    let mut summary = SyntheticSummary {
        deployment_file,
        ..Default::default()
    };
    for day in 0..config.days {
        let reports = day_reports(config, day, &mut rng);
        let day_start = config.start + Duration::days(i64::from(day));
        let path = layout
            .parsed
            .join(format!("AISSTATION_{}_parsed.json", to_zulu(day_start)));
        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &reports)
            .with_context(|| format!("writing {}", path.display()))?;
        writer
            .flush()
            .with_context(|| format!("flushing {}", path.display()))?;
        summary.reports += reports.len();
        summary.parsed_files.push(path);
    }

    Ok(summary)
}
