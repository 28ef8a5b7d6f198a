use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const SECONDS_PER_DAY: u32 = 86_400;

/// One distance resolution: the inclusion ring and the exclusion ring around it.
///
/// Ordering is by exclusion radius first, so iterating a sorted collection in
/// reverse visits the coarsest resolution first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RadiusLevel {
    pub exclusion: u32,
    pub inclusion: u32,
}

impl RadiusLevel {
    /// The exclusion radius saturates at `u32::MAX`; `DetectorConfig::validate`
    /// rejects families that would reach it.
    pub fn new(inclusion: u32, exclusion_offset: u32) -> Self {
        Self {
            exclusion: inclusion.saturating_add(exclusion_offset),
            inclusion,
        }
    }
}

/// How a scenario bucket treats a lone vessel that straddles the inclusion ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Every report inside the exclusion ring must also be inside the inclusion ring.
    #[default]
    Strict,
    /// At least one report of the lone vessel must be inside the inclusion ring.
    AnyReportInside,
}

/// Shared configuration for annotation and interval detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub min_inclusion_radius: u32,
    pub max_inclusion_radius: u32,
    pub radius_step: u32,
    pub exclusion_offset: u32,
    pub bucket_seconds: u32,
    pub min_background_run: usize,
    pub min_scenario_run: usize,
    /// Inclusion radius applied when annotating reports; anything farther is dropped.
    pub annotation_radius: u32,
    /// Metres added to the annotation radius when sizing the rectangular prefilter.
    pub coarse_padding: f64,
    pub snapshot_padding_buckets: u32,
    pub boundary_policy: BoundaryPolicy,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_inclusion_radius: 1_000,
            max_inclusion_radius: 10_000,
            radius_step: 1_000,
            exclusion_offset: 2_000,
            bucket_seconds: 60,
            min_background_run: 30,
            min_scenario_run: 5,
            annotation_radius: 15_000,
            coarse_padding: 2_000.0,
            snapshot_padding_buckets: 1,
            boundary_policy: BoundaryPolicy::Strict,
        }
    }
}

impl DetectorConfig {
    /// Rejects configurations that cannot produce meaningful intervals.
    pub fn validate(&self) -> DetectionResult<()> {
        if self.radius_step == 0 {
            return Err(DetectionError::InvalidConfig(
                "radius_step must be positive".into(),
            ));
        }
        if self.min_inclusion_radius == 0 || self.min_inclusion_radius > self.max_inclusion_radius
        {
            return Err(DetectionError::InvalidConfig(format!(
                "empty radius family {}..={}",
                self.min_inclusion_radius, self.max_inclusion_radius
            )));
        }
        if self.min_background_run == 0 || self.min_scenario_run == 0 {
            return Err(DetectionError::InvalidConfig(
                "minimum run lengths must be at least one bucket".into(),
            ));
        }
        if self.bucket_seconds == 0 || SECONDS_PER_DAY % self.bucket_seconds != 0 {
            return Err(DetectionError::InvalidConfig(format!(
                "bucket width of {}s does not divide a day",
                self.bucket_seconds
            )));
        }
        if !self.coarse_padding.is_finite() || self.coarse_padding < 0.0 {
            return Err(DetectionError::InvalidConfig(
                "coarse_padding must be a non-negative distance".into(),
            ));
        }
        if self
            .max_inclusion_radius
            .checked_add(self.exclusion_offset)
            .is_none()
        {
            return Err(DetectionError::InvalidConfig(format!(
                "exclusion radius {} + {} overflows",
                self.max_inclusion_radius, self.exclusion_offset
            )));
        }
        if i32::try_from(self.snapshot_padding_buckets).is_err() {
            return Err(DetectionError::InvalidConfig(format!(
                "snapshot_padding_buckets {} is out of range",
                self.snapshot_padding_buckets
            )));
        }
        let widest = self
            .radius_levels()
            .last()
            .map(|level| level.exclusion)
            .unwrap_or_default();
        if self.annotation_radius < widest {
            return Err(DetectionError::InvalidConfig(format!(
                "annotation radius {} is smaller than the widest exclusion radius {}",
                self.annotation_radius, widest
            )));
        }
        Ok(())
    }

    /// All configured levels in ascending order.
    pub fn radius_levels(&self) -> Vec<RadiusLevel> {
        if self.radius_step == 0 {
            return Vec::new();
        }
        (self.min_inclusion_radius..=self.max_inclusion_radius)
            .step_by(self.radius_step as usize)
            .map(|inclusion| RadiusLevel::new(inclusion, self.exclusion_offset))
            .collect()
    }

    pub fn bucket_width(&self) -> Duration {
        Duration::seconds(i64::from(self.bucket_seconds))
    }

    pub fn snapshot_padding(&self) -> Duration {
        // validate rejects buckets wider than a day
        let bucket = i64::from(self.bucket_seconds.min(SECONDS_PER_DAY));
        Duration::seconds(bucket * i64::from(self.snapshot_padding_buckets))
    }

    /// Half-width of the rectangular prefilter used by the annotator.
    pub fn coarse_offset(&self) -> f64 {
        f64::from(self.annotation_radius) + self.coarse_padding
    }
}

/// Common error type for annotation and detection.
#[derive(thiserror::Error, Debug)]
pub enum DetectionError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("io failure on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("csv failure: {0}")]
    Csv(#[from] csv::Error),
    #[error("snapshot encoding failure: {0}")]
    Snapshot(#[from] bincode::Error),
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),
    #[error("report decoding failure: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unparseable timestamp {0:?}")]
    Timestamp(String),
    #[error("worker failure: {0}")]
    Worker(String),
}

impl DetectionError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type DetectionResult<T> = Result<T, DetectionError>;
