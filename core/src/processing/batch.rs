use super::annotator::{AnnotationStats, DistanceAnnotator};
use super::normalizer::normalize;
use super::worker_pool::{PoolTask, WorkerPool};
use crate::ais_interface::{from_zulu, Deployment, DeploymentWindow, RawReport, TimelineSnapshot};
use crate::prelude::{DetectionError, DetectionResult, DetectorConfig};
use crate::telemetry::{AnnotationMetrics, AnnotationTotals, ProgressObserver};
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const PARSED_SUFFIX: &str = "_parsed.json";
pub const CLEANED_SUFFIX: &str = "_cleaned.bin";

/// Timestamp carried in the second `_`-separated token of a data file name.
pub fn embedded_timestamp(path: &Path) -> Option<DateTime<Utc>> {
    let name = path.file_name()?.to_str()?;
    let token = name.split('_').nth(1)?;
    from_zulu(token).ok()
}

/// Cleaned snapshot name for a parsed input, or `None` when `input` is not a parsed file.
pub fn cleaned_name(input: &Path) -> Option<String> {
    let name = input.file_name()?.to_str()?;
    let stem = name.strip_suffix(PARSED_SUFFIX)?;
    Some(format!("{stem}{CLEANED_SUFFIX}"))
}

fn in_window(timestamp: DateTime<Utc>, window: &DeploymentWindow) -> bool {
    // closing midnight included
    window.begin <= timestamp && timestamp <= window.end
}

fn files_with_suffix(directory: &Path, suffix: &str) -> DetectionResult<Vec<PathBuf>> {
    let entries = fs::read_dir(directory).map_err(|err| DetectionError::io(directory, err))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|err| DetectionError::io(directory, err))?.path();
        let matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .map_or(false, |name| name.ends_with(suffix));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Directory holding the cleaned snapshots annotated against `deployment`'s reference point.
pub fn deployment_cleaned_dir(cleaned_dir: &Path, deployment: &Deployment) -> PathBuf {
    cleaned_dir.join(deployment.key())
}

/// Cleaned snapshots of `deployment` whose embedded timestamp falls inside its window.
///
/// A deployment that has not been annotated yet has no snapshots.
pub fn cleaned_snapshots(
    cleaned_dir: &Path,
    deployment: &Deployment,
) -> DetectionResult<Vec<PathBuf>> {
    let directory = deployment_cleaned_dir(cleaned_dir, deployment);
    if !directory.is_dir() {
        return Ok(Vec::new());
    }
    let window = deployment.window();
    Ok(files_with_suffix(&directory, CLEANED_SUFFIX)?
        .into_iter()
        .filter(|path| embedded_timestamp(path).map_or(false, |ts| in_window(ts, &window)))
        .collect())
}

/// Decodes, normalizes and annotates one parsed file, writing the in-range rows to `output`.
pub fn annotate_file(
    input: &Path,
    output: &Path,
    annotator: &DistanceAnnotator,
) -> DetectionResult<AnnotationStats> {
    let file = File::open(input).map_err(|err| DetectionError::io(input, err))?;
    let raw: Vec<RawReport> = serde_json::from_reader(BufReader::new(file))?;
    let (kept, stats) = annotator.annotate_in_range(normalize(raw));

    // an existing output must always be a complete one
    let partial = output.with_extension("partial");
    TimelineSnapshot::from_reports(&kept).write(&partial)?;
    fs::rename(&partial, output).map_err(|err| DetectionError::io(output, err))?;
    Ok(stats)
}

/// One parsed input scheduled for annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub size: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationPlan {
    /// Smallest input first.
    pub jobs: Vec<AnnotationJob>,
    pub skipped_existing: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub skipped_existing: usize,
    pub failed: Vec<(PathBuf, String)>,
    pub totals: AnnotationTotals,
}

impl BatchSummary {
    pub fn absorb(&mut self, other: BatchSummary) {
        self.processed += other.processed;
        self.skipped_existing += other.skipped_existing;
        self.failed.extend(other.failed);
        self.totals.files += other.totals.files;
        self.totals.errors += other.totals.errors;
        self.totals.stats.undefined += other.totals.stats.undefined;
        self.totals.stats.prefiltered += other.totals.stats.prefiltered;
        self.totals.stats.geodesic += other.totals.stats.geodesic;
        self.totals.stats.within += other.totals.stats.within;
    }
}

/// Turns a directory of parsed daily files into cleaned, in-range snapshots.
pub struct AnnotationBatch<'a> {
    parsed_dir: PathBuf,
    cleaned_dir: PathBuf,
    config: &'a DetectorConfig,
    pool: WorkerPool,
    observer: &'a dyn ProgressObserver,
}

impl<'a> AnnotationBatch<'a> {
    pub fn new(
        parsed_dir: &Path,
        cleaned_dir: &Path,
        config: &'a DetectorConfig,
        pool: WorkerPool,
        observer: &'a dyn ProgressObserver,
    ) -> Self {
        Self {
            parsed_dir: parsed_dir.to_path_buf(),
            cleaned_dir: cleaned_dir.to_path_buf(),
            config,
            pool,
            observer,
        }
    }

    /// Parsed files inside the deployment window that have no cleaned output yet.
    pub fn plan(&self, deployment: &Deployment) -> DetectionResult<AnnotationPlan> {
        let window = deployment.window();
        let output_dir = deployment_cleaned_dir(&self.cleaned_dir, deployment);
        let mut plan = AnnotationPlan::default();

        for input in files_with_suffix(&self.parsed_dir, PARSED_SUFFIX)? {
            let Some(timestamp) = embedded_timestamp(&input) else {
                debug!("{} carries no timestamp, ignoring", input.display());
                continue;
            };
            if !in_window(timestamp, &window) {
                continue;
            }
            let Some(name) = cleaned_name(&input) else {
                continue;
            };
            let output = output_dir.join(name);
            if output.exists() {
                plan.skipped_existing += 1;
                continue;
            }
            let size = fs::metadata(&input)
                .map_err(|err| DetectionError::io(&input, err))?
                .len();
            plan.jobs.push(AnnotationJob {
                input,
                output,
                size,
            });
        }

        plan.jobs.sort_by_key(|job| job.size);
        Ok(plan)
    }

    /// Annotates every planned file for `deployment`; per-file failures are collected, not fatal.
    pub fn run(&self, deployment: &Deployment) -> DetectionResult<BatchSummary> {
        self.config.validate()?;
        let output_dir = deployment_cleaned_dir(&self.cleaned_dir, deployment);
        fs::create_dir_all(&output_dir).map_err(|err| DetectionError::io(&output_dir, err))?;

        let plan = self.plan(deployment)?;
        info!(
            "{}: {} files to annotate, {} already cleaned",
            deployment.device,
            plan.jobs.len(),
            plan.skipped_existing
        );

        let annotator = Arc::new(DistanceAnnotator::from_config(
            deployment.reference,
            self.config,
        ));
        let metrics = Arc::new(AnnotationMetrics::new());
        let tasks = plan
            .jobs
            .into_iter()
            .map(|job| {
                let annotator = Arc::clone(&annotator);
                let metrics = Arc::clone(&metrics);
                let AnnotationJob { input, output, .. } = job;
                PoolTask::new(input.clone(), move || {
                    let stats = annotate_file(&input, &output, &annotator)?;
                    metrics.record_file(&stats);
                    Ok(stats)
                })
            })
            .collect();

        let mut summary = BatchSummary {
            skipped_existing: plan.skipped_existing,
            ..Default::default()
        };
        self.pool.run(tasks, |input, outcome| match outcome {
            Ok(stats) => {
                summary.processed += 1;
                self.observer.file_annotated(&input, &stats);
            }
            Err(err) => {
                metrics.record_error();
                self.observer.file_failed(&input, &err);
                summary.failed.push((input, err.to_string()));
            }
        })?;

        summary.totals = metrics.snapshot();
        Ok(summary)
    }
}
