use anyhow::Context;
use hydrocore::prelude::DetectorConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkflowConfig {
    pub working_directory: PathBuf,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default)]
    pub detector: DetectorConfig,
}

/// One fewer than the available cores, never less than one.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|cores| cores.get().saturating_sub(1))
        .unwrap_or(1)
        .max(1)
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(working_directory: PathBuf, workers: Option<usize>) -> Self {
        Self {
            working_directory,
            workers: workers.unwrap_or_else(default_workers),
            detector: DetectorConfig::default(),
        }
    }

    pub fn layout(&self) -> WorkingLayout {
        WorkingLayout::new(&self.working_directory)
    }
}

/// Numbered stage directories under the working directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkingLayout {
    pub deployments: PathBuf,
    pub parsed: PathBuf,
    pub cleaned: PathBuf,
    pub intervals: PathBuf,
    pub interval_data: PathBuf,
    pub zone_maps: PathBuf,
}

impl WorkingLayout {
    pub fn new(root: &Path) -> Self {
        Self {
            deployments: root.join("00_hydrophone_deployments"),
            parsed: root.join("03_parsed_ais_files"),
            cleaned: root.join("04_clean_and_inrange_ais_data"),
            intervals: root.join("06a_scenario_intervals"),
            interval_data: root.join("06b_interval_ais_data"),
            zone_maps: root.join("99_inclusion_exclusion_zone_maps"),
        }
    }

    pub fn ensure(&self) -> anyhow::Result<()> {
        for dir in [
            &self.deployments,
            &self.parsed,
            &self.cleaned,
            &self.intervals,
            &self.interval_data,
            &self.zone_maps,
        ] {
            fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }
        Ok(())
    }
}
