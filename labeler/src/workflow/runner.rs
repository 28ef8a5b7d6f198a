use crate::workflow::config::{WorkflowConfig, WorkingLayout};
use crate::zone_maps::writer::GeoJsonZoneWriter;
use anyhow::Context;
use hydrocore::ais_interface::{load_deployments, Deployment, IntervalKind, Timeline};
use hydrocore::processing::{
    cleaned_snapshots, AnnotationBatch, BatchSummary, DeploymentPass, DeploymentSummary,
    IntervalPersister, WorkerPool,
};
use hydrocore::telemetry::ProgressObserver;
use log::info;

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
    layout: WorkingLayout,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        let layout = config.layout();
        Self { config, layout }
    }

    pub fn layout(&self) -> &WorkingLayout {
        &self.layout
    }

    pub fn deployments(&self) -> anyhow::Result<Vec<Deployment>> {
        let deployments = load_deployments(&self.layout.deployments).with_context(|| {
            format!(
                "loading deployments from {}",
                self.layout.deployments.display()
            )
        })?;
        info!("{} hydrophone deployments found", deployments.len());
        Ok(deployments)
    }

    /// Cleans and annotates every parsed file that belongs to a deployment.
    pub fn annotate(&self, observer: &dyn ProgressObserver) -> anyhow::Result<BatchSummary> {
        self.config
            .detector
            .validate()
            .context("validating detector config")?;
        let pool = WorkerPool::new(self.config.workers).context("creating worker pool")?;
        let batch = AnnotationBatch::new(
            &self.layout.parsed,
            &self.layout.cleaned,
            &self.config.detector,
            pool,
            observer,
        );

        let mut summary = BatchSummary::default();
        for deployment in self.deployments()? {
            let outcome = batch
                .run(&deployment)
                .with_context(|| format!("annotating reports for {}", deployment.device))?;
            summary.absorb(outcome);
        }
        Ok(summary)
    }

    /// Detects and persists background and scenario intervals for every deployment.
    pub fn identify(
        &self,
        observer: &dyn ProgressObserver,
    ) -> anyhow::Result<Vec<DeploymentSummary>> {
        self.config
            .detector
            .validate()
            .context("validating detector config")?;
        let persister = IntervalPersister::new(
            &self.layout.intervals,
            &self.layout.interval_data,
            self.config.detector.snapshot_padding(),
        );

        let mut summaries = Vec::new();
        for deployment in self.deployments()? {
            let window = deployment.window();
            let snapshots = cleaned_snapshots(&self.layout.cleaned, &deployment)
                .context("listing cleaned snapshots")?;
            let timeline = Timeline::load(&snapshots, &window).with_context(|| {
                format!("assembling timeline for {}", deployment.device)
            })?;
            info!(
                "{}: {} in-range reports from {} files",
                deployment.device,
                timeline.len(),
                snapshots.len()
            );

            let zone_dir = self.layout.zone_maps.join(deployment.key());
            let zones = GeoJsonZoneWriter::new(&zone_dir, &deployment.device);
            let outcome = DeploymentPass::new(&self.config.detector, observer)
                .with_map_hook(&zones)
                .detect(&deployment, &timeline)
                .with_context(|| format!("detecting intervals for {}", deployment.device))?;
            let report = persister
                .persist(&deployment, &outcome, &timeline, observer)
                .with_context(|| format!("persisting intervals for {}", deployment.device))?;

            let summary = DeploymentSummary::new(&deployment.device, &outcome, report.flagged.len());
            observer.deployment_finished(&summary);
            info!(
                "{}: {} background and {} scenario intervals, {} zone maps",
                deployment.device,
                summary.total(IntervalKind::Background),
                summary.total(IntervalKind::Scenario),
                zones.written()
            );
            summaries.push(summary);
        }
        Ok(summaries)
    }
}
