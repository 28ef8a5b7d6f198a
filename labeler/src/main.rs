use anyhow::Context;
use clap::Parser;
use generator::profile::{generate_working_directory, SyntheticConfig};
use hydrocore::ais_interface::IntervalKind;
use hydrocore::telemetry::LogObserver;
use std::path::PathBuf;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod generator;
mod workflow;
mod zone_maps;

#[derive(Parser)]
#[command(author, version, about = "Labels hydrophone deployments with background and scenario intervals")]
struct Args {
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Working directory holding the numbered stage folders
    #[arg(long, default_value = ".")]
    work_dir: PathBuf,
    /// Annotation workers; defaults to one fewer than the available cores
    #[arg(long)]
    workers: Option<usize>,
    /// Clean parsed reports into in-range snapshots
    #[arg(long, default_value_t = false)]
    annotate: bool,
    /// Detect and persist intervals from the cleaned snapshots
    #[arg(long, default_value_t = false)]
    identify: bool,
    /// Write a synthetic deployment and parsed reports into the working directory first
    #[arg(long, default_value_t = false)]
    synthetic: bool,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    #[arg(long, default_value_t = 2)]
    days: u32,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(args.work_dir, args.workers)
    };
    if let Some(workers) = args.workers {
        workflow_config.workers = workers;
    }

    let runner = Runner::new(workflow_config);
    let observer = LogObserver::new();

    if args.synthetic {
        let synthetic = SyntheticConfig {
            seed: args.seed,
            days: args.days,
            ..Default::default()
        };
        let summary = generate_working_directory(runner.layout(), &synthetic)
            .context("generating synthetic working directory")?;
        println!(
            "Synthetic run -> {} parsed files, {} reports, descriptor {}",
            summary.parsed_files.len(),
            summary.reports,
            summary.deployment_file.display()
        );
    }

    // with no stage selected, run both
    let run_all = !args.annotate && !args.identify;

    if args.annotate || run_all {
        let summary = runner.annotate(&observer)?;
        println!(
            "Annotation -> processed {}, already cleaned {}, failed {}, in range {}",
            summary.processed,
            summary.skipped_existing,
            summary.failed.len(),
            summary.totals.stats.within
        );
        for (path, message) in &summary.failed {
            println!("  failed {}: {}", path.display(), message);
        }
    }

    if args.identify || run_all {
        for summary in runner.identify(&observer)? {
            println!(
                "Identification {} -> background {}, scenario {}, flagged snapshots {}",
                summary.device,
                summary.total(IntervalKind::Background),
                summary.total(IntervalKind::Scenario),
                summary.flagged_snapshots
            );
        }
    }

    Ok(())
}
