pub mod annotator;
pub mod batch;
pub mod bucketizer;
pub mod classifier;
pub mod dedup;
pub mod normalizer;
pub mod persister;
pub mod pipeline;
pub mod runs;
pub mod worker_pool;

pub use annotator::{AnnotationStats, DistanceAnnotator, Proximity};
pub use batch::{
    annotate_file, cleaned_snapshots, deployment_cleaned_dir, AnnotationBatch, AnnotationPlan,
    BatchSummary,
};
pub use bucketizer::{Buckets, TimeBucket};
pub use classifier::{BucketClassification, MultiResolutionClassifier};
pub use dedup::{CandidateSets, CrossResolutionDeduplicator, LevelOutcome};
pub use normalizer::normalize;
pub use persister::{IntervalPersister, PersistReport};
pub use pipeline::{DeploymentPass, DeploymentSummary, DetectionOutcome};
pub use runs::{runs, CandidateRun, RunExtractor};
pub use worker_pool::{PoolTask, WorkerPool};
