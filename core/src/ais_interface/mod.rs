pub mod deployment;
pub mod interval;
pub mod report;
pub mod timeline;
pub mod zulu;

pub use deployment::{load_deployments, Deployment, DeploymentWindow};
pub use interval::{IntervalKind, PersistedInterval};
pub use report::{Mmsi, PositionReport, RawReport};
pub use timeline::{Timeline, TimelineSnapshot};
pub use zulu::{from_zulu, to_zulu};
