//! Hydrophone/AIS interval detection.
//!
//! Annotates vessel position reports with their distance to a deployed
//! hydrophone, then scans each deployment in fixed time buckets to find
//! quiet background intervals and single-vessel scenario intervals at a
//! family of nested radii.

pub mod ais_interface;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod telemetry;

pub use prelude::{BoundaryPolicy, DetectionError, DetectionResult, DetectorConfig, RadiusLevel};
