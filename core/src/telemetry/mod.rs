pub mod log;
pub mod metrics;
pub mod observer;

pub use log::LogObserver;
pub use metrics::{AnnotationMetrics, AnnotationTotals};
pub use observer::{DayProgress, ProgressObserver, SilentObserver, ZoneMapHook};
