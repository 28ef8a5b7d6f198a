use crate::processing::annotator::AnnotationStats;
use std::sync::Mutex;

/// Thread-safe totals for an annotation batch.
pub struct AnnotationMetrics {
    inner: Mutex<AnnotationTotals>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnotationTotals {
    pub files: usize,
    pub errors: usize,
    pub stats: AnnotationStats,
}

impl AnnotationMetrics {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(AnnotationTotals::default()),
        }
    }

    pub fn record_file(&self, stats: &AnnotationStats) {
        if let Ok(mut totals) = self.inner.lock() {
            totals.files += 1;
            totals.stats.undefined += stats.undefined;
            totals.stats.prefiltered += stats.prefiltered;
            totals.stats.geodesic += stats.geodesic;
            totals.stats.within += stats.within;
        }
    }

    pub fn record_error(&self) {
        if let Ok(mut totals) = self.inner.lock() {
            totals.errors += 1;
        }
    }

    pub fn snapshot(&self) -> AnnotationTotals {
        self.inner
            .lock()
            .map(|totals| *totals)
            .unwrap_or_default()
    }
}

impl Default for AnnotationMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_accumulate_across_files() {
        let metrics = AnnotationMetrics::new();
        let stats = AnnotationStats {
            undefined: 1,
            prefiltered: 10,
            geodesic: 4,
            within: 3,
        };
        metrics.record_file(&stats);
        metrics.record_file(&stats);
        metrics.record_error();

        let totals = metrics.snapshot();
        assert_eq!(totals.files, 2);
        assert_eq!(totals.errors, 1);
        assert_eq!(totals.stats.prefiltered, 20);
        assert_eq!(totals.stats.within, 6);
    }
}
