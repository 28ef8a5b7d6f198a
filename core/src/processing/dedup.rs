use super::runs::{CandidateRun, RunExtractor};
use crate::prelude::RadiusLevel;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};

/// Qualifying bucket starts per radius level for one classification.
pub type CandidateSets = BTreeMap<RadiusLevel, BTreeSet<DateTime<Utc>>>;

/// Runs finalised at one level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelOutcome {
    pub level: RadiusLevel,
    pub runs: Vec<CandidateRun>,
}

/// Resolves candidate sets from the widest level down, so each bucket start
/// ends up in at most one retained run.
///
/// Only buckets inside retained runs are claimed. Buckets from runs that fell
/// short of the minimum stay available to narrower levels.
#[derive(Debug, Clone, Copy)]
pub struct CrossResolutionDeduplicator {
    extractor: RunExtractor,
}

impl CrossResolutionDeduplicator {
    pub fn new(extractor: RunExtractor) -> Self {
        Self { extractor }
    }

    /// Consumes the candidate sets and returns outcomes widest level first.
    pub fn resolve(&self, mut candidates: CandidateSets) -> Vec<LevelOutcome> {
        let mut outcomes = Vec::with_capacity(candidates.len());

        while let Some((level, starts)) = candidates.pop_last() {
            let runs: Vec<CandidateRun> = self.extractor.extract(starts).collect();

            for run in &runs {
                for claimed in run.bucket_starts(self.extractor.width) {
                    for narrower in candidates.values_mut() {
                        narrower.remove(&claimed);
                    }
                }
            }

            outcomes.push(LevelOutcome { level, runs });
        }

        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::collections::HashSet;

    fn minute(index: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(index)
    }

    fn deduplicator(min_buckets: usize) -> CrossResolutionDeduplicator {
        CrossResolutionDeduplicator::new(RunExtractor::new(Duration::minutes(1), min_buckets))
    }

    fn level(inclusion: u32) -> RadiusLevel {
        RadiusLevel::new(inclusion, 2_000)
    }

    #[test]
    fn wider_level_claims_shared_time() {
        let mut candidates = CandidateSets::new();
        candidates.insert(level(10_000), (0..40).map(minute).collect());
        candidates.insert(level(5_000), (5..40).map(minute).collect());

        let outcomes = deduplicator(30).resolve(candidates);
        assert_eq!(outcomes[0].level, level(10_000));
        assert_eq!(outcomes[0].runs.len(), 1);
        assert_eq!(outcomes[0].runs[0].buckets, 40);
        assert_eq!(outcomes[1].level, level(5_000));
        assert!(outcomes[1].runs.is_empty());
    }

    #[test]
    fn leftovers_can_still_form_runs_at_narrower_levels() {
        let mut candidates = CandidateSets::new();
        candidates.insert(level(10_000), (0..30).map(minute).collect());
        candidates.insert(level(5_000), (0..70).map(minute).collect());

        let outcomes = deduplicator(30).resolve(candidates);
        assert_eq!(outcomes[1].runs.len(), 1);
        assert_eq!(outcomes[1].runs[0].first, minute(30));
        assert_eq!(outcomes[1].runs[0].buckets, 40);
    }

    #[test]
    fn short_runs_do_not_claim_buckets() {
        let mut candidates = CandidateSets::new();
        candidates.insert(level(10_000), (0..10).map(minute).collect());
        candidates.insert(level(5_000), (0..30).map(minute).collect());

        let outcomes = deduplicator(30).resolve(candidates);
        assert!(outcomes[0].runs.is_empty());
        assert_eq!(outcomes[1].runs[0].buckets, 30);
    }

    #[test]
    fn empty_levels_yield_no_runs() {
        let mut candidates = CandidateSets::new();
        candidates.insert(level(10_000), BTreeSet::new());
        candidates.insert(level(1_000), BTreeSet::new());
        let outcomes = deduplicator(5).resolve(candidates);
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|outcome| outcome.runs.is_empty()));
    }

    #[test]
    fn no_bucket_is_ever_claimed_twice() {
        let mut rng = StdRng::seed_from_u64(11);
        let extractor = RunExtractor::new(Duration::minutes(1), 5);
        for _ in 0..50 {
            let mut candidates = CandidateSets::new();
            for inclusion in (1..=10).map(|k| k * 1_000) {
                let density = rng.gen_range(0.3..0.95);
                let starts = (0..600)
                    .filter(|_| rng.gen_bool(density))
                    .map(minute)
                    .collect();
                candidates.insert(level(inclusion), starts);
            }
            let before = candidates.clone();

            let outcomes = CrossResolutionDeduplicator::new(extractor).resolve(candidates);
            let mut claimed = HashSet::new();
            for outcome in &outcomes {
                for run in &outcome.runs {
                    assert!(run.buckets >= 5);
                    for start in run.bucket_starts(extractor.width) {
                        assert!(before[&outcome.level].contains(&start));
                        assert!(claimed.insert(start), "{start} claimed twice");
                    }
                }
            }
        }
    }
}
