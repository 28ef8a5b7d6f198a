use crate::ais_interface::{Mmsi, PositionReport};
use crate::prelude::{BoundaryPolicy, RadiusLevel};

/// Verdict for one bucket at one radius level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketClassification {
    /// Nothing inside the exclusion ring.
    Background,
    /// Exactly one vessel inside the exclusion ring, cleanly inside the inclusion ring.
    ScenarioCandidate(Mmsi),
    Neither,
}

/// Evaluates every configured radius level against a bucket's reports.
#[derive(Debug, Clone)]
pub struct MultiResolutionClassifier {
    levels: Vec<RadiusLevel>,
    policy: BoundaryPolicy,
}

impl MultiResolutionClassifier {
    pub fn new(mut levels: Vec<RadiusLevel>, policy: BoundaryPolicy) -> Self {
        levels.sort();
        levels.dedup();
        Self { levels, policy }
    }

    pub fn levels(&self) -> &[RadiusLevel] {
        &self.levels
    }

    pub fn classify(&self, reports: &[PositionReport], level: RadiusLevel) -> BucketClassification {
        let mut in_exclusion = 0usize;
        let mut in_inclusion = 0usize;
        let mut vessel = None;
        let mut single_vessel = true;

        for report in reports.iter().filter(|report| report.within(level.exclusion)) {
            in_exclusion += 1;
            if report.within(level.inclusion) {
                in_inclusion += 1;
            }
            match vessel {
                None => vessel = Some(report.mmsi),
                Some(mmsi) if mmsi != report.mmsi => single_vessel = false,
                Some(_) => {}
            }
        }

        let Some(mmsi) = vessel else {
            return BucketClassification::Background;
        };
        let isolated = match self.policy {
            BoundaryPolicy::Strict => in_inclusion == in_exclusion,
            BoundaryPolicy::AnyReportInside => in_inclusion > 0,
        };
        if single_vessel && isolated {
            BucketClassification::ScenarioCandidate(mmsi)
        } else {
            BucketClassification::Neither
        }
    }

    /// Classifies one bucket at every level, in ascending level order.
    pub fn classify_all<'s>(
        &'s self,
        reports: &'s [PositionReport],
    ) -> impl Iterator<Item = (RadiusLevel, BucketClassification)> + 's {
        self.levels
            .iter()
            .map(move |&level| (level, self.classify(reports, level)))
    }
}
