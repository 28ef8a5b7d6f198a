use crate::ais_interface::{IntervalKind, PersistedInterval};
use crate::prelude::RadiusLevel;
use chrono::{DateTime, Duration, Utc};
use std::iter::Peekable;

/// Maximal stretch of buckets whose starts are exactly one width apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateRun {
    pub first: DateTime<Utc>,
    pub last: DateTime<Utc>,
    pub buckets: usize,
}

impl CandidateRun {
    /// Exclusive end of the run's final bucket.
    pub fn end(&self, width: Duration) -> DateTime<Utc> {
        self.last + width
    }

    /// Start timestamp of every bucket in the run.
    pub fn bucket_starts(&self, width: Duration) -> impl Iterator<Item = DateTime<Utc>> {
        let first = self.first;
        (0..self.buckets as i32).map(move |index| first + width * index)
    }

    pub fn into_interval(
        self,
        kind: IntervalKind,
        level: RadiusLevel,
        width: Duration,
    ) -> PersistedInterval {
        PersistedInterval {
            kind,
            level,
            begin: self.first,
            end: self.end(width),
        }
    }
}

/// Lazy run-length scan over ascending bucket starts.
///
/// Restart by cloning before iterating; the underlying iterator must be `Clone`.
#[derive(Debug, Clone)]
pub struct Runs<I: Iterator<Item = DateTime<Utc>>> {
    starts: Peekable<I>,
    width: Duration,
}

impl<I: Iterator<Item = DateTime<Utc>>> Iterator for Runs<I> {
    type Item = CandidateRun;

    fn next(&mut self) -> Option<CandidateRun> {
        let first = self.starts.next()?;
        let mut run = CandidateRun {
            first,
            last: first,
            buckets: 1,
        };
        while let Some(next) = self.starts.next_if(|&next| next - run.last == self.width) {
            run.last = next;
            run.buckets += 1;
        }
        Some(run)
    }
}

/// Splits ascending bucket starts into maximal consecutive runs.
pub fn runs<I>(starts: I, width: Duration) -> Runs<I::IntoIter>
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    Runs {
        starts: starts.into_iter().peekable(),
        width,
    }
}

/// Keeps only the runs that reach a minimum length in buckets.
#[derive(Debug, Clone, Copy)]
pub struct RunExtractor {
    pub width: Duration,
    pub min_buckets: usize,
}

impl RunExtractor {
    pub fn new(width: Duration, min_buckets: usize) -> Self {
        Self { width, min_buckets }
    }

    pub fn extract<I>(&self, starts: I) -> impl Iterator<Item = CandidateRun>
    where
        I: IntoIterator<Item = DateTime<Utc>>,
    {
        let min_buckets = self.min_buckets;
        runs(starts, self.width).filter(move |run| run.buckets >= min_buckets)
    }
}
