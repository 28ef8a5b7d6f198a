use crate::ais_interface::{DeploymentWindow, PositionReport};
use chrono::{DateTime, Duration, Utc};

/// A left-closed time window `[start, start + width)` and the reports inside it.
#[derive(Debug, Clone, Copy)]
pub struct TimeBucket<'a> {
    pub start: DateTime<Utc>,
    pub reports: &'a [PositionReport],
}

/// Walks a timestamp-sorted timeline in fixed-width buckets across a window.
///
/// Every bucket in the window is produced, including empty ones. Windows start
/// at midnight and the width divides a day, so no bucket straddles a day
/// boundary.
#[derive(Debug, Clone)]
pub struct Buckets<'a> {
    remaining: &'a [PositionReport],
    next_start: DateTime<Utc>,
    end: DateTime<Utc>,
    width: Duration,
}

impl<'a> Buckets<'a> {
    pub fn new(reports: &'a [PositionReport], window: &DeploymentWindow, width: Duration) -> Self {
        let skip = reports.partition_point(|report| report.timestamp < window.begin);
        Self {
            remaining: &reports[skip..],
            next_start: window.begin,
            end: window.end,
            width,
        }
    }

    /// Number of buckets still to be produced.
    pub fn remaining_buckets(&self) -> usize {
        if self.width <= Duration::zero() || self.next_start >= self.end {
            return 0;
        }
        let span = (self.end - self.next_start).num_milliseconds();
        let width = self.width.num_milliseconds();
        ((span + width - 1) / width) as usize
    }
}

impl<'a> Iterator for Buckets<'a> {
    type Item = TimeBucket<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.width <= Duration::zero() || self.next_start >= self.end {
            return None;
        }
        let start = self.next_start;
        let stop = start + self.width;
        let split = self
            .remaining
            .partition_point(|report| report.timestamp < stop);
        let (inside, rest) = self.remaining.split_at(split);
        self.remaining = rest;
        self.next_start = stop;
        Some(TimeBucket {
            start,
            reports: inside,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining_buckets();
        (remaining, Some(remaining))
    }
}
