use crate::prelude::RadiusLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification an interval was detected under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntervalKind {
    Background,
    Scenario,
}

impl std::fmt::Display for IntervalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntervalKind::Background => write!(f, "background"),
            IntervalKind::Scenario => write!(f, "scenario"),
        }
    }
}

/// Final half-open interval `[begin, end)` attributed to a single radius level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedInterval {
    pub kind: IntervalKind,
    pub level: RadiusLevel,
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl PersistedInterval {
    pub fn duration(&self) -> chrono::Duration {
        self.end - self.begin
    }
}
