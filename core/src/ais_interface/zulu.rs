use crate::prelude::{DetectionError, DetectionResult};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

const ZULU_COMPACT: &str = "%Y%m%dT%H%M%S%.3fZ";
const ZULU_COMPACT_PARSE: &str = "%Y%m%dT%H%M%S%.fZ";

/// Renders a timestamp as `YYYYMMDDTHHMMSS.sssZ`.
pub fn to_zulu(timestamp: DateTime<Utc>) -> String {
    timestamp.format(ZULU_COMPACT).to_string()
}

/// Parses the compact zulu form, with or without fractional seconds.
pub fn from_zulu(text: &str) -> DetectionResult<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text, ZULU_COMPACT_PARSE)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|_| DetectionError::Timestamp(text.to_string()))
}
