//! Coarse time keys used to address radar images and deduplicate work.

use std::fmt;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RadarError, RadarResult};

/// Timestamp layout used by the radar archive, e.g. `20240601.1420`.
pub const BUCKET_KEY_FORMAT: &str = "%Y%m%d.%H%M";

/// A UTC time truncated down to a fixed minute granularity.
///
/// Two instants in the same window map to the same bucket, and therefore the
/// same radar image and the same artifact key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeBucket {
    start: DateTime<Utc>,
}

impl TimeBucket {
    /// Truncate `time` to the previous multiple of `granularity_minutes`.
    ///
    /// The granularity must be between 1 and 60 and divide an hour evenly, so
    /// bucket boundaries line up with wall-clock minutes (…:00, :10, :20 for 10).
    pub fn containing(time: DateTime<Utc>, granularity_minutes: u32) -> RadarResult<Self> {
        validate_granularity(granularity_minutes)?;

        let step = granularity_minutes as i64 * 60;
        let secs = time.timestamp();
        let floored = secs - secs.rem_euclid(step);

        let start = Utc
            .timestamp_opt(floored, 0)
            .single()
            .ok_or_else(|| RadarError::Config(format!("timestamp out of range: {}", time)))?;

        Ok(Self { start })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Start of the following bucket.
    pub fn end(&self, granularity_minutes: u32) -> DateTime<Utc> {
        self.start + Duration::minutes(granularity_minutes as i64)
    }

    /// Key used both in the radar source URL and as the artifact name.
    pub fn key(&self) -> String {
        self.start.format(BUCKET_KEY_FORMAT).to_string()
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Check that a bucket granularity divides an hour.
pub fn validate_granularity(granularity_minutes: u32) -> RadarResult<()> {
    if granularity_minutes == 0 || granularity_minutes > 60 || 60 % granularity_minutes != 0 {
        return Err(RadarError::Config(format!(
            "bucket granularity must divide 60 minutes, got {}",
            granularity_minutes
        )));
    }
    Ok(())
}
