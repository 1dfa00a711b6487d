//! Absolute time values and the designators packets use to name them.
//!
//! Times are seconds since the Unix epoch (UTC) held in an `f64`. Ordering is
//! total (`f64::total_cmp`), which also gives the unbounded sentinels used by
//! open-ended intervals a well-defined place at either end.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TemporalError;

/// A moment in absolute time.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeStamp(f64);

impl TimeStamp {
    /// Start of an unbounded interval.
    pub const NEG_INFINITY: TimeStamp = TimeStamp(f64::NEG_INFINITY);
    /// End of an unbounded interval.
    pub const INFINITY: TimeStamp = TimeStamp(f64::INFINITY);

    /// Create a time from seconds since the Unix epoch.
    #[inline]
    pub fn from_seconds(seconds: f64) -> Result<Self, TemporalError> {
        if seconds.is_nan() {
            return Err(TemporalError::invalid_time("time is NaN"));
        }
        Ok(Self::normalized(seconds))
    }

    /// Parse an ISO-8601 instant. Accepts RFC 3339 with offset, a naive
    /// date-time (taken as UTC) or a bare calendar date (midnight UTC).
    pub fn from_iso8601(text: &str) -> Result<Self, TemporalError> {
        let text = text.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Ok(Self::from_parts(dt.timestamp(), dt.timestamp_subsec_nanos()));
        }
        for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
                let dt = naive.and_utc();
                return Ok(Self::from_parts(dt.timestamp(), dt.timestamp_subsec_nanos()));
            }
        }
        let date = NaiveDate::parse_from_str(text, "%Y-%m-%d")?;
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| TemporalError::invalid_time(format!("'{text}' has no midnight")))?;
        Ok(Self::from_parts(midnight.and_utc().timestamp(), 0))
    }

    #[inline]
    fn from_parts(secs: i64, nanos: u32) -> Self {
        Self::normalized(secs as f64 + f64::from(nanos) * 1e-9)
    }

    #[inline]
    fn normalized(seconds: f64) -> Self {
        // -0.0 and 0.0 must compare equal under total ordering.
        if seconds == 0.0 {
            Self(0.0)
        } else {
            Self(seconds)
        }
    }

    /// Seconds since the Unix epoch.
    #[inline]
    pub fn as_seconds(&self) -> f64 {
        self.0
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }

    /// Offset this time by a signed number of seconds.
    #[inline]
    pub fn add_seconds(&self, seconds: f64) -> Self {
        Self::normalized(self.0 + seconds)
    }

    /// Signed seconds from `earlier` to `self`.
    #[inline]
    pub fn seconds_since(&self, earlier: TimeStamp) -> f64 {
        self.0 - earlier.0
    }

    /// Render as RFC 3339 in UTC, or `None` for the unbounded sentinels and
    /// times chrono cannot represent.
    pub fn to_iso8601(&self) -> Option<String> {
        if !self.is_finite() {
            return None;
        }
        let secs = self.0.floor();
        let nanos = ((self.0 - secs) * 1e9).round().min(999_999_999.0) as u32;
        DateTime::<Utc>::from_timestamp(secs as i64, nanos)
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

impl PartialEq for TimeStamp {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TimeStamp {}

impl PartialOrd for TimeStamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeStamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for TimeStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_iso8601() {
            Some(text) => f.write_str(&text),
            None if self.0 > 0.0 => f.write_str("+inf"),
            None => f.write_str("-inf"),
        }
    }
}

/// How a sample names its time on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeDesignator {
    /// Already-resolved absolute time.
    Absolute(TimeStamp),
    /// ISO-8601 instant string.
    Iso8601(String),
    /// Seconds relative to the packet epoch.
    EpochOffset(f64),
}

impl TimeDesignator {
    /// Resolve to an absolute time. Relative offsets need an epoch.
    pub fn resolve(&self, epoch: Option<TimeStamp>) -> Result<TimeStamp, TemporalError> {
        let time = match self {
            TimeDesignator::Absolute(t) => *t,
            TimeDesignator::Iso8601(text) => TimeStamp::from_iso8601(text)?,
            TimeDesignator::EpochOffset(offset) => {
                let epoch = epoch.ok_or_else(|| {
                    TemporalError::invalid_time(format!(
                        "relative time {offset} given without an epoch"
                    ))
                })?;
                if !offset.is_finite() {
                    return Err(TemporalError::invalid_time(format!(
                        "relative time {offset} is not finite"
                    )));
                }
                epoch.add_seconds(*offset)
            }
        };
        if !time.is_finite() {
            return Err(TemporalError::invalid_time(format!(
                "sample time {} is not finite",
                time.as_seconds()
            )));
        }
        Ok(time)
    }
}

impl From<TimeStamp> for TimeDesignator {
    fn from(t: TimeStamp) -> Self {
        TimeDesignator::Absolute(t)
    }
}

impl From<f64> for TimeDesignator {
    fn from(offset: f64) -> Self {
        TimeDesignator::EpochOffset(offset)
    }
}

impl From<&str> for TimeDesignator {
    fn from(text: &str) -> Self {
        TimeDesignator::Iso8601(text.to_string())
    }
}
