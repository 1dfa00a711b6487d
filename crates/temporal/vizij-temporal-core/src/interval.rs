//! Time ranges with independently inclusive boundaries.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::TemporalError;
use crate::time::TimeStamp;

/// A time range carrying a payload.
///
/// `start <= stop`; when `start == stop` the interval is only non-empty if both
/// boundaries are included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeInterval<T = ()> {
    pub start: TimeStamp,
    pub stop: TimeStamp,
    pub is_start_included: bool,
    pub is_stop_included: bool,
    pub data: T,
}

impl TimeInterval<()> {
    /// Unbounded interval covering all time.
    pub const INFINITE: TimeInterval<()> = TimeInterval {
        start: TimeStamp::NEG_INFINITY,
        stop: TimeStamp::INFINITY,
        is_start_included: true,
        is_stop_included: true,
        data: (),
    };

    /// Closed interval `[start, stop]` without payload.
    #[inline]
    pub fn closed(start: TimeStamp, stop: TimeStamp) -> Self {
        Self::new(start, stop, true, true, ())
    }

    /// Parse an ISO-8601 `start/stop` interval. Both ends are included.
    pub fn from_iso8601(text: &str) -> Result<Self, TemporalError> {
        let mut parts = text.split('/');
        let (start, stop) = match (parts.next(), parts.next(), parts.next()) {
            (Some(start), Some(stop), None) => (start, stop),
            _ => {
                return Err(TemporalError::malformed(format!(
                    "interval '{text}' is not of the form start/stop"
                )))
            }
        };
        let start = TimeStamp::from_iso8601(start)
            .map_err(|e| TemporalError::malformed(format!("interval start: {e}")))?;
        let stop = TimeStamp::from_iso8601(stop)
            .map_err(|e| TemporalError::malformed(format!("interval stop: {e}")))?;
        if stop < start {
            return Err(TemporalError::malformed(format!(
                "interval '{text}' stops before it starts"
            )));
        }
        Ok(Self::closed(start, stop))
    }
}

impl<T> TimeInterval<T> {
    #[inline]
    pub fn new(
        start: TimeStamp,
        stop: TimeStamp,
        is_start_included: bool,
        is_stop_included: bool,
        data: T,
    ) -> Self {
        Self {
            start,
            stop,
            is_start_included,
            is_stop_included,
            data,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        match self.start.cmp(&self.stop) {
            Ordering::Greater => true,
            Ordering::Equal => !(self.is_start_included && self.is_stop_included),
            Ordering::Less => false,
        }
    }

    /// Whether `time` falls inside the interval, honoring boundary inclusivity.
    #[inline]
    pub fn contains(&self, time: TimeStamp) -> bool {
        let after_start = time > self.start || (time == self.start && self.is_start_included);
        let before_stop = time < self.stop || (time == self.stop && self.is_stop_included);
        after_start && before_stop
    }

    /// Whether both intervals have identical bounds and inclusivity.
    #[inline]
    pub fn same_bounds<U>(&self, other: &TimeInterval<U>) -> bool {
        self.start == other.start
            && self.stop == other.stop
            && self.is_start_included == other.is_start_included
            && self.is_stop_included == other.is_stop_included
    }

    /// The bounds of this interval without its payload.
    #[inline]
    pub fn bounds(&self) -> TimeInterval<()> {
        TimeInterval::new(
            self.start,
            self.stop,
            self.is_start_included,
            self.is_stop_included,
            (),
        )
    }

    /// Replace the payload, keeping the bounds.
    #[inline]
    pub fn with_data<U>(self, data: U) -> TimeInterval<U> {
        TimeInterval::new(
            self.start,
            self.stop,
            self.is_start_included,
            self.is_stop_included,
            data,
        )
    }

    /// Overlapping sub-range of two intervals, or `None` when they are disjoint.
    pub fn intersect<U>(&self, other: &TimeInterval<U>) -> Option<TimeInterval<()>> {
        if self.is_empty() || other.is_empty() {
            return None;
        }
        let (start, is_start_included) = match self.start.cmp(&other.start) {
            Ordering::Less => (other.start, other.is_start_included),
            Ordering::Greater => (self.start, self.is_start_included),
            Ordering::Equal => (
                self.start,
                self.is_start_included && other.is_start_included,
            ),
        };
        let (stop, is_stop_included) = match self.stop.cmp(&other.stop) {
            Ordering::Less => (self.stop, self.is_stop_included),
            Ordering::Greater => (other.stop, other.is_stop_included),
            Ordering::Equal => (self.stop, self.is_stop_included && other.is_stop_included),
        };
        let result = TimeInterval::new(start, stop, is_start_included, is_stop_included, ());
        (!result.is_empty()).then_some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: f64) -> TimeStamp {
        TimeStamp::from_seconds(s).unwrap()
    }

    #[test]
    fn containment_honors_inclusivity() {
        let half_open = TimeInterval::new(ts(0.0), ts(10.0), true, false, ());
        assert!(half_open.contains(ts(0.0)));
        assert!(half_open.contains(ts(9.999)));
        assert!(!half_open.contains(ts(10.0)));
        assert!(!half_open.contains(ts(-0.001)));

        let closed = TimeInterval::closed(ts(0.0), ts(10.0));
        assert!(closed.contains(ts(10.0)));
    }

    #[test]
    fn degenerate_intervals() {
        assert!(!TimeInterval::closed(ts(3.0), ts(3.0)).is_empty());
        assert!(TimeInterval::new(ts(3.0), ts(3.0), true, false, ()).is_empty());
        assert!(TimeInterval::closed(ts(4.0), ts(3.0)).is_empty());
    }

    #[test]
    fn intersect_overlapping_and_disjoint() {
        let a = TimeInterval::new(ts(0.0), ts(10.0), true, false, ());
        let b = TimeInterval::closed(ts(5.0), ts(20.0));
        let i = a.intersect(&b).unwrap();
        assert_eq!(i, TimeInterval::new(ts(5.0), ts(10.0), true, false, ()));

        let c = TimeInterval::closed(ts(10.0), ts(20.0));
        assert!(a.intersect(&c).is_none());

        let d = TimeInterval::closed(ts(0.0), ts(10.0));
        let touch = d.intersect(&c).unwrap();
        assert_eq!(touch, TimeInterval::closed(ts(10.0), ts(10.0)));
    }

    #[test]
    fn intersect_with_infinite_is_identity() {
        let a = TimeInterval::new(ts(1.0), ts(2.0), false, true, ());
        assert_eq!(TimeInterval::INFINITE.intersect(&a), Some(a.clone()));
        assert_eq!(a.intersect(&TimeInterval::INFINITE), Some(a));
    }

    #[test]
    fn parses_iso_interval() {
        let iv = TimeInterval::from_iso8601("2012-03-15T10:00:00Z/2012-03-15T11:00:00Z").unwrap();
        assert_eq!(iv.stop.seconds_since(iv.start), 3600.0);
        assert!(iv.is_start_included && iv.is_stop_included);

        for bad in [
            "2012-03-15T10:00:00Z",
            "2012-03-15T11:00:00Z/2012-03-15T10:00:00Z",
            "a/b",
            "2012-03-15/2012-03-16/2012-03-17",
        ] {
            assert!(
                matches!(
                    TimeInterval::from_iso8601(bad),
                    Err(TemporalError::MalformedPacket { .. })
                ),
                "{bad} should be malformed"
            );
        }
    }
}
