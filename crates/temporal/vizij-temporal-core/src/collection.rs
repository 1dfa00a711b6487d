//! Ordered, non-overlapping set of time intervals.
//!
//! Intervals are kept sorted by start. Lookups are binary searches; insertion
//! positions the new interval once and splices it in, trimming whatever it
//! overlaps, so the whole array is never re-sorted.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::interval::TimeInterval;
use crate::time::TimeStamp;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeIntervalCollection<T> {
    intervals: Vec<TimeInterval<T>>,
}

impl<T> Default for TimeIntervalCollection<T> {
    fn default() -> Self {
        Self {
            intervals: Vec::new(),
        }
    }
}

/// `a` lies entirely before `b` (they may touch with disjoint inclusivity).
#[inline]
fn ends_before<A, B>(a: &TimeInterval<A>, b: &TimeInterval<B>) -> bool {
    a.stop < b.start || (a.stop == b.start && !(a.is_stop_included && b.is_start_included))
}

impl<T> TimeIntervalCollection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimeInterval<T>> {
        self.intervals.iter()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&TimeInterval<T>> {
        self.intervals.get(index)
    }

    /// Start of the earliest interval.
    pub fn start(&self) -> Option<TimeStamp> {
        self.intervals.first().map(|iv| iv.start)
    }

    /// Stop of the latest interval.
    pub fn stop(&self) -> Option<TimeStamp> {
        self.intervals.last().map(|iv| iv.stop)
    }

    fn index_containing(&self, time: TimeStamp) -> Option<usize> {
        // Intervals that have started at or before `time` form a prefix.
        let started = self
            .intervals
            .partition_point(|iv| iv.start < time || (iv.start == time && iv.is_start_included));
        let candidate = started.checked_sub(1)?;
        self.intervals[candidate]
            .contains(time)
            .then_some(candidate)
    }

    /// The unique interval containing `time`, if any.
    pub fn find_interval_containing(&self, time: TimeStamp) -> Option<&TimeInterval<T>> {
        self.index_containing(time).map(|i| &self.intervals[i])
    }

    pub fn find_interval_containing_mut(
        &mut self,
        time: TimeStamp,
    ) -> Option<&mut TimeInterval<T>> {
        self.index_containing(time)
            .map(move |i| &mut self.intervals[i])
    }

    #[inline]
    pub fn contains(&self, time: TimeStamp) -> bool {
        self.index_containing(time).is_some()
    }

    /// Index of the interval whose bounds are exactly `start` and `stop`.
    pub fn position(&self, start: TimeStamp, stop: TimeStamp) -> Option<usize> {
        let first = self.intervals.partition_point(|iv| iv.start < start);
        self.intervals[first..]
            .iter()
            .take_while(|iv| iv.start == start)
            .position(|iv| iv.stop == stop)
            .map(|offset| first + offset)
    }

    /// The interval whose bounds are exactly `start` and `stop`.
    pub fn find_interval(&self, start: TimeStamp, stop: TimeStamp) -> Option<&TimeInterval<T>> {
        self.position(start, stop).map(|i| &self.intervals[i])
    }

    pub fn find_interval_mut(
        &mut self,
        start: TimeStamp,
        stop: TimeStamp,
    ) -> Option<&mut TimeInterval<T>> {
        self.position(start, stop)
            .map(move |i| &mut self.intervals[i])
    }

    /// Remove and return the interval with exactly these bounds.
    pub fn remove_interval(&mut self, start: TimeStamp, stop: TimeStamp) -> Option<TimeInterval<T>> {
        self.position(start, stop).map(|i| self.intervals.remove(i))
    }

    pub fn clear(&mut self) {
        self.intervals.clear();
    }
}

/// Result of [`TimeIntervalCollection::overlay`].
#[derive(Debug)]
pub struct Overlay<T> {
    /// Index of the inserted interval.
    pub index: usize,
    /// Payloads of intervals the new one covered completely.
    pub displaced: Vec<T>,
}

impl<T> TimeIntervalCollection<T> {
    /// Insert an interval over whatever it overlaps, or return `None` if it
    /// is empty.
    ///
    /// Existing intervals overlapping the new one are trimmed to the parts
    /// outside it; fully covered ones are removed and handed back in
    /// [`Overlay::displaced`]. An interval spanning both sides is split in
    /// two: the right piece keeps the payload and `split` builds the left
    /// piece's payload from it.
    pub fn overlay(
        &mut self,
        interval: TimeInterval<T>,
        split: impl FnOnce(&T) -> T,
    ) -> Option<Overlay<T>> {
        if interval.is_empty() {
            return None;
        }

        let first = self
            .intervals
            .partition_point(|iv| ends_before(iv, &interval));
        let end = self
            .intervals
            .partition_point(|iv| !ends_before(&interval, iv))
            .max(first);

        let mut overlapped: Vec<TimeInterval<T>> = self.intervals.drain(first..end).collect();
        let Some(tail) = overlapped.pop() else {
            self.intervals.insert(first, interval);
            return Some(Overlay {
                index: first,
                displaced: Vec::new(),
            });
        };
        let head = if overlapped.is_empty() {
            None
        } else {
            Some(overlapped.swap_remove(0))
        };
        let mut displaced: Vec<T> = overlapped.into_iter().map(|iv| iv.data).collect();

        let left = {
            let iv = head.as_ref().unwrap_or(&tail);
            TimeInterval::new(
                iv.start,
                interval.start,
                iv.is_start_included,
                !interval.is_start_included,
                (),
            )
        };
        let left = (!left.is_empty()).then_some(left);
        let right = TimeInterval::new(
            interval.stop,
            tail.stop,
            !interval.is_stop_included,
            tail.is_stop_included,
            (),
        );
        let right = (!right.is_empty()).then_some(right);

        let mut tail_data = Some(tail.data);
        let right_data = if right.is_some() { tail_data.take() } else { None };
        let left_data = match head {
            Some(head) => Some(head.data),
            None if left.is_none() => None,
            None => match (tail_data.take(), right_data.as_ref()) {
                (Some(data), _) => Some(data),
                (None, Some(data)) => Some(split(data)),
                (None, None) => None,
            },
        };

        let mut replacement = Vec::with_capacity(3);
        let mut index = first;
        match (left, left_data) {
            (Some(bounds), Some(data)) => {
                replacement.push(bounds.with_data(data));
                index += 1;
            }
            (None, Some(data)) => displaced.push(data),
            _ => {}
        }
        replacement.push(interval);
        if let (Some(bounds), Some(data)) = (right, right_data) {
            replacement.push(bounds.with_data(data));
        }
        displaced.extend(tail_data);

        self.intervals.splice(first..first, replacement);
        Some(Overlay { index, displaced })
    }
}

impl<T: Clone> TimeIntervalCollection<T> {
    /// [`overlay`](Self::overlay) that clones the payload of a split
    /// interval and drops displaced payloads. Returns the new index.
    pub fn add_interval(&mut self, interval: TimeInterval<T>) -> Option<usize> {
        self.overlay(interval, T::clone).map(|overlay| overlay.index)
    }
}

impl<T> Index<usize> for TimeIntervalCollection<T> {
    type Output = TimeInterval<T>;

    #[inline]
    fn index(&self, index: usize) -> &TimeInterval<T> {
        &self.intervals[index]
    }
}

impl<T> IndexMut<usize> for TimeIntervalCollection<T> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut TimeInterval<T> {
        &mut self.intervals[index]
    }
}
