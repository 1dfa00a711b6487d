//! DynamicProperty: a time-varying value built from packets.
//!
//! Methods:
//! - add_packet / add_packets / add_samples / set_constant (ingestion)
//! - set_interpolation, remove_interval (table maintenance)
//! - get_value / try_get_value / value_at (queries)

use log::{debug, warn};

use crate::adapter::ValueAdapter;
use crate::collection::TimeIntervalCollection;
use crate::config::Config;
use crate::error::TemporalError;
use crate::ids::IdAllocator;
use crate::interp::{InterpRegistry, InterpolationAlgorithm, BUILTIN_INTERPOLATORS};
use crate::interval::TimeInterval;
use crate::merge::MergeReport;
use crate::packet::{Packet, RawInterval, SampleBatch};
use crate::sample_table::SampleTable;
use crate::sampling::sample_table;
use crate::scratch::Scratch;
use crate::time::TimeStamp;
use crate::value::Value;

/// What an ingestion call changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    /// Intervals created.
    pub created: usize,
    /// Samples added at new times.
    pub inserted: usize,
    /// Samples that replaced a stored value.
    pub overwritten: usize,
    /// Samples dropped individually (`InvalidSample`).
    pub rejected: Vec<TemporalError>,
    /// Whole packets dropped by `add_packets`, by position in the batch.
    pub dropped: Vec<(usize, TemporalError)>,
}

impl IngestReport {
    fn absorb_merge(&mut self, merge: MergeReport) {
        self.inserted += merge.inserted;
        self.overwritten += merge.overwritten;
        self.rejected.extend(merge.rejected);
    }

    /// Fold another report into this one.
    pub fn absorb(&mut self, other: IngestReport) {
        self.created += other.created;
        self.inserted += other.inserted;
        self.overwritten += other.overwritten;
        self.rejected.extend(other.rejected);
        self.dropped.extend(other.dropped);
    }

    /// True when nothing was dropped.
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty() && self.dropped.is_empty()
    }

    /// `Err` with the first rejection or dropped packet, if any.
    pub fn into_result(self) -> Result<Self, TemporalError> {
        if let Some(err) = self.rejected.first() {
            return Err(err.clone());
        }
        if let Some((_, err)) = self.dropped.first() {
            return Err(err.clone());
        }
        Ok(self)
    }
}

/// A property whose value is described per time interval by a
/// [`SampleTable`] and read back through the adapter `A`.
#[derive(Debug, Clone)]
pub struct DynamicProperty<A: ValueAdapter> {
    // Owned data
    adapter: A,
    cfg: Config,
    ids: IdAllocator,
    intervals: TimeIntervalCollection<SampleTable>,

    // Systems
    registry: &'static InterpRegistry,
    scratch: Scratch,
}

impl<A: ValueAdapter + Default> Default for DynamicProperty<A> {
    fn default() -> Self {
        Self::new(A::default())
    }
}

impl<A: ValueAdapter> DynamicProperty<A> {
    pub fn new(adapter: A) -> Self {
        Self::with_config(adapter, Config::default())
    }

    pub fn with_config(adapter: A, cfg: Config) -> Self {
        Self {
            adapter,
            scratch: Scratch::new(&cfg),
            cfg,
            ids: IdAllocator::new(),
            intervals: TimeIntervalCollection::new(),
            registry: &BUILTIN_INTERPOLATORS,
        }
    }

    /// Use `registry` to resolve interpolation algorithms.
    pub fn with_registry(mut self, registry: &'static InterpRegistry) -> Self {
        self.registry = registry;
        self
    }

    #[inline]
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    #[inline]
    pub fn intervals(&self) -> &TimeIntervalCollection<SampleTable> {
        &self.intervals
    }

    #[inline]
    pub fn scratch(&self) -> &Scratch {
        &self.scratch
    }

    // --- Ingestion ---

    /// Apply one packet, clipped to `constrain` when given.
    ///
    /// Interval, epoch and algorithm are validated before anything changes,
    /// so a malformed packet leaves the property untouched. A packet that
    /// carries no value for this kind, or whose interval misses `constrain`,
    /// is a no-op.
    pub fn add_packet(
        &mut self,
        packet: &Packet,
        constrain: Option<&TimeInterval>,
    ) -> Result<IngestReport, TemporalError> {
        let raw = self.adapter.unwrap_interval(packet)?;
        self.apply_packet(packet, raw, constrain)
    }

    /// Apply packets in order. A failing packet is recorded in
    /// [`IngestReport::dropped`] and the rest are still applied.
    pub fn add_packets<'p>(
        &mut self,
        packets: impl IntoIterator<Item = &'p Packet>,
        constrain: Option<&TimeInterval>,
    ) -> IngestReport {
        let mut report = IngestReport::default();
        for (index, packet) in packets.into_iter().enumerate() {
            match self.add_packet(packet, constrain) {
                Ok(r) => report.absorb(r),
                Err(err) => {
                    warn!("dropping packet {index} ({}): {err}", err.category());
                    report.dropped.push((index, err));
                }
            }
        }
        report
    }

    /// Merge samples into the table for `interval`, creating it if needed.
    pub fn add_samples(
        &mut self,
        interval: &TimeInterval,
        batch: &SampleBatch,
        epoch: Option<TimeStamp>,
    ) -> Result<IngestReport, TemporalError> {
        check_width::<A>(batch.width())?;
        let (index, created) = self.locate_or_create(interval)?;
        let mut report = IngestReport {
            created: usize::from(created),
            ..IngestReport::default()
        };
        report.absorb_merge(self.intervals[index].data.merge(epoch, batch));
        log_rejections(&report);
        Ok(report)
    }

    /// Make `interval` hold a constant packed value.
    pub fn set_constant(
        &mut self,
        interval: &TimeInterval,
        value: &[f64],
    ) -> Result<IngestReport, TemporalError> {
        check_width::<A>(value.len())?;
        let (index, created) = self.locate_or_create(interval)?;
        self.intervals[index].data.set_constant(value.to_vec());
        Ok(IngestReport {
            created: usize::from(created),
            ..IngestReport::default()
        })
    }

    /// Retune the table of the interval bounded exactly by `start`/`stop`.
    /// Returns false when there is no such interval.
    pub fn set_interpolation(
        &mut self,
        start: TimeStamp,
        stop: TimeStamp,
        algorithm: Option<InterpolationAlgorithm>,
        degree: Option<u32>,
    ) -> bool {
        match self.intervals.find_interval_mut(start, stop) {
            Some(interval) => {
                interval
                    .data
                    .set_interpolation(algorithm, degree, self.registry);
                true
            }
            None => false,
        }
    }

    /// Discard the interval bounded exactly by `start`/`stop` with its
    /// scratch buffers.
    pub fn remove_interval(
        &mut self,
        start: TimeStamp,
        stop: TimeStamp,
    ) -> Option<TimeInterval<SampleTable>> {
        let removed = self.intervals.remove_interval(start, stop)?;
        self.scratch.release(removed.data.id());
        Some(removed)
    }

    /// Create-on-first-use entry point for owners holding an optional
    /// property. Returns true if `slot` was empty and now holds a property.
    /// Nothing is stored when the first packet fails.
    pub fn process_packet(
        slot: &mut Option<Self>,
        packet: &Packet,
        constrain: Option<&TimeInterval>,
    ) -> Result<bool, TemporalError>
    where
        A: Default,
    {
        match slot {
            Some(property) => property.add_packet(packet, constrain).map(|_| false),
            None => {
                let mut property = Self::default();
                property.add_packet(packet, constrain)?;
                *slot = Some(property);
                Ok(true)
            }
        }
    }

    fn apply_packet(
        &mut self,
        packet: &Packet,
        raw: Option<RawInterval>,
        constrain: Option<&TimeInterval>,
    ) -> Result<IngestReport, TemporalError> {
        let mut interval = packet.interval()?;
        if interval.is_empty() {
            return Err(TemporalError::malformed(format!(
                "interval {}/{} is empty",
                interval.start, interval.stop
            )));
        }
        let algorithm = packet.algorithm()?;
        let epoch = packet.epoch()?;

        let Some(raw) = raw else {
            return Ok(IngestReport::default());
        };
        if let Some(constrain) = constrain {
            match interval.intersect(constrain) {
                Some(clipped) => interval = clipped,
                None => {
                    debug!(
                        "packet interval {}/{} misses constraint {}/{}",
                        interval.start, interval.stop, constrain.start, constrain.stop
                    );
                    return Ok(IngestReport::default());
                }
            }
        }

        let (index, created) = self.locate_or_create(&interval)?;
        let mut report = IngestReport {
            created: usize::from(created),
            ..IngestReport::default()
        };
        let table = &mut self.intervals[index].data;
        match raw {
            RawInterval::Sampled(batch) => {
                table.set_interpolation(algorithm, packet.interpolation_degree, self.registry);
                report.absorb_merge(table.merge(epoch, &batch));
            }
            RawInterval::Constant(value) => table.set_constant(value),
        }
        log_rejections(&report);
        Ok(report)
    }

    /// Index of the interval with exactly these bounds, inserting a fresh
    /// table when none exists. An interval with the same start and stop but
    /// different inclusivity is re-inserted with the new flags.
    fn locate_or_create(&mut self, interval: &TimeInterval) -> Result<(usize, bool), TemporalError> {
        if interval.is_empty() {
            return Err(TemporalError::malformed(format!(
                "interval {}/{} is empty",
                interval.start, interval.stop
            )));
        }

        if let Some(index) = self.intervals.position(interval.start, interval.stop) {
            if self.intervals[index].same_bounds(interval) {
                return Ok((index, false));
            }
            if let Some(existing) = self.intervals.remove_interval(interval.start, interval.stop) {
                let index = self.insert(interval.clone().with_data(existing.data))?;
                return Ok((index, false));
            }
        }

        let table = SampleTable::new(self.ids.alloc_table(), &self.cfg, self.registry);
        debug!(
            "new {:?} table {:?} for {}/{}",
            A::KIND,
            table.id(),
            interval.start,
            interval.stop
        );
        let index = self.insert(interval.clone().with_data(table))?;
        Ok((index, true))
    }

    /// Overlay `interval`, giving the left piece of a split table its own
    /// id and releasing the scratch buffers of displaced tables.
    fn insert(&mut self, interval: TimeInterval<SampleTable>) -> Result<usize, TemporalError> {
        let (start, stop) = (interval.start, interval.stop);
        let ids = &mut self.ids;
        let overlay = self
            .intervals
            .overlay(interval, |table| {
                let forked = table.fork(ids.alloc_table());
                debug!("split table {:?} into {:?}", table.id(), forked.id());
                forked
            })
            .ok_or_else(|| TemporalError::malformed(format!("interval {start}/{stop} is empty")))?;
        for table in overlay.displaced {
            debug!("table {:?} displaced by {start}/{stop}", table.id());
            self.scratch.release(table.id());
        }
        Ok(overlay.index)
    }

    // --- Queries ---

    /// Value at `time`, or `None` when no interval covers it or its table is
    /// empty. Interpolation failures are logged and read as `None`.
    pub fn get_value(&mut self, time: TimeStamp) -> Option<A::Value> {
        match self.try_get_value(time) {
            Ok(value) => value,
            Err(err) => {
                warn!("get_value at {time}: {err}");
                None
            }
        }
    }

    pub fn try_get_value(&mut self, time: TimeStamp) -> Result<Option<A::Value>, TemporalError> {
        let Some(interval) = self.intervals.find_interval_containing(time) else {
            return Ok(None);
        };
        sample_table(
            &self.adapter,
            &interval.data,
            time,
            &mut self.scratch,
            self.registry,
        )
    }

    /// Type-erased [`get_value`](Self::get_value).
    #[inline]
    pub fn value_at(&mut self, time: TimeStamp) -> Option<Value> {
        self.get_value(time).map(Into::into)
    }
}

fn check_width<A: ValueAdapter>(width: usize) -> Result<(), TemporalError> {
    if width != A::DOUBLES_PER_VALUE {
        return Err(TemporalError::malformed(format!(
            "{:?} values are {} numbers wide, got {width}",
            A::KIND,
            A::DOUBLES_PER_VALUE
        )));
    }
    Ok(())
}

fn log_rejections(report: &IngestReport) {
    if !report.rejected.is_empty() {
        warn!(
            "{} sample(s) rejected, {} inserted, {} overwritten",
            report.rejected.len(),
            report.inserted,
            report.overwritten
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{Cartesian3Adapter, ScalarAdapter};
    use crate::value::Cartesian3;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn ts(s: f64) -> TimeStamp {
        TimeStamp::from_seconds(s).unwrap()
    }

    fn packet(v: serde_json::Value) -> Packet {
        Packet::from_json(&v).unwrap()
    }

    fn scalar_samples(pairs: &[(f64, f64)]) -> SampleBatch {
        SampleBatch::from_pairs(1, pairs.iter().map(|&(t, v)| (ts(t), [v]))).unwrap()
    }

    fn times(p: &DynamicProperty<ScalarAdapter>) -> Vec<f64> {
        p.intervals()
            .get(0)
            .unwrap()
            .data
            .times()
            .iter()
            .map(TimeStamp::as_seconds)
            .collect()
    }

    #[test]
    fn linear_packet_midpoint() {
        let mut p = DynamicProperty::<ScalarAdapter>::default();
        let report = p
            .add_packet(
                &packet(json!({"epoch": "1970-01-01T00:00:00Z", "number": [0, 0, 10, 10]})),
                None,
            )
            .unwrap();
        assert_eq!(report.created, 1);
        assert_eq!(report.inserted, 2);
        assert_relative_eq!(p.get_value(ts(5.0)).unwrap(), 5.0);
        assert_eq!(p.get_value(ts(10.0)), Some(10.0));
        assert_eq!(p.value_at(ts(0.0)), Some(Value::Scalar(0.0)));
    }

    #[test]
    fn stop_inclusivity_decides_the_boundary() {
        let mut p = DynamicProperty::<ScalarAdapter>::default();
        let half_open = TimeInterval::new(ts(0.0), ts(10.0), true, false, ());
        p.add_samples(&half_open, &scalar_samples(&[(0.0, 0.0), (10.0, 10.0)]), None)
            .unwrap();
        assert_eq!(p.get_value(ts(10.0)), None);
        assert_eq!(p.get_value(ts(10.5)), None);

        let closed = TimeInterval::closed(ts(0.0), ts(10.0));
        let report = p
            .add_samples(&closed, &scalar_samples(&[]), None)
            .unwrap();
        assert_eq!(report.created, 0);
        assert_eq!(p.intervals().len(), 1);
        assert_eq!(p.get_value(ts(10.0)), Some(10.0));
    }

    #[test]
    fn out_of_order_packets_match_in_order() {
        let mut shuffled = DynamicProperty::<ScalarAdapter>::default();
        for (t, v) in [(5.0, 50.0), (1.0, 10.0), (9.0, 90.0), (3.0, 30.0)] {
            shuffled
                .add_samples(&TimeInterval::INFINITE, &scalar_samples(&[(t, v)]), None)
                .unwrap();
        }
        let mut ordered = DynamicProperty::<ScalarAdapter>::default();
        ordered
            .add_samples(
                &TimeInterval::INFINITE,
                &scalar_samples(&[(1.0, 10.0), (3.0, 30.0), (5.0, 50.0), (9.0, 90.0)]),
                None,
            )
            .unwrap();

        assert_eq!(times(&shuffled), vec![1.0, 3.0, 5.0, 9.0]);
        assert_eq!(times(&shuffled), times(&ordered));
        assert_eq!(
            shuffled.intervals().get(0).unwrap().data.values(),
            ordered.intervals().get(0).unwrap().data.values()
        );
    }

    #[test]
    fn resubmitted_sample_overwrites() {
        let mut p = DynamicProperty::<ScalarAdapter>::default();
        let all = TimeInterval::INFINITE;
        p.add_samples(&all, &scalar_samples(&[(0.0, 1.0), (2.0, 3.0)]), None)
            .unwrap();
        let report = p.add_samples(&all, &scalar_samples(&[(2.0, 7.0)]), None).unwrap();
        assert_eq!(report.overwritten, 1);
        assert_eq!(times(&p).len(), 2);
        assert_eq!(p.get_value(ts(2.0)), Some(7.0));
    }

    #[test]
    fn unknown_algorithm_changes_nothing() {
        let mut p = DynamicProperty::<ScalarAdapter>::default();
        p.add_packet(
            &packet(json!({
                "epoch": "1970-01-01T00:00:00Z",
                "interpolationAlgorithm": "LAGRANGE",
                "interpolationDegree": 2,
                "number": [0, 0, 1, 1, 2, 4]
            })),
            None,
        )
        .unwrap();

        let err = p
            .add_packet(
                &packet(json!({
                    "epoch": "1970-01-01T00:00:00Z",
                    "interpolationAlgorithm": "SPLINE",
                    "number": [3, 9]
                })),
                None,
            )
            .unwrap_err();
        assert!(matches!(err, TemporalError::UnknownAlgorithm { .. }));

        let table = &p.intervals().get(0).unwrap().data;
        assert_eq!(table.algorithm(), InterpolationAlgorithm::Lagrange);
        assert_eq!(table.degree(), 2);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn malformed_interval_leaves_state() {
        let mut p = DynamicProperty::<ScalarAdapter>::default();
        p.add_packet(&packet(json!({"number": 4})), None).unwrap();
        let err = p
            .add_packet(&packet(json!({"interval": "soon/later", "number": 5})), None)
            .unwrap_err();
        assert_eq!(err.category(), "packet");
        assert_eq!(p.get_value(ts(123.0)), Some(4.0));
    }

    #[test]
    fn constant_then_samples_then_constant() {
        let mut p = DynamicProperty::<ScalarAdapter>::default();
        p.add_packet(&packet(json!({"number": 4})), None).unwrap();
        assert_eq!(p.get_value(ts(-1e9)), Some(4.0));

        p.add_packet(
            &packet(json!({"epoch": "1970-01-01T00:00:00Z", "number": [0, 0, 10, 20]})),
            None,
        )
        .unwrap();
        assert_relative_eq!(p.get_value(ts(5.0)).unwrap(), 10.0);

        p.add_packet(&packet(json!(7)), None).unwrap();
        assert_eq!(p.get_value(ts(5.0)), Some(7.0));
    }

    #[test]
    fn constraint_clips_packet_interval() {
        let mut p = DynamicProperty::<ScalarAdapter>::default();
        let window = TimeInterval::closed(ts(100.0), ts(200.0));
        p.add_packet(&packet(json!({"number": 1})), Some(&window)).unwrap();
        assert_eq!(p.get_value(ts(150.0)), Some(1.0));
        assert_eq!(p.get_value(ts(99.0)), None);

        let report = p
            .add_packet(
                &packet(json!({
                    "interval": "1970-01-01T00:00:00Z/1970-01-01T00:00:50Z",
                    "number": 2
                })),
                Some(&window),
            )
            .unwrap();
        assert_eq!(report, IngestReport::default());
        assert_eq!(p.intervals().len(), 1);
    }

    #[test]
    fn rejected_samples_are_reported() {
        let mut p = DynamicProperty::<ScalarAdapter>::default();
        // numeric offsets with no epoch cannot be resolved
        let report = p
            .add_packet(&packet(json!({"number": [0, 1, 5, 2]})), None)
            .unwrap();
        assert_eq!(report.rejected.len(), 2);
        assert!(report.clone().into_result().is_err());
        assert_eq!(p.get_value(ts(0.0)), None);
    }

    #[test]
    fn add_packets_keeps_going() {
        let mut p = DynamicProperty::<ScalarAdapter>::default();
        let packets = Packet::parse_many(
            r#"[
                {"epoch": "1970-01-01T00:00:00Z", "number": [0, 0]},
                {"interpolationAlgorithm": "NOPE", "number": 1},
                {"epoch": "1970-01-01T00:00:00Z", "number": [4, 8]}
            ]"#,
        )
        .unwrap();
        let report = p.add_packets(&packets, None);
        assert_eq!(report.inserted, 2);
        assert_eq!(report.dropped.len(), 1);
        assert_eq!(report.dropped[0].0, 1);
        assert_relative_eq!(p.get_value(ts(2.0)).unwrap(), 4.0);
    }

    #[test]
    fn wrong_width_is_malformed() {
        let mut p = DynamicProperty::<Cartesian3Adapter>::default();
        assert!(p.set_constant(&TimeInterval::INFINITE, &[1.0]).is_err());
        p.set_constant(&TimeInterval::INFINITE, &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(p.get_value(ts(0.0)), Some(Cartesian3::new(1.0, 2.0, 3.0)));
        assert!(p
            .add_samples(&TimeInterval::INFINITE, &scalar_samples(&[(0.0, 1.0)]), None)
            .is_err());
    }

    #[test]
    fn set_interpolation_and_remove() {
        let mut p = DynamicProperty::<ScalarAdapter>::default();
        let iv = TimeInterval::closed(ts(0.0), ts(10.0));
        p.add_samples(
            &iv,
            &scalar_samples(&[(0.0, 0.0), (1.0, 1.0), (2.0, 4.0), (3.0, 9.0)]),
            None,
        )
        .unwrap();
        assert!(p.set_interpolation(
            ts(0.0),
            ts(10.0),
            Some(InterpolationAlgorithm::Lagrange),
            Some(2)
        ));
        assert!(!p.set_interpolation(ts(0.0), ts(11.0), None, Some(3)));
        assert_relative_eq!(p.get_value(ts(1.5)).unwrap(), 2.25, epsilon = 1e-12);
        assert_eq!(p.scratch().len(), 1);

        let removed = p.remove_interval(ts(0.0), ts(10.0)).unwrap();
        assert_eq!(removed.data.len(), 4);
        assert!(p.scratch().is_empty());
        assert_eq!(p.get_value(ts(1.5)), None);
    }

    #[test]
    fn process_packet_creates_once() {
        let mut slot: Option<DynamicProperty<ScalarAdapter>> = None;
        assert!(DynamicProperty::process_packet(&mut slot, &packet(json!({"number": 1})), None).unwrap());
        assert!(!DynamicProperty::process_packet(&mut slot, &packet(json!({"number": 2})), None).unwrap());
        assert_eq!(slot.as_mut().unwrap().get_value(ts(0.0)), Some(2.0));

        let mut empty: Option<DynamicProperty<ScalarAdapter>> = None;
        assert!(DynamicProperty::process_packet(
            &mut empty,
            &packet(json!({"interval": "x", "number": 1})),
            None
        )
        .is_err());
        assert!(empty.is_none());
    }

    fn iso(text: &str) -> TimeStamp {
        TimeStamp::from_iso8601(text).unwrap()
    }

    #[test]
    fn overlapping_packet_trims_existing_table() {
        let mut p = DynamicProperty::<ScalarAdapter>::default();
        p.add_packet(
            &packet(json!({
                "interval": "2012-03-15T10:00:00Z/2012-03-15T11:00:00Z",
                "epoch": "2012-03-15T10:00:00Z",
                "number": [0, 0, 3600, 3600]
            })),
            None,
        )
        .unwrap();
        let original = p.intervals().get(0).unwrap().data.id();
        assert_relative_eq!(p.get_value(iso("2012-03-15T10:15:00Z")).unwrap(), 900.0);

        let report = p
            .add_packet(
                &packet(json!({
                    "interval": "2012-03-15T10:30:00Z/2012-03-15T11:30:00Z",
                    "number": 5
                })),
                None,
            )
            .unwrap();
        assert_eq!(report.created, 1);
        assert_eq!(p.intervals().len(), 2);

        let trimmed = p.intervals().get(0).unwrap();
        assert_eq!(trimmed.data.id(), original);
        assert_eq!(trimmed.stop, iso("2012-03-15T10:30:00Z"));
        assert!(!trimmed.is_stop_included);

        assert_relative_eq!(p.get_value(iso("2012-03-15T10:15:00Z")).unwrap(), 900.0);
        assert_eq!(p.get_value(iso("2012-03-15T10:30:00Z")), Some(5.0));
        assert_eq!(p.get_value(iso("2012-03-15T11:15:00Z")), Some(5.0));
        assert_eq!(p.scratch().len(), 1);
        assert_eq!(p.scratch().reallocations(), 1);
    }

    #[test]
    fn split_halves_get_their_own_tables() {
        let mut p = DynamicProperty::<ScalarAdapter>::default();
        let samples: Vec<(f64, f64)> = (0..=10).map(|i| (i as f64, i as f64)).collect();
        p.add_samples(
            &TimeInterval::closed(ts(0.0), ts(10.0)),
            &scalar_samples(&samples),
            None,
        )
        .unwrap();
        p.set_constant(&TimeInterval::closed(ts(4.0), ts(5.0)), &[-1.0])
            .unwrap();

        let ids: Vec<_> = p.intervals().iter().map(|iv| iv.data.id()).collect();
        assert_eq!(ids.len(), 3);
        assert_ne!(ids[0], ids[1]);
        assert_ne!(ids[0], ids[2]);
        assert_ne!(ids[1], ids[2]);
        assert_eq!(p.get_value(ts(4.5)), Some(-1.0));

        assert!(p.set_interpolation(
            ts(5.0),
            ts(10.0),
            Some(InterpolationAlgorithm::Lagrange),
            Some(3)
        ));
        for _ in 0..5 {
            assert_relative_eq!(p.get_value(ts(1.5)).unwrap(), 1.5, epsilon = 1e-12);
            assert_relative_eq!(p.get_value(ts(8.5)).unwrap(), 8.5, epsilon = 1e-12);
        }
        assert_eq!(p.scratch().len(), 2);
        assert_eq!(p.scratch().reallocations(), 2);

        // Dropping one half keeps the other's buffers.
        assert!(p.remove_interval(ts(0.0), ts(4.0)).is_some());
        assert_eq!(p.scratch().len(), 1);
        assert_relative_eq!(p.get_value(ts(8.5)).unwrap(), 8.5, epsilon = 1e-12);
        assert_eq!(p.scratch().reallocations(), 2);
    }

    #[test]
    fn covering_overlay_releases_scratch() {
        let mut p = DynamicProperty::<ScalarAdapter>::default();
        for k in 0..50 {
            let start = 2.0 * k as f64;
            p.add_samples(
                &TimeInterval::closed(ts(start), ts(start + 1.0)),
                &scalar_samples(&[(start, 0.0), (start + 1.0, 1.0)]),
                None,
            )
            .unwrap();
            assert_relative_eq!(p.get_value(ts(start + 0.5)).unwrap(), 0.5);
        }
        assert_eq!(p.intervals().len(), 50);
        assert_eq!(p.scratch().len(), 50);

        p.set_constant(&TimeInterval::closed(ts(-1.0), ts(1000.0)), &[7.0])
            .unwrap();
        assert_eq!(p.intervals().len(), 1);
        assert!(p.scratch().is_empty());
        assert_eq!(p.get_value(ts(42.5)), Some(7.0));
    }

    #[test]
    fn huge_degree_packet_on_short_table() {
        let mut p = DynamicProperty::<ScalarAdapter>::default();
        p.add_packet(
            &packet(json!({
                "epoch": "1970-01-01T00:00:00Z",
                "interpolationAlgorithm": "LAGRANGE",
                "interpolationDegree": 4_000_000_000u32,
                "number": [0, 0, 10, 10]
            })),
            None,
        )
        .unwrap();
        assert_relative_eq!(p.get_value(ts(5.0)).unwrap(), 5.0, epsilon = 1e-12);
    }
}
