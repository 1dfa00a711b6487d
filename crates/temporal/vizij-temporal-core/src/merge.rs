//! Sorted in-place merge of new samples into a sample table.
//!
//! `times` stays strictly increasing and `values` stays `times.len() * width`
//! long after every call; no full re-sort is ever performed. For each new
//! entry:
//! - exact time match: overwrite that slot's numbers (last writer wins)
//! - otherwise: open an insertion run at the search point and keep taking
//!   entries while each is strictly after the previous one taken and strictly
//!   before the existing time at the insertion point, then splice the run in
//!   with one call per array and search again for the next entry

use log::{debug, warn};

use crate::error::TemporalError;
use crate::packet::SampleBatch;
use crate::time::TimeStamp;

/// What a merge did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeReport {
    /// Samples added at new times.
    pub inserted: usize,
    /// Samples that replaced an existing time's value.
    pub overwritten: usize,
    /// Contiguous splices performed.
    pub runs: usize,
    /// One `InvalidSample` per dropped entry.
    pub rejected: Vec<TemporalError>,
}

fn validate(
    batch: &SampleBatch,
    index: usize,
    epoch: Option<TimeStamp>,
) -> Result<TimeStamp, TemporalError> {
    let time = batch
        .time(index)
        .resolve(epoch)
        .map_err(|e| TemporalError::InvalidSample {
            index,
            reason: e.to_string(),
        })?;
    if let Some(bad) = batch.value(index).iter().find(|v| !v.is_finite()) {
        return Err(TemporalError::InvalidSample {
            index,
            reason: format!("value {bad} is not finite"),
        });
    }
    Ok(time)
}

/// Merge `batch` into `times`/`values`.
///
/// Entries whose time cannot be resolved or whose numbers are not finite are
/// rejected individually; the rest of the batch is still merged.
pub fn merge_new_samples(
    epoch: Option<TimeStamp>,
    times: &mut Vec<TimeStamp>,
    values: &mut Vec<f64>,
    batch: &SampleBatch,
) -> MergeReport {
    let width = batch.width();
    debug_assert_eq!(values.len(), times.len() * width);
    let mut report = MergeReport::default();

    // (resolved time, entry index in batch)
    let mut resolved: Vec<(TimeStamp, usize)> = Vec::with_capacity(batch.len());
    for index in 0..batch.len() {
        match validate(batch, index, epoch) {
            Ok(time) => resolved.push((time, index)),
            Err(err) => {
                warn!("merge: dropping sample: {err}");
                report.rejected.push(err);
            }
        }
    }

    let mut next = 0;
    while next < resolved.len() {
        let (time, entry) = resolved[next];
        match times.binary_search(&time) {
            Ok(slot) => {
                values[slot * width..(slot + 1) * width].copy_from_slice(batch.value(entry));
                report.overwritten += 1;
                next += 1;
            }
            Err(insertion) => {
                let upper = times.get(insertion).copied();
                let run_start = next;
                let mut previous: Option<TimeStamp> = None;
                while let Some(&(candidate, _)) = resolved.get(next) {
                    let out_of_order = previous.is_some_and(|p| p >= candidate);
                    let past_upper = upper.is_some_and(|u| candidate >= u);
                    if out_of_order || past_upper {
                        break;
                    }
                    previous = Some(candidate);
                    next += 1;
                }

                let run = &resolved[run_start..next];
                times.splice(insertion..insertion, run.iter().map(|&(t, _)| t));
                let at = insertion * width;
                values.splice(
                    at..at,
                    run.iter().flat_map(|&(_, e)| batch.value(e).iter().copied()),
                );
                report.inserted += run.len();
                report.runs += 1;
                debug!(
                    "merge: spliced {} sample(s) at index {insertion}",
                    run.len()
                );
            }
        }
    }

    report
}
