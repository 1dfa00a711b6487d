//! Point-in-time queries against one sample table.
//!
//! Model:
//! - A constant table answers every query with its constant.
//! - A query landing exactly on a stored time returns that sample untouched.
//! - Anything else interpolates over a window of `number_of_points` samples
//!   around the query, biased toward earlier samples and clamped to the
//!   table ends (so queries outside the sampled range extrapolate).
//! - Window offsets are seconds relative to the window's last sample.

use crate::adapter::ValueAdapter;
use crate::error::TemporalError;
use crate::interp::InterpRegistry;
use crate::sample_table::{SampleTable, TableData};
use crate::scratch::Scratch;
use crate::time::TimeStamp;

/// Choose the inclusive window `(first, last)` of sample indices for a query
/// whose binary-search insertion point is `insertion` in a table of `len`
/// samples (`len >= 1`).
///
/// Tables shorter than `number_of_points` use every sample.
pub fn interpolation_window(insertion: usize, len: usize, number_of_points: usize) -> (usize, usize) {
    let last_index = len - 1;
    if len < number_of_points {
        return (0, last_index);
    }
    let index = insertion.min(last_index);
    let degree = number_of_points.saturating_sub(1);
    let mut first = index.saturating_sub(degree / 2 + 1);
    let mut last = first + degree;
    if last > last_index {
        last = last_index;
        first = last.saturating_sub(degree);
    }
    (first, last)
}

/// Value of `table` at `time`, or `None` if the table holds no data.
pub fn sample_table<A: ValueAdapter>(
    adapter: &A,
    table: &SampleTable,
    time: TimeStamp,
    scratch: &mut Scratch,
    registry: &InterpRegistry,
) -> Result<Option<A::Value>, TemporalError> {
    let (times, values) = match table.data() {
        TableData::Constant(values) if values.is_empty() => return Ok(None),
        TableData::Constant(values) => return Ok(Some(adapter.create_value(values))),
        TableData::Sampled { times, .. } if times.is_empty() => return Ok(None),
        TableData::Sampled { times, values } => (times, values),
    };

    let insertion = match times.binary_search(&time) {
        Ok(index) => {
            return Ok(Some(
                adapter.create_value_from_array(values, index * A::DOUBLES_PER_VALUE),
            ))
        }
        Err(insertion) => insertion,
    };

    let (first, last) = interpolation_window(insertion, times.len(), table.number_of_points());
    if first == last {
        // A lone sample holds for the whole interval.
        return Ok(Some(
            adapter.create_value_from_array(values, first * A::DOUBLES_PER_VALUE),
        ));
    }

    let length = last - first + 1;
    let width = A::DOUBLES_PER_INTERPOLATION_VALUE;
    // Short tables cap the window, so buffers never exceed the sample count.
    let points = table.number_of_points().min(times.len());
    let buffers = scratch.for_table(table.id(), points, width);
    let (x_table, y_table, result) = buffers.tables(length);

    let reference = times[last];
    for (slot, sample_time) in x_table.iter_mut().zip(&times[first..=last]) {
        *slot = sample_time.seconds_since(reference);
    }
    adapter.pack_values_for_interpolation(values, y_table, first, last);

    let x = time.seconds_since(reference);
    registry
        .get(table.algorithm())
        .interpolate(x, x_table, y_table, width, result)?;

    Ok(Some(adapter.create_value_from_interpolation_result(
        result, values, first, last,
    )))
}
