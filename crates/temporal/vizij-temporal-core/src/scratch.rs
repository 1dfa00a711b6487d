//! Scratch buffers for interpolation.
//!
//! Each sample table gets its own `x_table`/`y_table`/result buffers, keyed
//! by [`TableId`]. Buffers are resized only when the table's window shape
//! (point count, interpolation width) changes; otherwise queries reuse them.

use hashbrown::HashMap;

use crate::config::Config;
use crate::ids::TableId;

#[derive(Debug, Default, Clone)]
pub struct InterpScratch {
    x_table: Vec<f64>,
    y_table: Vec<f64>,
    result: Vec<f64>,
    shape: (usize, usize),
}

impl InterpScratch {
    /// Size the buffers for `number_of_points` points of `width` numbers.
    /// Returns true if they had to be reallocated.
    pub fn ensure_shape(&mut self, number_of_points: usize, width: usize) -> bool {
        if self.shape == (number_of_points, width) && !self.x_table.is_empty() {
            return false;
        }
        self.x_table = vec![0.0; number_of_points];
        self.y_table = vec![0.0; number_of_points * width];
        self.result = vec![0.0; width];
        self.shape = (number_of_points, width);
        true
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    /// Borrow the first `length` points of each table plus the result buffer.
    #[inline]
    pub fn tables(&mut self, length: usize) -> (&mut [f64], &mut [f64], &mut [f64]) {
        let width = self.shape.1;
        (
            &mut self.x_table[..length],
            &mut self.y_table[..length * width],
            &mut self.result[..],
        )
    }
}

#[derive(Debug, Default, Clone)]
pub struct Scratch {
    tables: HashMap<TableId, InterpScratch>,
    reallocations: usize,
}

impl Scratch {
    pub fn new(cfg: &Config) -> Self {
        Self {
            tables: HashMap::with_capacity(cfg.scratch_tables),
            reallocations: 0,
        }
    }

    /// Buffers for `id`, shaped for the table's current window.
    pub fn for_table(&mut self, id: TableId, number_of_points: usize, width: usize) -> &mut InterpScratch {
        let entry = self.tables.entry(id).or_default();
        if entry.ensure_shape(number_of_points, width) {
            self.reallocations += 1;
        }
        entry
    }

    /// Drop the buffers of a discarded table.
    pub fn release(&mut self, id: TableId) {
        self.tables.remove(&id);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// How many times any buffer set was (re)allocated.
    #[inline]
    pub fn reallocations(&self) -> usize {
        self.reallocations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reuses_until_shape_changes() {
        let mut scratch = Scratch::new(&Config::default());
        let id = TableId(7);
        scratch.for_table(id, 2, 3);
        scratch.for_table(id, 2, 3);
        assert_eq!(scratch.reallocations(), 1);

        let buffers = scratch.for_table(id, 4, 3);
        assert_eq!(buffers.shape(), (4, 3));
        let (x, y, r) = buffers.tables(3);
        assert_eq!((x.len(), y.len(), r.len()), (3, 9, 3));
        assert_eq!(scratch.reallocations(), 2);

        scratch.release(id);
        assert!(scratch.is_empty());
    }
}
