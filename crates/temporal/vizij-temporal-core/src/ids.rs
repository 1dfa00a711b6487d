//! Identifiers and simple allocators for core entities.

use serde::{Deserialize, Serialize};

/// Identity of one sample table; scratch buffers are keyed by it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TableId(pub u32);

/// Monotonic allocator for TableId.
#[derive(Default, Debug, Clone)]
pub struct IdAllocator {
    next_table: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_table(&mut self) -> TableId {
        let id = TableId(self.next_table);
        self.next_table = self.next_table.wrapping_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.alloc_table(), TableId(0));
        assert_eq!(alloc.alloc_table(), TableId(1));
    }
}
