use crate::common::helper::ChunkOffset;
use serde::{Deserialize, Serialize};

/// Ordered list of logical positions requested by a query operator.
///
/// Positions may be unsorted and may repeat; consumers answer them in list
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionList {
    data: Vec<ChunkOffset>,
}

impl PositionList {
    /// Create a new empty position list with capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Create a position list with sequential positions [0, 1, 2, ..., count-1]
    pub fn sequential(count: usize) -> Self {
        Self {
            data: (0..count).collect(),
        }
    }

    /// Create a position list from existing positions
    pub fn from_indices(indices: Vec<ChunkOffset>) -> Self {
        Self { data: indices }
    }

    /// Get the position at a specific index of the list
    #[inline]
    pub fn get_index(&self, index: usize) -> ChunkOffset {
        debug_assert!(
            index < self.data.len(),
            "Index {} out of bounds (count: {})",
            index,
            self.data.len()
        );
        self.data[index]
    }

    /// Append a position
    #[inline]
    pub fn append(&mut self, position: ChunkOffset) {
        self.data.push(position);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[ChunkOffset] {
        &self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChunkOffset> {
        self.data.iter()
    }

    /// Largest referenced position, if any
    pub fn max_position(&self) -> Option<ChunkOffset> {
        self.data.iter().copied().max()
    }
}

impl From<Vec<ChunkOffset>> for PositionList {
    fn from(indices: Vec<ChunkOffset>) -> Self {
        Self::from_indices(indices)
    }
}

impl FromIterator<ChunkOffset> for PositionList {
    fn from_iter<I: IntoIterator<Item = ChunkOffset>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PositionList {
    type Item = &'a ChunkOffset;
    type IntoIter = std::slice::Iter<'a, ChunkOffset>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}
