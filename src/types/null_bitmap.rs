use crate::common::allocator::{MemoryPool, PoolReservation};
use crate::common::error::PrismPackResult;
use crate::common::helper::div_round_up;
use serde::{Deserialize, Serialize};

/// A null bitmap for tracking null values in a segment
/// Uses a bitset for efficient storage
#[derive(Debug, Serialize, Deserialize)]
pub struct NullBitmap {
    /// Bitset where each bit represents whether the corresponding value is null (1) or valid (0)
    data: Vec<u64>,
    /// Number of entries in the bitmap
    count: usize,
    /// Pool accounting for `data`, when it was allocated from one
    #[serde(skip)]
    reservation: Option<PoolReservation>,
}

impl Clone for NullBitmap {
    /// Clones are plain heap copies outside any pool
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            count: self.count,
            reservation: None,
        }
    }
}

impl PartialEq for NullBitmap {
    fn eq(&self, other: &Self) -> bool {
        self.count == other.count && self.data == other.data
    }
}

impl Eq for NullBitmap {}

impl NullBitmap {
    /// Create a new bitmap where all entries are valid
    pub fn new(count: usize) -> Self {
        let data_size = div_round_up(count, 64); // Round up to 64-bit boundaries
        Self {
            data: vec![0u64; data_size],
            count,
            reservation: None,
        }
    }

    /// Create a bitmap where all entries are null
    pub fn all_null(count: usize) -> Self {
        let mut bitmap = Self {
            data: vec![u64::MAX; div_round_up(count, 64)],
            count,
            reservation: None,
        };
        bitmap.clear_tail();
        bitmap
    }

    /// Build a bitmap from a parallel null-indicator slice
    pub fn from_nulls(nulls: &[bool]) -> Self {
        let mut bitmap = Self::new(nulls.len());
        bitmap.mark_nulls(nulls);
        bitmap
    }

    /// Like `from_nulls`, with the words allocated from `pool`
    pub fn from_nulls_in(nulls: &[bool], pool: &MemoryPool) -> PrismPackResult<Self> {
        let words = div_round_up(nulls.len(), 64);
        let mut data = pool.allocate_vec::<u64>(words)?;
        data.resize(words, 0);
        let (data, reservation) = data.into_parts();

        let mut bitmap = Self {
            data,
            count: nulls.len(),
            reservation: Some(reservation),
        };
        bitmap.mark_nulls(nulls);
        Ok(bitmap)
    }

    fn mark_nulls(&mut self, nulls: &[bool]) {
        for (index, _) in nulls.iter().enumerate().filter(|(_, is_null)| **is_null) {
            self.set_null(index, true);
        }
    }

    /// Set the null flag of a specific entry
    pub fn set_null(&mut self, index: usize, null: bool) {
        if index >= self.count {
            return;
        }
        let word_index = index / 64;
        let bit_index = index % 64;

        if null {
            self.data[word_index] |= 1u64 << bit_index;
        } else {
            self.data[word_index] &= !(1u64 << bit_index);
        }
    }

    /// Check if a specific entry is null
    #[inline]
    pub fn is_null(&self, index: usize) -> bool {
        debug_assert!(
            index < self.count,
            "Index {} out of bounds (count: {})",
            index,
            self.count
        );
        (self.data[index / 64] >> (index % 64)) & 1 == 1
    }

    /// Check if a specific entry is valid
    #[inline]
    pub fn is_valid(&self, index: usize) -> bool {
        !self.is_null(index)
    }

    /// Get the number of entries in the bitmap
    pub fn count(&self) -> usize {
        self.count
    }

    /// Count the number of null entries
    pub fn null_count(&self) -> usize {
        self.data.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Whether any entry is null
    pub fn has_nulls(&self) -> bool {
        self.data.iter().any(|word| *word != 0)
    }

    /// Size in bytes as accounted by memory usage: one bit per entry
    pub fn byte_size(&self) -> usize {
        div_round_up(self.count, 8)
    }

    /// Deep copy into `pool`
    pub fn copy_using_allocator(&self, pool: &MemoryPool) -> PrismPackResult<Self> {
        let (data, reservation) = pool.copy_slice(&self.data)?.into_parts();
        Ok(Self {
            data,
            count: self.count,
            reservation: Some(reservation),
        })
    }

    /// Get an iterator over the null flags
    pub fn iter(&self) -> NullBitmapIterator<'_> {
        NullBitmapIterator {
            bitmap: self,
            index: 0,
        }
    }

    fn clear_tail(&mut self) {
        let tail = self.count % 64;
        if tail != 0 {
            if let Some(last) = self.data.last_mut() {
                *last &= (1u64 << tail) - 1;
            }
        }
    }
}

/// Iterator for null bitmap
pub struct NullBitmapIterator<'a> {
    bitmap: &'a NullBitmap,
    index: usize,
}

impl<'a> Iterator for NullBitmapIterator<'a> {
    type Item = bool;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.bitmap.count {
            None
        } else {
            let result = self.bitmap.is_null(self.index);
            self.index += 1;
            Some(result)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.bitmap.count - self.index;
        (remaining, Some(remaining))
    }
}
