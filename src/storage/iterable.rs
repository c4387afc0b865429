//! Segment iterators consumed by query operators
//!
//! `SegmentIterable` hands out two iterator kinds:
//! - `SegmentIterator`: full scan over positions `0..size`, usable from both
//!   ends and restartable. Block segments are decoded once per scan.
//! - `PointAccessIterator`: reads the positions of a `PositionList` in list
//!   order, duplicates included, through a lazy single-block cache.
//!
//! Both record their access pattern in the segment's access counter.

use crate::common::error::PrismPackResult;
use crate::common::helper::ChunkOffset;
use crate::invalid_argument;
use crate::storage::access_counter::AccessType;
use crate::storage::compression::decompressor::VectorDecompressor;
use crate::storage::compression::traits::BaseVectorDecompressor;
use crate::storage::compression::types::DecompressionMode;
use crate::storage::segment::Segment;
use crate::types::PositionList;

/// Value read from a segment during a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentPosition {
    /// Decoded value, None for null positions
    pub value: Option<u32>,
    /// Logical position inside the segment
    pub chunk_offset: ChunkOffset,
}

impl SegmentPosition {
    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }
}

/// Value read for one entry of a position list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointAccessPosition {
    /// Decoded value, None for null positions
    pub value: Option<u32>,
    /// Logical position inside the segment
    pub chunk_offset: ChunkOffset,
    /// Index of the entry in the position list
    pub offset_in_poslist: usize,
}

impl PointAccessPosition {
    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }
}

/// Iterator factory over one segment
#[derive(Debug, Clone, Copy)]
pub struct SegmentIterable<'a> {
    segment: &'a Segment,
}

impl<'a> SegmentIterable<'a> {
    pub fn new(segment: &'a Segment) -> Self {
        Self { segment }
    }

    pub fn segment(&self) -> &'a Segment {
        self.segment
    }

    /// Full scan over the segment
    pub fn iter(&self) -> SegmentIterator<'a> {
        self.segment
            .access_counter()
            .increment(AccessType::Sequential, self.segment.size() as u64);
        SegmentIterator::new(self.segment)
    }

    /// Reads `positions` in list order.
    ///
    /// Fails when a position lies outside the segment.
    pub fn point_access<'p>(
        &self,
        positions: &'p PositionList,
    ) -> PrismPackResult<PointAccessIterator<'p>>
    where
        'a: 'p,
    {
        if let Some(max) = positions.max_position() {
            if max >= self.segment.size() {
                return Err(invalid_argument!(
                    "position {} out of bounds for segment of size {}",
                    max,
                    self.segment.size()
                ));
            }
        }

        self.segment
            .access_counter()
            .record_positions(positions.as_slice());
        Ok(PointAccessIterator::new(self.segment, positions.as_slice()))
    }
}

impl<'a> IntoIterator for SegmentIterable<'a> {
    type Item = SegmentPosition;
    type IntoIter = SegmentIterator<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Sequential scan over a segment
#[derive(Debug)]
pub struct SegmentIterator<'a> {
    segment: &'a Segment,
    decompressor: VectorDecompressor<'a>,
    /// Next position yielded from the front
    front: usize,
    /// One past the next position yielded from the back
    back: usize,
}

impl<'a> SegmentIterator<'a> {
    fn new(segment: &'a Segment) -> Self {
        // Eager mode decodes block vectors once; bit-packed ones are read in place
        let decompressor = segment
            .compressed_vector()
            .create_decompressor(DecompressionMode::Eager);
        Self {
            segment,
            decompressor,
            front: 0,
            back: segment.size(),
        }
    }

    /// Moves the front of the scan to `position`.
    ///
    /// The back end stays where it is, so positions already taken with
    /// `next_back` are not yielded again; use `reset` to reopen them.
    /// Seeking past the back end leaves the scan empty.
    pub fn seek(&mut self, position: ChunkOffset) {
        self.front = position.min(self.back);
    }

    /// Restarts the scan over the whole segment
    pub fn reset(&mut self) {
        self.front = 0;
        self.back = self.segment.size();
    }

    /// Reads an arbitrary position without moving the scan
    pub fn position_value(&mut self, position: ChunkOffset) -> SegmentPosition {
        let value = if self.segment.is_null(position) {
            None
        } else {
            Some(self.decompressor.get(position))
        };
        SegmentPosition {
            value,
            chunk_offset: position,
        }
    }
}

impl<'a> Iterator for SegmentIterator<'a> {
    type Item = SegmentPosition;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let position = self.front;
        self.front += 1;
        Some(self.position_value(position))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back.saturating_sub(self.front);
        (remaining, Some(remaining))
    }
}

impl<'a> DoubleEndedIterator for SegmentIterator<'a> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(self.position_value(self.back))
    }
}

impl<'a> ExactSizeIterator for SegmentIterator<'a> {}

/// Position-list driven reads, yielded in list order
#[derive(Debug)]
pub struct PointAccessIterator<'a> {
    segment: &'a Segment,
    positions: &'a [ChunkOffset],
    decompressor: VectorDecompressor<'a>,
    front: usize,
    back: usize,
}

impl<'a> PointAccessIterator<'a> {
    fn new(segment: &'a Segment, positions: &'a [ChunkOffset]) -> Self {
        let decompressor = segment
            .compressed_vector()
            .create_decompressor(DecompressionMode::Lazy);
        Self {
            segment,
            positions,
            decompressor,
            front: 0,
            back: positions.len(),
        }
    }

    /// Whole-block decodes performed so far
    pub fn block_decodes(&self) -> usize {
        self.decompressor.block_decodes()
    }

    fn read(&mut self, offset_in_poslist: usize) -> PointAccessPosition {
        let chunk_offset = self.positions[offset_in_poslist];
        let value = if self.segment.is_null(chunk_offset) {
            None
        } else {
            Some(self.decompressor.get(chunk_offset))
        };
        PointAccessPosition {
            value,
            chunk_offset,
            offset_in_poslist,
        }
    }
}

impl<'a> Iterator for PointAccessIterator<'a> {
    type Item = PointAccessPosition;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let offset = self.front;
        self.front += 1;
        Some(self.read(offset))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<'a> DoubleEndedIterator for PointAccessIterator<'a> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(self.read(self.back))
    }
}

impl<'a> ExactSizeIterator for PointAccessIterator<'a> {}
