/// Bit-width analysis and encoding selection
///
/// `BitWidthAnalyzer` computes the single canonical bit width used by every
/// codec in this crate. `CompressionSelector` estimates the compressed size
/// of each built-in encoding and picks the smallest one.
use crate::common::allocator::MemoryPool;
use crate::common::constants::{
    BITPACKING_HEADER_SIZE, BITPACKING_PADDING_BYTES, BLOCK_HEADER_SIZE, DEFAULT_BLOCK_SIZE,
    NULL_FILLER,
};
use crate::common::error::PrismPackError;
use crate::common::helper::{div_round_up, fits_in_bits, packed_byte_len};
use crate::storage::compression::frame_of_reference::FrameOfReferenceCodec;
use crate::storage::compression::traits::CompressionResult;
use crate::storage::compression::types::{AnalyzeResult, EncodingType};
use crate::storage::compression::varbyte::VarByteCodec;
use crate::storage::segment::{Segment, SegmentEncoder};

/// Computes the minimal bit width of a column's value domain.
///
/// The width is the bit length of the bitwise OR of all values, not of a
/// running maximum. Both are equal: OR never sets a bit that no input has,
/// so OR < 2^bitlen(max), and OR >= max. Keep the OR; it is branch-free.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitWidthAnalyzer {
    accumulated: u32,
}

impl BitWidthAnalyzer {
    pub fn new() -> Self {
        Self { accumulated: 0 }
    }

    /// Bit width in [1, 32] for `values`; 1 for empty or all-zero input
    pub fn analyze<I: IntoIterator<Item = u32>>(values: I) -> u8 {
        let mut analyzer = Self::new();
        analyzer.update(values);
        analyzer.bit_width()
    }

    #[inline]
    pub fn observe(&mut self, value: u32) {
        self.accumulated |= value;
    }

    pub fn update<I: IntoIterator<Item = u32>>(&mut self, values: I) {
        self.accumulated = values
            .into_iter()
            .fold(self.accumulated, |acc, value| acc | value);
    }

    pub fn bit_width(&self) -> u8 {
        Self::bit_width_of(self.accumulated)
    }

    /// Bit length of `value`, at least 1
    #[inline]
    pub fn bit_width_of(value: u32) -> u8 {
        (32 - value.leading_zeros()).max(1) as u8
    }

    /// Explicit domain check reporting the first value wider than `bit_width`
    pub fn check_domain(values: &[u32], bit_width: u8) -> CompressionResult<()> {
        match values
            .iter()
            .position(|value| !fits_in_bits(*value, bit_width))
        {
            Some(index) => Err(PrismPackError::DomainViolation {
                index,
                value: values[index],
                bit_width,
            }),
            None => Ok(()),
        }
    }
}

/// Compression selector that estimates every built-in encoding
pub struct CompressionSelector {
    /// Values per block for block-based encodings
    block_size: usize,
}

impl CompressionSelector {
    /// Creates a new compression selector with default settings
    pub fn new() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }

    /// Creates a compression selector with a custom block size
    pub fn with_block_size(block_size: usize) -> Self {
        Self {
            block_size: block_size.max(1),
        }
    }

    /// Estimates the size of every built-in encoding for `values`
    pub fn analyze_all(&self, values: &[u32]) -> Vec<AnalyzeResult> {
        let original_size = std::mem::size_of_val(values);
        vec![
            AnalyzeResult::new(
                EncodingType::Bitpacking,
                original_size,
                Self::estimate_bitpacking(values),
            ),
            AnalyzeResult::new(
                EncodingType::FrameOfReference,
                original_size,
                self.estimate_blocks(values, FrameOfReferenceCodec::encoded_block_len),
            ),
            AnalyzeResult::new(
                EncodingType::VarByte,
                original_size,
                self.estimate_blocks(values, VarByteCodec::encoded_block_len),
            ),
        ]
    }

    /// Selects the encoding with the smallest estimated size.
    ///
    /// Ties favor bit-packing, which has the cheapest point access.
    pub fn select_encoding(&self, values: &[u32]) -> EncodingType {
        if values.is_empty() {
            return EncodingType::Bitpacking;
        }

        let results = self.analyze_all(values);
        let mut best = &results[0];
        for result in results.iter().skip(1) {
            if result.estimated_size < best.estimated_size {
                best = result;
            }
        }
        best.encoding_type
    }

    fn estimate_bitpacking(values: &[u32]) -> usize {
        if values.is_empty() {
            return BITPACKING_HEADER_SIZE;
        }
        let bit_width = BitWidthAnalyzer::analyze(values.iter().copied());
        BITPACKING_HEADER_SIZE + packed_byte_len(values.len(), bit_width) + BITPACKING_PADDING_BYTES
    }

    fn estimate_blocks(&self, values: &[u32], block_len: fn(&[u32]) -> usize) -> usize {
        let num_blocks = div_round_up(values.len(), self.block_size);
        let mut padded = Vec::with_capacity(self.block_size);
        let mut payload = 0;
        for chunk in values.chunks(self.block_size) {
            if chunk.len() == self.block_size {
                payload += block_len(chunk);
            } else {
                // the compressor pads the tail block by repeating its last value
                padded.clear();
                padded.extend_from_slice(chunk);
                padded.resize(self.block_size, chunk[chunk.len() - 1]);
                payload += block_len(&padded);
            }
        }
        BLOCK_HEADER_SIZE + (num_blocks + 1) * 4 + payload
    }
}

impl Default for CompressionSelector {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to encode values with the smallest estimated encoding
pub fn auto_encode(values: &[Option<u32>], pool: &MemoryPool) -> CompressionResult<Segment> {
    let raw: Vec<u32> = values.iter().map(|value| value.unwrap_or(NULL_FILLER)).collect();
    let encoding = CompressionSelector::new().select_encoding(&raw);
    SegmentEncoder::new(encoding).encode(values, pool)
}
