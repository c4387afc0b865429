/// Fixed-width bit-packing
///
/// All values of a column are stored with the same bit width `b`, the bits
/// required by the column's largest value. Value `i` occupies bits
/// `[i*b, (i+1)*b)` of a little-endian bit stream: bit `k` of the stream is
/// bit `k % 8` of byte `k / 8`, and each value is written least significant
/// bit first. The same stream format is reused by the frame-of-reference
/// block codec.
///
/// Compression ratio is worse than per-block widths because one outlier
/// widens the whole column, but every position is addressable in O(1)
/// without any decode state.
///
/// Layout: `{bit_width: u8, logical_size: u32}` header, the packed stream of
/// `ceil(n*b/8)` bytes, then `BITPACKING_PADDING_BYTES` zero bytes so point
/// reads can load a whole u64. An empty column is header-only.
use crate::common::allocator::MemoryPool;
use crate::common::constants::{BITPACKING_HEADER_SIZE, BITPACKING_PADDING_BYTES, MAX_VECTOR_SIZE};
use crate::common::error::PrismPackError;
use crate::common::helper::{fits_in_bits, low_bits_mask, packed_byte_len};
use crate::storage::compression::analyze::BitWidthAnalyzer;
use crate::storage::compression::traits::{
    BaseVectorDecompressor, CompressionResult, VectorCompressor,
};
use crate::storage::compression::vector::CompressedVector;
use crate::{invalid_argument, invalid_layout};
use byteorder::{ByteOrder, LittleEndian};
use bytes::Bytes;
use tracing::debug;

/// Appends `values` packed at `bit_width` bits to `out` (`ceil(n*b/8)` bytes)
pub(crate) fn pack_values(values: &[u32], bit_width: u8, out: &mut Vec<u8>) {
    let mask = low_bits_mask(bit_width);
    let mut acc: u64 = 0;
    let mut acc_bits: u32 = 0;

    for &value in values {
        debug_assert!(
            fits_in_bits(value, bit_width),
            "value {} exceeds bit width {}",
            value,
            bit_width
        );
        // acc_bits < 8 here, so at most 39 bits are pending
        acc |= (u64::from(value) & mask) << acc_bits;
        acc_bits += u32::from(bit_width);
        while acc_bits >= 8 {
            out.push(acc as u8);
            acc >>= 8;
            acc_bits -= 8;
        }
    }

    if acc_bits > 0 {
        out.push(acc as u8);
    }
}

/// Reads the value at `index` from a stream packed at `bit_width` bits
#[inline]
pub(crate) fn unpack_value(bytes: &[u8], index: usize, bit_width: u8) -> u32 {
    let bit = index * bit_width as usize;
    let byte = bit / 8;
    let shift = bit % 8;

    let word = if byte + 8 <= bytes.len() {
        LittleEndian::read_u64(&bytes[byte..byte + 8])
    } else {
        let tail = &bytes[byte..];
        let mut buf = [0u8; 8];
        buf[..tail.len()].copy_from_slice(tail);
        u64::from_le_bytes(buf)
    };

    ((word >> shift) & low_bits_mask(bit_width)) as u32
}

/// Decodes `out.len()` consecutive values starting at position 0
pub(crate) fn unpack_values(bytes: &[u8], bit_width: u8, out: &mut [u32]) {
    let mask = low_bits_mask(bit_width);
    let width = u32::from(bit_width);
    let mut acc: u64 = 0;
    let mut acc_bits: u32 = 0;
    let mut pos = 0;

    for slot in out.iter_mut() {
        while acc_bits < width {
            acc |= u64::from(bytes[pos]) << acc_bits;
            pos += 1;
            acc_bits += 8;
        }
        *slot = (acc & mask) as u32;
        acc >>= width;
        acc_bits -= width;
    }
}

/// Bit-packed vector with a fixed bit width
#[derive(Debug, Clone)]
pub struct BitpackingVector {
    /// Packed stream followed by zero padding (empty for an empty column)
    data: Bytes,
    bit_width: u8,
    size: usize,
}

impl BitpackingVector {
    pub(crate) fn new(data: Bytes, bit_width: u8, size: usize) -> Self {
        debug_assert!((1..=32).contains(&bit_width));
        debug_assert!(size == 0 || data.len() >= packed_byte_len(size, bit_width));
        Self {
            data,
            bit_width,
            size,
        }
    }

    pub fn bit_width(&self) -> u8 {
        self.bit_width
    }

    /// Logical number of values
    pub fn size(&self) -> usize {
        self.size
    }

    /// Packed bytes including padding
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Bytes owned by this vector, excluding the header
    pub fn data_size(&self) -> usize {
        self.data.len()
    }

    pub fn header_size(&self) -> usize {
        BITPACKING_HEADER_SIZE
    }

    /// Point access
    #[inline]
    pub fn get(&self, index: usize) -> u32 {
        debug_assert!(index < self.size, "index {} out of bounds ({})", index, self.size);
        unpack_value(&self.data, index, self.bit_width)
    }

    /// Decodes all values into `out` (`out.len()` must equal `size()`)
    pub fn decode_into(&self, out: &mut [u32]) {
        debug_assert_eq!(out.len(), self.size);
        unpack_values(&self.data, self.bit_width, out);
    }

    pub fn decode_all(&self) -> Vec<u32> {
        let mut out = vec![0u32; self.size];
        self.decode_into(&mut out);
        out
    }

    pub fn create_decompressor(&self) -> BitpackingDecompressor<'_> {
        BitpackingDecompressor { vector: self }
    }

    /// Deep copy of the packed stream into `pool`
    pub fn copy_using_allocator(&self, pool: &MemoryPool) -> CompressionResult<Self> {
        Ok(Self {
            data: pool.allocate_copy(&self.data)?,
            bit_width: self.bit_width,
            size: self.size,
        })
    }

    /// Serializes to the fixed-width layout
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(BITPACKING_HEADER_SIZE + self.data.len());
        out.push(self.bit_width);
        out.extend_from_slice(&(self.size as u32).to_le_bytes());
        out.extend_from_slice(&self.data);
        out
    }

    /// Parses the fixed-width layout, copying the payload into `pool`
    pub fn from_bytes(bytes: &[u8], pool: &MemoryPool) -> CompressionResult<Self> {
        if bytes.len() < BITPACKING_HEADER_SIZE {
            return Err(invalid_layout!(
                "fixed-width header needs {} bytes, got {}",
                BITPACKING_HEADER_SIZE,
                bytes.len()
            ));
        }

        let bit_width = bytes[0];
        if !(1..=32).contains(&bit_width) {
            return Err(invalid_layout!("bit width {} outside [1, 32]", bit_width));
        }
        let size = LittleEndian::read_u32(&bytes[1..BITPACKING_HEADER_SIZE]) as usize;
        let payload = &bytes[BITPACKING_HEADER_SIZE..];

        if size == 0 {
            return Ok(Self::new(Bytes::new(), bit_width, 0));
        }

        let packed_len = packed_byte_len(size, bit_width);
        if payload.len() < packed_len {
            return Err(invalid_layout!(
                "{} values at {} bits need {} bytes, got {}",
                size,
                bit_width,
                packed_len,
                payload.len()
            ));
        }

        let mut data = pool.allocate_vec(packed_len + BITPACKING_PADDING_BYTES)?;
        data.extend_from_slice(&payload[..packed_len]);
        data.resize(packed_len + BITPACKING_PADDING_BYTES, 0);
        Ok(Self::new(data.into_bytes(), bit_width, size))
    }
}

/// Random-access reader for bit-packed vectors; needs no decode state
#[derive(Debug, Clone, Copy)]
pub struct BitpackingDecompressor<'a> {
    vector: &'a BitpackingVector,
}

impl<'a> BaseVectorDecompressor for BitpackingDecompressor<'a> {
    #[inline]
    fn get(&mut self, index: usize) -> u32 {
        self.vector.get(index)
    }

    fn size(&self) -> usize {
        self.vector.size()
    }
}

/// Compressor producing `BitpackingVector`s
#[derive(Debug, Clone, Copy, Default)]
pub struct BitpackingCompressor;

impl BitpackingCompressor {
    pub fn new() -> Self {
        Self
    }

    /// Packs `values` at an explicitly chosen bit width.
    ///
    /// The caller guarantees every value is below `2^bit_width`; this is
    /// only asserted in debug builds.
    pub fn compress_with_bit_width(
        &self,
        values: &[u32],
        bit_width: u8,
        pool: &MemoryPool,
    ) -> CompressionResult<BitpackingVector> {
        if !(1..=32).contains(&bit_width) {
            return Err(invalid_argument!("bit width {} outside [1, 32]", bit_width));
        }
        if values.len() > MAX_VECTOR_SIZE {
            return Err(PrismPackError::InvalidArgument(format!(
                "{} values exceed the maximum vector size",
                values.len()
            )));
        }

        if values.is_empty() {
            return Ok(BitpackingVector::new(Bytes::new(), bit_width, 0));
        }

        let packed_len = packed_byte_len(values.len(), bit_width);
        let mut data = pool.allocate_vec(packed_len + BITPACKING_PADDING_BYTES)?;
        pack_values(values, bit_width, &mut data);
        data.resize(packed_len + BITPACKING_PADDING_BYTES, 0);

        debug!(
            values = values.len(),
            bit_width,
            bytes = data.len(),
            "bit-packed vector"
        );

        Ok(BitpackingVector::new(data.into_bytes(), bit_width, values.len()))
    }
}

impl VectorCompressor for BitpackingCompressor {
    fn compress(&self, values: &[u32], pool: &MemoryPool) -> CompressionResult<CompressedVector> {
        let bit_width = BitWidthAnalyzer::analyze(values.iter().copied());
        self.compress_with_bit_width(values, bit_width, pool)
            .map(CompressedVector::Bitpacking)
    }

    fn name(&self) -> &'static str {
        "Bitpacking"
    }
}
