/// Block-based compression with a pluggable codec
///
/// The column is split into blocks of `block_size` values. The final block is
/// padded to full length by repeating its last value; padded slots lie past
/// the logical size and are never read. Each block is encoded independently
/// and an offsets array records where every block starts, so the block
/// holding position `i` is found in O(1):
///
/// ```text
/// block = i / block_size, local = i % block_size
/// bytes = data[offsets[block]..offsets[block + 1]]
/// ```
///
/// Point access calls the codec's `select` when it is supported and
/// otherwise decodes that single block; unrelated blocks are never touched.
///
/// Layout: `{block_size: u32, num_blocks: u32, logical_size: u32,
/// codec_id: u8}` header, `num_blocks + 1` little-endian u32 offsets with
/// `offsets[0] = 0`, then the concatenated block payloads.
use crate::common::allocator::MemoryPool;
use crate::common::constants::{BLOCK_HEADER_SIZE, MAX_BLOCK_SIZE, MAX_VECTOR_SIZE};
use crate::common::error::PrismPackError;
use crate::common::helper::div_round_up;
use crate::storage::compression::traits::{BlockCodec, CompressionResult, VectorCompressor};
use crate::storage::compression::vector::CompressedVector;
use crate::{invalid_argument, invalid_layout};
use byteorder::{ByteOrder, LittleEndian};
use bytes::Bytes;
use std::sync::Arc;
use tracing::debug;

/// Column compressed block by block with a shared codec
#[derive(Debug, Clone)]
pub struct BlockVector {
    /// Concatenated block payloads
    data: Bytes,
    /// `num_blocks + 1` little-endian u32 byte offsets into `data`
    offsets: Bytes,
    block_size: usize,
    size: usize,
    codec: Arc<dyn BlockCodec>,
}

impl BlockVector {
    pub(crate) fn new(
        data: Bytes,
        offsets: Bytes,
        block_size: usize,
        size: usize,
        codec: Arc<dyn BlockCodec>,
    ) -> Self {
        debug_assert_eq!(offsets.len() / 4, div_round_up(size, block_size) + 1);
        Self {
            data,
            offsets,
            block_size,
            size,
            codec,
        }
    }

    /// Logical number of values
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn num_blocks(&self) -> usize {
        self.offsets.len() / 4 - 1
    }

    pub fn codec(&self) -> &Arc<dyn BlockCodec> {
        &self.codec
    }

    /// Byte offset where block `block` starts; `offset(num_blocks)` is the payload length
    #[inline]
    pub fn offset(&self, block: usize) -> usize {
        LittleEndian::read_u32(&self.offsets[block * 4..block * 4 + 4]) as usize
    }

    /// Payload bytes plus the offsets array
    pub fn data_size(&self) -> usize {
        self.data.len() + self.offsets.len()
    }

    pub fn header_size(&self) -> usize {
        BLOCK_HEADER_SIZE
    }

    /// Encoded bytes of block `block`
    #[inline]
    pub fn block_bytes(&self, block: usize) -> &[u8] {
        &self.data[self.offset(block)..self.offset(block + 1)]
    }

    /// Number of logical (non-padding) values in block `block`
    pub fn block_len(&self, block: usize) -> usize {
        (self.size - block * self.block_size).min(self.block_size)
    }

    /// Decodes block `block` into `out`, which must hold `block_size` values
    pub fn decode_block(&self, block: usize, out: &mut [u32]) {
        debug_assert_eq!(out.len(), self.block_size);
        self.codec.decode(self.block_bytes(block), out);
    }

    /// Point access touching only the owning block
    pub fn get(&self, index: usize) -> u32 {
        debug_assert!(index < self.size, "index {} out of bounds ({})", index, self.size);
        let block = index / self.block_size;
        let local = index % self.block_size;
        let bytes = self.block_bytes(block);

        if self.codec.supports_select() {
            if let Some(value) = self.codec.select(bytes, local) {
                return value;
            }
        }

        let mut decoded = vec![0u32; self.block_size];
        self.codec.decode(bytes, &mut decoded);
        decoded[local]
    }

    pub fn decode_all(&self) -> Vec<u32> {
        let mut out = vec![0u32; self.num_blocks() * self.block_size];
        for (block, chunk) in out.chunks_exact_mut(self.block_size).enumerate() {
            self.decode_block(block, chunk);
        }
        out.truncate(self.size);
        out
    }

    /// Deep copy of payload and offsets into `pool`; the stateless codec is shared
    pub fn copy_using_allocator(&self, pool: &MemoryPool) -> CompressionResult<Self> {
        let data = pool.allocate_copy(&self.data)?;
        let offsets = pool.allocate_copy(&self.offsets)?;
        Ok(Self {
            data,
            offsets,
            block_size: self.block_size,
            size: self.size,
            codec: Arc::clone(&self.codec),
        })
    }

    /// Serializes to the block layout
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(BLOCK_HEADER_SIZE + self.data_size());
        out.extend_from_slice(&(self.block_size as u32).to_le_bytes());
        out.extend_from_slice(&(self.num_blocks() as u32).to_le_bytes());
        out.extend_from_slice(&(self.size as u32).to_le_bytes());
        out.push(self.codec.id());
        out.extend_from_slice(&self.offsets);
        out.extend_from_slice(&self.data);
        out
    }

    /// Parses the block layout; `codec` must be the codec that wrote it
    pub fn from_bytes(
        bytes: &[u8],
        codec: Arc<dyn BlockCodec>,
        pool: &MemoryPool,
    ) -> CompressionResult<Self> {
        if bytes.len() < BLOCK_HEADER_SIZE {
            return Err(invalid_layout!(
                "block header needs {} bytes, got {}",
                BLOCK_HEADER_SIZE,
                bytes.len()
            ));
        }

        let block_size = LittleEndian::read_u32(&bytes[0..4]) as usize;
        let num_blocks = LittleEndian::read_u32(&bytes[4..8]) as usize;
        let size = LittleEndian::read_u32(&bytes[8..12]) as usize;
        let codec_id = bytes[12];

        if codec_id != codec.id() {
            return Err(PrismPackError::CodecMismatch {
                expected: format!("{} (id {})", codec.name(), codec.id()),
                found: format!("codec id {}", codec_id),
            });
        }
        if block_size == 0 || block_size > MAX_BLOCK_SIZE {
            return Err(invalid_layout!("block size {} out of range", block_size));
        }
        if num_blocks != div_round_up(size, block_size) {
            return Err(invalid_layout!(
                "{} blocks cannot hold {} values of block size {}",
                num_blocks,
                size,
                block_size
            ));
        }

        let offsets_len = (num_blocks + 1) * 4;
        let body = &bytes[BLOCK_HEADER_SIZE..];
        if body.len() < offsets_len {
            return Err(invalid_layout!("offsets array truncated"));
        }
        let (offsets, payload) = body.split_at(offsets_len);

        let mut previous = 0;
        for (block, raw) in offsets.chunks_exact(4).enumerate() {
            let offset = LittleEndian::read_u32(raw) as usize;
            if (block == 0 && offset != 0) || offset < previous {
                return Err(invalid_layout!("offsets are not monotonic from 0"));
            }
            previous = offset;
        }
        if previous != payload.len() {
            return Err(invalid_layout!(
                "payload holds {} bytes, offsets end at {}",
                payload.len(),
                previous
            ));
        }

        let data = pool.allocate_copy(payload)?;
        let offsets = pool.allocate_copy(offsets)?;
        Ok(Self::new(data, offsets, block_size, size, codec))
    }
}

/// Compressor producing `BlockVector`s with a given codec
#[derive(Debug, Clone)]
pub struct BlockCompressor {
    codec: Arc<dyn BlockCodec>,
    block_size: usize,
}

impl BlockCompressor {
    pub fn new(codec: Arc<dyn BlockCodec>, block_size: usize) -> CompressionResult<Self> {
        if block_size == 0 || block_size > MAX_BLOCK_SIZE {
            return Err(invalid_argument!(
                "block size {} outside [1, {}]",
                block_size,
                MAX_BLOCK_SIZE
            ));
        }
        Ok(Self { codec, block_size })
    }

    pub fn codec(&self) -> &Arc<dyn BlockCodec> {
        &self.codec
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Compresses `values` into a `BlockVector`
    pub fn compress_blocks(
        &self,
        values: &[u32],
        pool: &MemoryPool,
    ) -> CompressionResult<BlockVector> {
        if values.len() > MAX_VECTOR_SIZE {
            return Err(invalid_argument!(
                "{} values exceed the maximum vector size",
                values.len()
            ));
        }

        let num_blocks = div_round_up(values.len(), self.block_size);
        let mut offsets = pool.allocate_vec::<u8>((num_blocks + 1) * 4)?;
        offsets.extend_from_slice(&0u32.to_le_bytes());

        let data = match self.exact_payload_len(values) {
            Some(total) => {
                if total > u32::MAX as usize {
                    return Err(invalid_argument!("block payload exceeds 4 GiB"));
                }
                let mut data = pool.allocate_vec::<u8>(total)?;
                self.encode_blocks(values, &mut data, &mut offsets)?;
                debug_assert_eq!(data.len(), total, "{} mis-reported its size", self.codec.name());
                data.into_bytes()
            }
            None => {
                // codec cannot size its output; encode aside and copy into the pool
                let mut scratch = Vec::new();
                self.encode_blocks(values, &mut scratch, &mut offsets)?;
                pool.allocate_copy(&scratch)?
            }
        };

        debug!(
            values = values.len(),
            blocks = num_blocks,
            block_size = self.block_size,
            codec = self.codec.name(),
            bytes = data.len(),
            "block-compressed vector"
        );

        Ok(BlockVector::new(
            data,
            offsets.into_bytes(),
            self.block_size,
            values.len(),
            Arc::clone(&self.codec),
        ))
    }

    /// Total payload size, when the codec reports exact block sizes
    fn exact_payload_len(&self, values: &[u32]) -> Option<usize> {
        let mut total = Some(0usize);
        self.for_each_block(values, |block| {
            total = match (total, self.codec.encoded_len(block)) {
                (Some(sum), Some(len)) => Some(sum + len),
                _ => None,
            };
        });
        total
    }

    fn encode_blocks(
        &self,
        values: &[u32],
        data: &mut Vec<u8>,
        offsets: &mut Vec<u8>,
    ) -> CompressionResult<()> {
        let mut overflow = false;
        self.for_each_block(values, |block| {
            self.codec.encode(block, data);
            match u32::try_from(data.len()) {
                Ok(end) => offsets.extend_from_slice(&end.to_le_bytes()),
                Err(_) => overflow = true,
            }
        });
        if overflow {
            return Err(invalid_argument!("block payload exceeds 4 GiB"));
        }
        Ok(())
    }

    /// Calls `f` on every block; the tail block is padded by repeating its last value
    fn for_each_block(&self, values: &[u32], mut f: impl FnMut(&[u32])) {
        let mut padded = Vec::new();
        for chunk in values.chunks(self.block_size) {
            if chunk.len() == self.block_size {
                f(chunk);
            } else {
                padded.clear();
                padded.extend_from_slice(chunk);
                padded.resize(self.block_size, chunk[chunk.len() - 1]);
                f(&padded);
            }
        }
    }
}

impl VectorCompressor for BlockCompressor {
    fn compress(&self, values: &[u32], pool: &MemoryPool) -> CompressionResult<CompressedVector> {
        self.compress_blocks(values, pool).map(CompressedVector::Block)
    }

    fn name(&self) -> &'static str {
        self.codec.name()
    }
}
