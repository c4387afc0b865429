/// Per-consumer decompressors
///
/// A `CompressedVector` is shared and immutable; every reader owns its own
/// decompressor. Decompressors hold mutable decode state (a decoded buffer or
/// a single-block cache) and must not be shared between threads. All of them
/// accept positions in any order, so callers may seek backward or jump.
use crate::storage::compression::bitpacking::BitpackingDecompressor;
use crate::storage::compression::block::BlockVector;
use crate::storage::compression::traits::BaseVectorDecompressor;
use tracing::trace;

/// Decompressor that decoded the whole vector at construction
#[derive(Debug, Clone)]
pub struct EagerDecompressor {
    values: Vec<u32>,
}

impl EagerDecompressor {
    pub fn new(values: Vec<u32>) -> Self {
        Self { values }
    }

    /// Decoded values
    pub fn values(&self) -> &[u32] {
        &self.values
    }
}

impl BaseVectorDecompressor for EagerDecompressor {
    #[inline]
    fn get(&mut self, index: usize) -> u32 {
        self.values[index]
    }

    fn size(&self) -> usize {
        self.values.len()
    }
}

/// Lazy decompressor for block vectors with a single-block cache.
///
/// Reads inside the cached block are served from the cache. On a miss the
/// codec's `select` is tried first; codecs without it decode the owning block,
/// which then replaces the cache. Working memory stays at one block no matter
/// how large the vector is.
#[derive(Debug)]
pub struct BlockDecompressor<'a> {
    vector: &'a BlockVector,
    cached_block: Vec<u32>,
    cached_block_index: Option<usize>,
    block_decodes: usize,
}

impl<'a> BlockDecompressor<'a> {
    pub fn new(vector: &'a BlockVector) -> Self {
        Self {
            vector,
            cached_block: Vec::new(),
            cached_block_index: None,
            block_decodes: 0,
        }
    }

    /// Index of the block currently held in the cache
    pub fn cached_block_index(&self) -> Option<usize> {
        self.cached_block_index
    }

    /// Number of whole-block decodes performed so far
    pub fn block_decodes(&self) -> usize {
        self.block_decodes
    }

    fn load_block(&mut self, block: usize) {
        trace!(
            block,
            previous = ?self.cached_block_index,
            "block cache miss"
        );
        self.cached_block.resize(self.vector.block_size(), 0);
        self.vector.decode_block(block, &mut self.cached_block);
        self.cached_block_index = Some(block);
        self.block_decodes += 1;
    }
}

impl<'a> BaseVectorDecompressor for BlockDecompressor<'a> {
    fn get(&mut self, index: usize) -> u32 {
        debug_assert!(index < self.vector.size());
        let block_size = self.vector.block_size();
        let block = index / block_size;
        let local = index % block_size;

        if self.cached_block_index == Some(block) {
            return self.cached_block[local];
        }

        let codec = self.vector.codec();
        if codec.supports_select() {
            if let Some(value) = codec.select(self.vector.block_bytes(block), local) {
                return value;
            }
        }

        self.load_block(block);
        self.cached_block[local]
    }

    fn size(&self) -> usize {
        self.vector.size()
    }
}

/// Decompressor over any compressed vector
#[derive(Debug)]
pub enum VectorDecompressor<'a> {
    /// Direct reads from the bit stream
    Bitpacking(BitpackingDecompressor<'a>),
    /// Fully decoded buffer
    Eager(EagerDecompressor),
    /// Single-block cache over a block vector
    Block(BlockDecompressor<'a>),
}

impl<'a> VectorDecompressor<'a> {
    /// Whole-block decodes performed by a lazy block decompressor
    pub fn block_decodes(&self) -> usize {
        match self {
            VectorDecompressor::Block(decompressor) => decompressor.block_decodes(),
            _ => 0,
        }
    }
}

impl<'a> BaseVectorDecompressor for VectorDecompressor<'a> {
    #[inline]
    fn get(&mut self, index: usize) -> u32 {
        match self {
            VectorDecompressor::Bitpacking(decompressor) => decompressor.get(index),
            VectorDecompressor::Eager(decompressor) => decompressor.get(index),
            VectorDecompressor::Block(decompressor) => decompressor.get(index),
        }
    }

    fn size(&self) -> usize {
        match self {
            VectorDecompressor::Bitpacking(decompressor) => decompressor.size(),
            VectorDecompressor::Eager(decompressor) => decompressor.size(),
            VectorDecompressor::Block(decompressor) => decompressor.size(),
        }
    }
}
