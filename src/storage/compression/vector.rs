/// Compressed vector value object
///
/// A `CompressedVector` is produced once by a compressor from a finalized
/// raw buffer and never mutated afterwards. Readers share it by reference
/// and create their own decompressor; deep copies go through
/// `copy_using_allocator`.
use crate::common::allocator::MemoryPool;
use crate::common::error::PrismPackError;
use crate::storage::compression::bitpacking::BitpackingVector;
use crate::storage::compression::block::BlockVector;
use crate::storage::compression::decompressor::{
    BlockDecompressor, EagerDecompressor, VectorDecompressor,
};
use crate::storage::compression::traits::{
    BaseVectorDecompressor, CompressionResult, CompressionStats,
};
use crate::storage::compression::types::{CompressedVectorType, DecompressionMode};
use tracing::warn;

/// Immutable packed column in one of the supported layouts
#[derive(Debug, Clone)]
pub enum CompressedVector {
    /// Fixed-width bit-packing of the whole column
    Bitpacking(BitpackingVector),
    /// Independently encoded blocks with an offsets array
    Block(BlockVector),
}

impl CompressedVector {
    /// Logical number of values
    pub fn size(&self) -> usize {
        match self {
            CompressedVector::Bitpacking(vector) => vector.size(),
            CompressedVector::Block(vector) => vector.size(),
        }
    }

    /// Bytes owned by the vector, excluding its header
    pub fn data_size(&self) -> usize {
        match self {
            CompressedVector::Bitpacking(vector) => vector.data_size(),
            CompressedVector::Block(vector) => vector.data_size(),
        }
    }

    pub fn header_size(&self) -> usize {
        match self {
            CompressedVector::Bitpacking(vector) => vector.header_size(),
            CompressedVector::Block(vector) => vector.header_size(),
        }
    }

    pub fn vector_type(&self) -> CompressedVectorType {
        match self {
            CompressedVector::Bitpacking(_) => CompressedVectorType::FixedWidth,
            CompressedVector::Block(_) => CompressedVectorType::Block,
        }
    }

    /// Column-wide bit width; block vectors choose widths per block
    pub fn bit_width(&self) -> Option<u8> {
        match self {
            CompressedVector::Bitpacking(vector) => Some(vector.bit_width()),
            CompressedVector::Block(_) => None,
        }
    }

    /// Point access without decode state
    pub fn get(&self, index: usize) -> u32 {
        match self {
            CompressedVector::Bitpacking(vector) => vector.get(index),
            CompressedVector::Block(vector) => vector.get(index),
        }
    }

    /// Sequential decode of every logical value
    pub fn decode_all(&self) -> Vec<u32> {
        match self {
            CompressedVector::Bitpacking(vector) => vector.decode_all(),
            CompressedVector::Block(vector) => vector.decode_all(),
        }
    }

    /// Creates a decompressor owned by the caller.
    ///
    /// Bit-packed vectors are always read directly; `mode` only affects
    /// block vectors.
    pub fn create_decompressor(&self, mode: DecompressionMode) -> VectorDecompressor<'_> {
        match (self, mode) {
            (CompressedVector::Bitpacking(vector), _) => {
                VectorDecompressor::Bitpacking(vector.create_decompressor())
            }
            (CompressedVector::Block(vector), DecompressionMode::Eager) => {
                VectorDecompressor::Eager(EagerDecompressor::new(vector.decode_all()))
            }
            (CompressedVector::Block(vector), DecompressionMode::Lazy) => {
                VectorDecompressor::Block(BlockDecompressor::new(vector))
            }
        }
    }

    /// Deep, non-aliasing copy of every owned buffer into `pool`
    pub fn copy_using_allocator(&self, pool: &MemoryPool) -> CompressionResult<Self> {
        Ok(match self {
            CompressedVector::Bitpacking(vector) => {
                CompressedVector::Bitpacking(vector.copy_using_allocator(pool)?)
            }
            CompressedVector::Block(vector) => {
                CompressedVector::Block(vector.copy_using_allocator(pool)?)
            }
        })
    }

    /// Serializes to the fixed-width or block layout
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            CompressedVector::Bitpacking(vector) => vector.to_bytes(),
            CompressedVector::Block(vector) => vector.to_bytes(),
        }
    }
}

impl CompressionStats for CompressedVector {
    fn uncompressed_size(&self) -> usize {
        self.size() * std::mem::size_of::<u32>()
    }

    fn compressed_size(&self) -> usize {
        self.header_size() + self.data_size()
    }
}

/// Checks that `vector` reproduces `original` through sequential decode and
/// through point access at every position.
pub fn verify_compressed_vector(
    original: &[u32],
    vector: &CompressedVector,
) -> CompressionResult<()> {
    if vector.size() != original.len() {
        return Err(PrismPackError::InvalidLayout(format!(
            "compressed vector holds {} values, expected {}",
            vector.size(),
            original.len()
        )));
    }

    let decoded = vector.decode_all();
    let mut decompressor = vector.create_decompressor(DecompressionMode::Lazy);
    for (index, &expected) in original.iter().enumerate() {
        for actual in [decoded[index], decompressor.get(index)] {
            if actual != expected {
                warn!(
                    index,
                    expected,
                    actual,
                    vector_type = ?vector.vector_type(),
                    "compressed vector verification failed"
                );
                return Err(PrismPackError::VerificationFailed {
                    index,
                    expected,
                    actual,
                });
            }
        }
    }
    Ok(())
}
