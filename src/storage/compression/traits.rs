/// Compression traits
///
/// Compressors turn a finalized raw buffer into a `CompressedVector`, block
/// codecs encode one fixed-size block at a time, and decompressors are
/// per-consumer cursors reading a shared vector.
use crate::common::allocator::MemoryPool;
use crate::common::error::PrismPackResult;
use crate::storage::compression::types::EncodingType;
use crate::storage::compression::vector::CompressedVector;
use std::fmt;

/// Result type for compression operations
pub type CompressionResult<T> = PrismPackResult<T>;

/// Builds a compressed vector from raw values
pub trait VectorCompressor {
    /// Compresses `values`, allocating the output from `pool`
    ///
    /// Either returns a complete vector or an error; no partially built
    /// vector is ever observable.
    fn compress(&self, values: &[u32], pool: &MemoryPool) -> CompressionResult<CompressedVector>;

    /// Returns the name of this compressor
    fn name(&self) -> &'static str;
}

/// Codec encoding one fixed-size block of values independently
///
/// Blocks handed to `encode` always hold exactly the vector's block size
/// values; the final block of a column is padded with in-domain filler.
/// `decode` receives exactly the bytes `encode` produced for that block.
pub trait BlockCodec: Send + Sync + fmt::Debug {
    /// One-byte identifier written into the block layout
    fn id(&self) -> u8;

    /// Returns the name of this codec
    fn name(&self) -> &'static str;

    /// Codec tag reported by segments using this codec
    fn encoding_type(&self) -> EncodingType {
        EncodingType::External
    }

    /// Appends the encoding of `block` to `out`
    fn encode(&self, block: &[u32], out: &mut Vec<u8>);

    /// Decodes one block; `out.len()` is the block size
    fn decode(&self, bytes: &[u8], out: &mut [u32]);

    /// Exact number of bytes `encode` appends for `block`, if known upfront.
    ///
    /// Lets the compressor charge the whole payload to the memory pool
    /// before encoding anything.
    fn encoded_len(&self, _block: &[u32]) -> Option<usize> {
        None
    }

    /// Whether `select` decodes single values without materializing the block
    fn supports_select(&self) -> bool {
        false
    }

    /// Decodes the value at `index` within the block, if supported
    fn select(&self, _bytes: &[u8], _index: usize) -> Option<u32> {
        None
    }
}

/// Per-consumer random-access reader over a compressed vector
pub trait BaseVectorDecompressor {
    /// Decodes the value at logical position `index`
    fn get(&mut self, index: usize) -> u32;

    /// Logical number of values
    fn size(&self) -> usize;
}

/// Helper trait for compression statistics
pub trait CompressionStats {
    /// Returns the uncompressed size
    fn uncompressed_size(&self) -> usize;

    /// Returns the compressed size
    fn compressed_size(&self) -> usize;

    /// Returns the compression ratio
    fn compression_ratio(&self) -> f64 {
        if self.compressed_size() > 0 {
            self.uncompressed_size() as f64 / self.compressed_size() as f64
        } else {
            1.0
        }
    }

    /// Returns the space savings as a percentage
    fn space_savings(&self) -> f64 {
        if self.uncompressed_size() > 0 {
            (1.0 - (self.compressed_size() as f64 / self.uncompressed_size() as f64)) * 100.0
        } else {
            0.0
        }
    }
}
