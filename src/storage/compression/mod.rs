/// Compression module for the PrismPack storage layer
///
/// This module packs unsigned 32-bit columns into compact byte
/// representations that support both full sequential scans and O(1)
/// localized point access.
///
/// ## Supported Layouts:
///
/// - **Bitpacking**: whole column at one minimal bit width, direct point reads
/// - **Block**: fixed-size blocks encoded by a pluggable `BlockCodec`, located
///   through an offsets array
///
/// ## Built-in Block Codecs:
///
/// - **FrameOfReference**: per-block minimum plus bit-packed deltas, supports `select`
/// - **VarByte**: 7-bit groups per value, decodes whole blocks
///
/// ## Automatic Encoding Selection:
///
/// Use `CompressionSelector` or `auto_encode()` to choose the smallest encoding.
///
/// ## Usage Example:
///
/// ```ignore
/// use prismpack::storage::compression::*;
///
/// let pool = MemoryPool::default();
/// let vector = BitpackingCompressor::new().compress(&values, &pool)?;
///
/// // each reader owns its decompressor
/// let mut reader = vector.create_decompressor(DecompressionMode::Lazy);
/// let value = reader.get(42);
/// ```

pub mod analyze;
pub mod bitpacking;
pub mod block;
pub mod decompressor;
pub mod frame_of_reference;
pub mod traits;
pub mod types;
pub mod varbyte;
pub mod vector;

pub use analyze::{auto_encode, BitWidthAnalyzer, CompressionSelector};
pub use bitpacking::{BitpackingCompressor, BitpackingDecompressor, BitpackingVector};
pub use block::{BlockCompressor, BlockVector};
pub use decompressor::{BlockDecompressor, EagerDecompressor, VectorDecompressor};
pub use frame_of_reference::FrameOfReferenceCodec;
pub use traits::{
    BaseVectorDecompressor, BlockCodec, CompressionResult, CompressionStats, VectorCompressor,
};
pub use types::{AnalyzeResult, CompressedVectorType, DecompressionMode, EncodingType};
pub use varbyte::VarByteCodec;
pub use vector::{verify_compressed_vector, CompressedVector};
