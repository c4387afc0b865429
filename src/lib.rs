//! PrismPack - Integer Column Compression for Columnar Storage
//!
//! PrismPack packs unsigned 32-bit columns into compact byte representations
//! that keep two read paths cheap: full sequential scans and point access to
//! arbitrary logical positions without decoding the whole column.
//!
pub mod common;
pub mod config;
pub mod storage;
pub mod types;

// Re-export common types for convenience
pub use common::{MemoryPool, PrismPackError, PrismPackResult};

// Re-export configuration for convenience
pub use config::CompressionConfig;

// Re-export type system for convenience
pub use types::{NullBitmap, PositionList, RawValue};

// Re-export storage system for convenience
pub use storage::{
    auto_encode, verify_compressed_vector, AccessCounts, AccessType, BaseVectorDecompressor,
    BitWidthAnalyzer, BitpackingCompressor, BitpackingVector, BlockCodec, BlockCompressor,
    BlockVector, CompressedVector, CompressedVectorType, CompressionSelector, CompressionStats,
    DecompressionMode, EncodingType, FrameOfReferenceCodec, PointAccessIterator,
    PointAccessPosition, Segment, SegmentAccessCounter, SegmentEncoder, SegmentIterable,
    SegmentIterator, SegmentPosition, VarByteCodec, VectorCompressor, VectorDecompressor,
};
