/// Encoding types supported by the compression layer
///
/// Each segment persists one of these as its codec tag. The numeric tags are
/// part of the in-memory format and must not be renumbered.
use serde::{Deserialize, Serialize};

/// Codec tag identifying which codec produced a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EncodingType {
    /// Fixed-width bit-packing of the whole column
    /// Best for: narrow value domains with uniform spread
    Bitpacking = 1,

    /// Block codec: per-block minimum plus bit-packed deltas
    /// Best for: clustered or slowly drifting values
    /// Supports direct point decode (`select`)
    FrameOfReference = 2,

    /// Block codec: variable-byte (7-bit groups) encoding
    /// Best for: skewed domains with mostly small values
    VarByte = 3,

    /// Block codec supplied by the caller
    External = 255,
}

impl EncodingType {
    /// Returns human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            EncodingType::Bitpacking => "Bitpacking",
            EncodingType::FrameOfReference => "FrameOfReference",
            EncodingType::VarByte => "VarByte",
            EncodingType::External => "External",
        }
    }

    /// Stable small-integer tag
    pub fn tag(&self) -> u8 {
        *self as u8
    }

    /// Inverse of [`EncodingType::tag`]
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(EncodingType::Bitpacking),
            2 => Some(EncodingType::FrameOfReference),
            3 => Some(EncodingType::VarByte),
            255 => Some(EncodingType::External),
            _ => None,
        }
    }

    /// Whether segments of this type use the block layout
    pub fn is_block_based(&self) -> bool {
        !matches!(self, EncodingType::Bitpacking)
    }

    /// Layout of the compressed vector produced for this encoding
    pub fn vector_type(&self) -> CompressedVectorType {
        if self.is_block_based() {
            CompressedVectorType::Block
        } else {
            CompressedVectorType::FixedWidth
        }
    }
}

impl std::fmt::Display for EncodingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Binary layout of a compressed vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompressedVectorType {
    FixedWidth,
    Block,
}

/// How a decompressor serves reads on block-based vectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecompressionMode {
    /// Decode the whole vector at construction: O(n) upfront, O(1) per read
    Eager,
    /// Keep at most one decoded block and replace it on a miss
    Lazy,
}

/// Result of compression analysis
#[derive(Debug, Clone)]
pub struct AnalyzeResult {
    /// Analyzed encoding
    pub encoding_type: EncodingType,

    /// Estimated compressed size in bytes
    pub estimated_size: usize,

    /// Estimated compression ratio (original_size / compressed_size)
    pub compression_ratio: f64,
}

impl AnalyzeResult {
    /// Creates a new analyze result
    pub fn new(encoding_type: EncodingType, original_size: usize, estimated_size: usize) -> Self {
        let compression_ratio = if estimated_size > 0 {
            original_size as f64 / estimated_size as f64
        } else {
            1.0
        };

        Self {
            encoding_type,
            estimated_size,
            compression_ratio,
        }
    }

    /// Returns whether compression is beneficial (ratio > 1.0)
    pub fn is_beneficial(&self) -> bool {
        self.compression_ratio > 1.0
    }
}
