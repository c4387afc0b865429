//! Compressed, nullable column segments
//!
//! A `Segment` owns one `CompressedVector` plus an optional `NullBitmap`
//! and is immutable once built. Re-encoding produces a new segment; shared
//! readers never observe a change. Segments are built by `SegmentEncoder`
//! from a finalized column chunk.

use crate::common::allocator::MemoryPool;
use crate::common::constants::{DEFAULT_BLOCK_SIZE, NULL_FILLER};
use crate::common::error::{PrismPackError, PrismPackResult};
use crate::config::CompressionConfig;
use crate::invalid_argument;
use crate::storage::access_counter::SegmentAccessCounter;
use crate::storage::compression::bitpacking::BitpackingCompressor;
use crate::storage::compression::block::BlockCompressor;
use crate::storage::compression::frame_of_reference::FrameOfReferenceCodec;
use crate::storage::compression::traits::{BlockCodec, CompressionStats, VectorCompressor};
use crate::storage::compression::types::EncodingType;
use crate::storage::compression::varbyte::VarByteCodec;
use crate::storage::compression::vector::{verify_compressed_vector, CompressedVector};
use crate::storage::iterable::SegmentIterable;
use crate::types::NullBitmap;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::debug;

/// Immutable compressed column chunk with optional nulls
#[derive(Debug)]
pub struct Segment {
    encoding_type: EncodingType,
    values: CompressedVector,
    /// Present only when at least one position is null
    null_values: Option<NullBitmap>,
    size: usize,
    access_counter: SegmentAccessCounter,
}

impl Segment {
    /// Wraps an already compressed vector.
    ///
    /// `encoding_type` must describe `values`: its layout has to match, and a
    /// block vector must carry a codec reporting the same tag. A bitmap
    /// without any null entry is dropped.
    pub fn new(
        encoding_type: EncodingType,
        values: CompressedVector,
        null_values: Option<NullBitmap>,
    ) -> PrismPackResult<Self> {
        if encoding_type.vector_type() != values.vector_type() {
            return Err(invalid_argument!(
                "{} segments need a {:?} vector, got {:?}",
                encoding_type,
                encoding_type.vector_type(),
                values.vector_type()
            ));
        }
        if let CompressedVector::Block(vector) = &values {
            let codec_type = vector.codec().encoding_type();
            if codec_type != encoding_type {
                return Err(invalid_argument!(
                    "{} segment holds blocks written by {} ({})",
                    encoding_type,
                    vector.codec().name(),
                    codec_type
                ));
            }
        }

        let size = values.size();
        if let Some(bitmap) = &null_values {
            if bitmap.count() != size {
                return Err(invalid_argument!(
                    "null bitmap covers {} positions, vector holds {}",
                    bitmap.count(),
                    size
                ));
            }
        }

        Ok(Self {
            encoding_type,
            values,
            null_values: null_values.filter(NullBitmap::has_nulls),
            size,
            access_counter: SegmentAccessCounter::new(),
        })
    }

    /// Value at `index`, or None when the position is null
    #[inline]
    pub fn get(&self, index: usize) -> Option<u32> {
        if self.is_null(index) {
            None
        } else {
            Some(self.values.get(index))
        }
    }

    #[inline]
    pub fn is_null(&self, index: usize) -> bool {
        self.null_values
            .as_ref()
            .is_some_and(|bitmap| bitmap.is_null(index))
    }

    /// Logical number of positions
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Bytes attributed to this segment.
    ///
    /// Fixed struct overhead, one bit per position when a null bitmap is
    /// stored, and the compressed vector's header and data.
    pub fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.null_values.as_ref().map_or(0, NullBitmap::byte_size)
            + self.values.header_size()
            + self.values.data_size()
    }

    /// Deep copy of every owned buffer into `pool`.
    ///
    /// On failure nothing allocated for the copy stays accounted in `pool`.
    pub fn copy_using_allocator(&self, pool: &MemoryPool) -> PrismPackResult<Segment> {
        let values = self.values.copy_using_allocator(pool)?;
        let null_values = match &self.null_values {
            Some(bitmap) => Some(bitmap.copy_using_allocator(pool)?),
            None => None,
        };

        debug!(
            encoding = %self.encoding_type,
            size = self.size,
            pool = pool.name(),
            "copied segment"
        );

        Ok(Segment {
            encoding_type: self.encoding_type,
            values,
            null_values,
            size: self.size,
            access_counter: self.access_counter.clone(),
        })
    }

    /// Codec tag of this segment
    pub fn encoding_type(&self) -> EncodingType {
        self.encoding_type
    }

    pub fn null_values(&self) -> Option<&NullBitmap> {
        self.null_values.as_ref()
    }

    pub fn compressed_vector(&self) -> &CompressedVector {
        &self.values
    }

    pub fn access_counter(&self) -> &SegmentAccessCounter {
        &self.access_counter
    }

    /// Iterator factory for scans and position-list access
    pub fn iterable(&self) -> SegmentIterable<'_> {
        SegmentIterable::new(self)
    }
}

impl CompressionStats for Segment {
    fn uncompressed_size(&self) -> usize {
        self.size * std::mem::size_of::<u32>()
    }

    fn compressed_size(&self) -> usize {
        self.memory_usage()
    }
}

/// Builds segments from finalized column chunks
#[derive(Debug, Clone)]
pub struct SegmentEncoder {
    encoding_type: EncodingType,
    block_codec: Option<Arc<dyn BlockCodec>>,
    block_size: usize,
    verify: bool,
}

impl SegmentEncoder {
    pub fn new(encoding_type: EncodingType) -> Self {
        Self {
            encoding_type,
            block_codec: None,
            block_size: DEFAULT_BLOCK_SIZE,
            verify: false,
        }
    }

    /// Encoder using the configured default encoding, block size and verification
    pub fn with_config(config: &CompressionConfig) -> Self {
        Self {
            encoding_type: config.default_encoding,
            block_codec: None,
            block_size: config.block_size,
            verify: config.verify_on_encode,
        }
    }

    /// Encodes blocks with `codec`; the segment reports the codec's tag
    pub fn with_block_codec(mut self, codec: Arc<dyn BlockCodec>) -> Self {
        self.encoding_type = codec.encoding_type();
        self.block_codec = Some(codec);
        self
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Check every encoded vector against its input before returning it
    pub fn with_verification(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn encoding_type(&self) -> EncodingType {
        self.encoding_type
    }

    /// Encodes nullable values
    pub fn encode(&self, values: &[Option<u32>], pool: &MemoryPool) -> PrismPackResult<Segment> {
        let raw: Vec<u32> = values
            .iter()
            .map(|value| value.unwrap_or(NULL_FILLER))
            .collect();
        let nulls: Vec<bool> = values.iter().map(Option::is_none).collect();
        self.encode_values(&raw, Some(&nulls), pool)
    }

    /// Encodes `values` with an optional parallel null-indicator slice.
    ///
    /// Values at null positions are ignored and stored as the filler.
    pub fn encode_values(
        &self,
        values: &[u32],
        nulls: Option<&[bool]>,
        pool: &MemoryPool,
    ) -> PrismPackResult<Segment> {
        let null_values = match nulls {
            Some(nulls) if nulls.len() != values.len() => {
                return Err(invalid_argument!(
                    "{} null flags for {} values",
                    nulls.len(),
                    values.len()
                ));
            }
            Some(nulls) if nulls.contains(&true) => Some(NullBitmap::from_nulls_in(nulls, pool)?),
            _ => None,
        };

        let raw = match (&null_values, nulls) {
            (Some(_), Some(nulls)) => Cow::Owned(
                values
                    .iter()
                    .zip(nulls)
                    .map(|(value, is_null)| if *is_null { NULL_FILLER } else { *value })
                    .collect(),
            ),
            _ => Cow::Borrowed(values),
        };

        let vector = self.compressor()?.compress(&raw, pool)?;
        if self.verify {
            verify_compressed_vector(&raw, &vector)?;
        }

        let segment = Segment::new(self.encoding_type, vector, null_values)?;
        debug!(
            encoding = %segment.encoding_type,
            size = segment.size,
            nulls = segment.null_values.as_ref().map_or(0, NullBitmap::null_count),
            memory = segment.memory_usage(),
            "encoded segment"
        );
        Ok(segment)
    }

    fn compressor(&self) -> PrismPackResult<Box<dyn VectorCompressor>> {
        let codec: Arc<dyn BlockCodec> = match (&self.block_codec, self.encoding_type) {
            (Some(codec), _) => Arc::clone(codec),
            (None, EncodingType::Bitpacking) => return Ok(Box::new(BitpackingCompressor::new())),
            (None, EncodingType::FrameOfReference) => Arc::new(FrameOfReferenceCodec::new()),
            (None, EncodingType::VarByte) => Arc::new(VarByteCodec::new()),
            (None, EncodingType::External) => {
                return Err(PrismPackError::InvalidArgument(
                    "external encoding requires a block codec".to_string(),
                ));
            }
        };
        Ok(Box::new(BlockCompressor::new(codec, self.block_size)?))
    }
}
