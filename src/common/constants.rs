//! Constants used throughout PrismPack

/// Default number of values per block for block codecs
pub const DEFAULT_BLOCK_SIZE: usize = 256;

/// Largest accepted block size
pub const MAX_BLOCK_SIZE: usize = 1 << 16;

/// Zero bytes appended after a fixed-width bit stream.
///
/// Decoding reads a whole little-endian u64 starting at the byte holding the
/// first bit of a value, which may extend up to 7 bytes past the last packed
/// byte.
pub const BITPACKING_PADDING_BYTES: usize = 8;

/// Fixed-width layout header: bit_width (u8) + logical_size (u32)
pub const BITPACKING_HEADER_SIZE: usize = 1 + 4;

/// Block layout header: block_size (u32) + num_blocks (u32) + logical_size (u32) + codec_id (u8)
pub const BLOCK_HEADER_SIZE: usize = 4 + 4 + 4 + 1;

/// Maximum logical size of a compressed vector
pub const MAX_VECTOR_SIZE: usize = u32::MAX as usize;

/// Value written into null slots before encoding
pub const NULL_FILLER: u32 = 0;

/// Name of the default, unbounded memory pool
pub const DEFAULT_POOL_NAME: &str = "default";
