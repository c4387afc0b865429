/// Frame-of-reference block codec
///
/// Each block stores its minimum and the bit-packed differences to that
/// minimum, so clustered values compress well even when their absolute
/// magnitude is large.
///
/// Block payload: `min: u32` (little-endian), `bit_width: u8`, then the
/// deltas in the shared bit-stream format. Single values are decoded in O(1)
/// through `select`.
use crate::common::helper::packed_byte_len;
use crate::storage::compression::analyze::BitWidthAnalyzer;
use crate::storage::compression::bitpacking::{pack_values, unpack_value, unpack_values};
use crate::storage::compression::traits::BlockCodec;
use crate::storage::compression::types::EncodingType;
use byteorder::{ByteOrder, LittleEndian};

const FOR_BLOCK_HEADER: usize = 4 + 1;

/// Frame-of-reference codec with per-block bit width
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameOfReferenceCodec;

impl FrameOfReferenceCodec {
    pub const ID: u8 = 2;

    pub fn new() -> Self {
        Self
    }

    /// Bytes `encode` produces for `block`
    pub fn encoded_block_len(block: &[u32]) -> usize {
        let (_, bit_width) = Self::frame(block);
        FOR_BLOCK_HEADER + packed_byte_len(block.len(), bit_width)
    }

    fn frame(block: &[u32]) -> (u32, u8) {
        let min = block.iter().copied().min().unwrap_or(0);
        let bit_width = BitWidthAnalyzer::analyze(block.iter().map(|value| value - min));
        (min, bit_width)
    }

    #[inline]
    fn read_header(bytes: &[u8]) -> (u32, u8) {
        (LittleEndian::read_u32(&bytes[..4]), bytes[4])
    }
}

impl BlockCodec for FrameOfReferenceCodec {
    fn id(&self) -> u8 {
        Self::ID
    }

    fn name(&self) -> &'static str {
        "FrameOfReference"
    }

    fn encoding_type(&self) -> EncodingType {
        EncodingType::FrameOfReference
    }

    fn encoded_len(&self, block: &[u32]) -> Option<usize> {
        Some(Self::encoded_block_len(block))
    }

    fn encode(&self, block: &[u32], out: &mut Vec<u8>) {
        let (min, bit_width) = Self::frame(block);
        out.extend_from_slice(&min.to_le_bytes());
        out.push(bit_width);

        let deltas: Vec<u32> = block.iter().map(|value| value - min).collect();
        pack_values(&deltas, bit_width, out);
    }

    fn decode(&self, bytes: &[u8], out: &mut [u32]) {
        let (min, bit_width) = Self::read_header(bytes);
        unpack_values(&bytes[FOR_BLOCK_HEADER..], bit_width, out);
        for value in out.iter_mut() {
            *value += min;
        }
    }

    fn supports_select(&self) -> bool {
        true
    }

    fn select(&self, bytes: &[u8], index: usize) -> Option<u32> {
        let (min, bit_width) = Self::read_header(bytes);
        Some(min + unpack_value(&bytes[FOR_BLOCK_HEADER..], index, bit_width))
    }
}
