/// Variable-byte block codec
///
/// Every value is written as little-endian 7-bit groups; the high bit of a
/// byte marks that another group follows. Values below 128 take one byte,
/// the full u32 range at most five.
///
/// The encoding has no random access inside a block: point reads decode the
/// owning block once and serve further reads from the decompressor's cache.
use crate::storage::compression::traits::BlockCodec;
use crate::storage::compression::types::EncodingType;

/// Variable-byte codec without point decode support
#[derive(Debug, Clone, Copy, Default)]
pub struct VarByteCodec;

impl VarByteCodec {
    pub const ID: u8 = 3;

    pub fn new() -> Self {
        Self
    }

    /// Bytes needed for a single value
    #[inline]
    pub fn value_len(value: u32) -> usize {
        match value {
            0..=0x7f => 1,
            0x80..=0x3fff => 2,
            0x4000..=0x1f_ffff => 3,
            0x20_0000..=0x0fff_ffff => 4,
            _ => 5,
        }
    }

    /// Bytes `encode` produces for `block`
    pub fn encoded_block_len(block: &[u32]) -> usize {
        block.iter().map(|value| Self::value_len(*value)).sum()
    }
}

impl BlockCodec for VarByteCodec {
    fn id(&self) -> u8 {
        Self::ID
    }

    fn name(&self) -> &'static str {
        "VarByte"
    }

    fn encoding_type(&self) -> EncodingType {
        EncodingType::VarByte
    }

    fn encoded_len(&self, block: &[u32]) -> Option<usize> {
        Some(Self::encoded_block_len(block))
    }

    fn encode(&self, block: &[u32], out: &mut Vec<u8>) {
        for &value in block {
            let mut remaining = value;
            while remaining >= 0x80 {
                out.push((remaining as u8 & 0x7f) | 0x80);
                remaining >>= 7;
            }
            out.push(remaining as u8);
        }
    }

    fn decode(&self, bytes: &[u8], out: &mut [u32]) {
        let mut pos = 0;
        for slot in out.iter_mut() {
            let mut value = 0u32;
            let mut shift = 0;
            loop {
                let byte = bytes[pos];
                pos += 1;
                value |= u32::from(byte & 0x7f) << shift;
                if byte & 0x80 == 0 {
                    break;
                }
                shift += 7;
            }
            *slot = value;
        }
    }
}
