//! Helper utilities and common functions

/// Type alias for logical positions inside a segment
pub type ChunkOffset = usize;

/// Helper function to divide and round up
pub fn div_round_up(dividend: usize, divisor: usize) -> usize {
    dividend.div_ceil(divisor)
}

/// Mask selecting the lowest `bit_width` bits of a u64
#[inline]
pub fn low_bits_mask(bit_width: u8) -> u64 {
    if bit_width >= 64 {
        u64::MAX
    } else {
        (1u64 << bit_width) - 1
    }
}

/// Whether `value` is representable with `bit_width` bits
#[inline]
pub fn fits_in_bits(value: u32, bit_width: u8) -> bool {
    u64::from(value) <= low_bits_mask(bit_width)
}

/// Bytes needed for `count` values packed at `bit_width` bits each
pub fn packed_byte_len(count: usize, bit_width: u8) -> usize {
    div_round_up(count * bit_width as usize, 8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_div_round_up() {
        assert_eq!(div_round_up(0, 8), 0);
        assert_eq!(div_round_up(1, 8), 1);
        assert_eq!(div_round_up(8, 8), 1);
        assert_eq!(div_round_up(9, 8), 2);
    }

    #[test]
    fn test_low_bits_mask() {
        assert_eq!(low_bits_mask(0), 0);
        assert_eq!(low_bits_mask(1), 1);
        assert_eq!(low_bits_mask(32), u32::MAX as u64);
        assert_eq!(low_bits_mask(64), u64::MAX);
    }

    #[test]
    fn test_fits_in_bits() {
        assert!(fits_in_bits(3, 2));
        assert!(!fits_in_bits(4, 2));
        assert!(fits_in_bits(u32::MAX, 32));
    }

    #[test]
    fn test_packed_byte_len() {
        assert_eq!(packed_byte_len(1_000_000, 2), 250_000);
        assert_eq!(packed_byte_len(3, 3), 2);
        assert_eq!(packed_byte_len(0, 17), 0);
    }
}
