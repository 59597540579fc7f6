//! Shift/mask helpers for fields packed MSB-first across byte boundaries.

use crate::error::{Error, Result};

/// Reads `width` bits (at most 32) starting `bit_offset` bits into `bytes`,
/// most significant bit first.
pub fn read_bits(bytes: &[u8], bit_offset: usize, width: u32) -> Result<u32> {
    debug_assert!(width <= 32);
    let end = bit_offset + width as usize;
    if end > bytes.len() * 8 {
        return Err(Error::invalid_audio_config(format!(
            "need {} bits, have {}",
            end,
            bytes.len() * 8
        )));
    }

    let mut value: u64 = 0;
    for bit in bit_offset..end {
        let byte = bytes[bit / 8];
        let shift = 7 - (bit % 8);
        value = (value << 1) | u64::from((byte >> shift) & 1);
    }

    Ok(value as u32)
}

/// ORs the low `width` bits of `value` into `bytes` at `bit_offset`, most
/// significant bit first. Target bits are expected to be zero.
pub fn write_bits(bytes: &mut [u8], bit_offset: usize, width: u32, value: u32) {
    debug_assert!(width <= 32);
    debug_assert!(bit_offset + width as usize <= bytes.len() * 8);
    for i in 0..width as usize {
        let bit = (value >> (width as usize - 1 - i)) & 1;
        let pos = bit_offset + i;
        bytes[pos / 8] |= (bit as u8) << (7 - (pos % 8));
    }
}
