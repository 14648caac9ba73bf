// SPDX-License-Identifier: MIT

//! Bit helpers over byte slices.
//!
//! Bit `n` lives in byte `n / 8` at position `n % 8` (LSB first), which is
//! also the on-disk order of the xv6 free-block bitmap.

/// Extension trait for bitmap operations on byte slices.
pub trait BitmapOps {
    /// Sets or clears bit `bit`. Out of bounds bits are ignored.
    fn set_bit(&mut self, bit: usize, value: bool);

    /// Returns `false` when `bit` is out of bounds.
    fn get_bit(&self, bit: usize) -> bool;

    /// Finds the first clear bit at or after `start`.
    fn find_first_zero(&self, start: usize) -> Option<usize>;
}

impl BitmapOps for [u8] {
    #[inline]
    fn set_bit(&mut self, bit: usize, value: bool) {
        if let Some(byte) = self.get_mut(bit / 8) {
            let mask = 1u8 << (bit % 8);
            if value {
                *byte |= mask;
            } else {
                *byte &= !mask;
            }
        }
    }

    #[inline]
    fn get_bit(&self, bit: usize) -> bool {
        self.get(bit / 8)
            .is_some_and(|b| (b & (1 << (bit % 8))) != 0)
    }

    fn find_first_zero(&self, start: usize) -> Option<usize> {
        let first_byte = start / 8;
        for (byte_idx, &byte) in self.iter().enumerate().skip(first_byte) {
            if byte == 0xFF {
                continue;
            }
            let from = if byte_idx == first_byte { start % 8 } else { 0 };
            if let Some(bit) = (from..8).find(|b| byte & (1 << b) == 0) {
                return Some(byte_idx * 8 + bit);
            }
        }
        None
    }
}
