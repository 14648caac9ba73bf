// SPDX-License-Identifier: MIT

use crate::fs::xv6::constant::*;

/// Region boundaries of an xv6 image, derived from `size` and `ninodes`.
///
/// ```text
/// | boot | super | inodes ... | bitmap ... | data ... |
///   0      1       2            bitmap_start first_data_block
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Xv6Layout {
    pub size: u32,
    pub ninodes: u32,
    pub inode_start: u32,
    pub inode_blocks: u32,
    pub bitmap_start: u32,
    pub bitmap_blocks: u32,
    pub first_data_block: u32,
}

impl Xv6Layout {
    pub fn compute(size: u32, ninodes: u32) -> Self {
        let inode_start = XV6_INODE_START_BLOCK;
        let inode_blocks = ninodes / XV6_INODES_PER_BLOCK + 1;
        let bitmap_start = inode_start + inode_blocks;
        // The bitmap reserves room for bit `size` too, hence the +1.
        let bitmap_blocks = size / XV6_BITS_PER_BLOCK + 1;
        let first_data_block = bitmap_start + bitmap_blocks;

        Self {
            size,
            ninodes,
            inode_start,
            inode_blocks,
            bitmap_start,
            bitmap_blocks,
            first_data_block,
        }
    }

    /// Block holding inode `inum`.
    #[inline]
    pub fn inode_block(&self, inum: u32) -> u32 {
        inum / XV6_INODES_PER_BLOCK + self.inode_start
    }

    /// Byte offset of inode `inum` in the image.
    #[inline]
    pub fn inode_offset(&self, inum: u32) -> u64 {
        block_offset(self.inode_block(inum))
            + (inum % XV6_INODES_PER_BLOCK) as u64 * XV6_INODE_SIZE as u64
    }

    /// Bitmap block holding the bit of `block`.
    #[inline]
    pub fn bitmap_block(&self, block: u32) -> u32 {
        self.bitmap_start + block / XV6_BITS_PER_BLOCK
    }

    /// Byte offset and mask of the bitmap bit for `block`.
    #[inline]
    pub fn bitmap_bit(&self, block: u32) -> (u64, u8) {
        let bit = block % XV6_BITS_PER_BLOCK;
        let offset = block_offset(self.bitmap_block(block)) + (bit / 8) as u64;
        (offset, 1u8 << (bit % 8))
    }

    /// Byte offset and length of the bitmap region.
    pub fn bitmap_bytes(&self) -> (u64, usize) {
        (
            block_offset(self.bitmap_start),
            self.bitmap_blocks as usize * XV6_BLOCK_SIZE,
        )
    }

    /// `true` when `block` is a valid address for this file system.
    #[inline]
    pub fn in_range(&self, block: u32) -> bool {
        block < self.size
    }

    /// Blocks holding boot, superblock, inodes and bitmap.
    #[inline]
    pub fn metadata_blocks(&self) -> u32 {
        self.first_data_block
    }
}

/// Byte offset of `block` in the image.
#[inline]
pub fn block_offset(block: u32) -> u64 {
    block as u64 * XV6_BLOCK_SIZE as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_mkfs_geometry() {
        // 1024 blocks, 200 inodes: inodes in 2..=27, bitmap in 28, data from 29
        let l = Xv6Layout::compute(1024, 200);
        assert_eq!(l.inode_blocks, 26);
        assert_eq!(l.bitmap_start, 28);
        assert_eq!(l.bitmap_blocks, 1);
        assert_eq!(l.first_data_block, 29);
        assert_eq!(l.metadata_blocks(), 29);
    }

    #[test]
    fn test_inode_and_bitmap_addressing() {
        let l = Xv6Layout::compute(1024, 200);

        assert_eq!(l.inode_block(1), 2);
        assert_eq!(l.inode_block(8), 3);
        assert_eq!(l.inode_offset(9), 3 * 512 + 64);

        assert_eq!(l.bitmap_bit(0), (28 * 512, 0b0000_0001));
        assert_eq!(l.bitmap_bit(13), (28 * 512 + 1, 0b0010_0000));
        assert!(l.in_range(1023));
        assert!(!l.in_range(1024));
    }

    #[test]
    fn test_bitmap_spans_several_blocks() {
        let l = Xv6Layout::compute(8192, 16);
        assert_eq!(l.bitmap_blocks, 3);
        assert_eq!(l.bitmap_block(4096), l.bitmap_start + 1);
        assert_eq!(l.bitmap_bit(4097).0, block_offset(l.bitmap_start + 1));
    }
}
