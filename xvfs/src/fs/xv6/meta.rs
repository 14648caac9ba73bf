// SPDX-License-Identifier: MIT

pub use crate::core::meta::*;

use xvio::{XvIO, XvIOStructExt};

use crate::{
    core::errors::{FsParsingError, FsParsingResult},
    fs::xv6::{
        constant::*,
        layout::{Xv6Layout, block_offset},
        types::Xv6Superblock,
    },
};

/// Geometry of an xv6 file system, as described by its superblock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Xv6Meta {
    /// Total blocks, metadata included.
    pub size: u32,
    pub nblocks: u32,
    pub ninodes: u32,
    pub layout: Xv6Layout,
}

impl Xv6Meta {
    /// Geometry for a new image of `size` blocks holding `ninodes` inodes.
    pub fn new(size: u32, ninodes: u32) -> FsParsingResult<Self> {
        let layout = Xv6Layout::compute(size, ninodes);
        if layout.first_data_block >= size {
            return Err(FsParsingError::Invalid("no room left for data blocks"));
        }
        Ok(Self {
            size,
            nblocks: size - layout.first_data_block,
            ninodes,
            layout,
        })
    }

    pub fn from_superblock(sb: &Xv6Superblock) -> Self {
        Self {
            size: sb.size(),
            nblocks: sb.nblocks(),
            ninodes: sb.ninodes(),
            layout: Xv6Layout::compute(sb.size(), sb.ninodes()),
        }
    }

    /// Reads the superblock and derives the layout.
    ///
    /// The superblock is trusted, but the inode table and the bitmap it
    /// implies must lie inside the image, otherwise nothing can be checked.
    pub fn from_io<IO: XvIO + ?Sized>(io: &mut IO) -> FsParsingResult<Self> {
        let sb: Xv6Superblock = io.read_struct(block_offset(XV6_SUPERBLOCK_BLOCK))?;
        let meta = Self::from_superblock(&sb);

        let image_len = io.len();
        if meta.layout.inode_offset(meta.ninodes) > image_len {
            return Err(FsParsingError::Invalid("inode table exceeds image"));
        }
        let (bitmap_offset, bitmap_len) = meta.layout.bitmap_bytes();
        if bitmap_offset + bitmap_len as u64 > image_len {
            return Err(FsParsingError::Invalid("bitmap exceeds image"));
        }
        Ok(meta)
    }

    pub fn superblock(&self) -> Xv6Superblock {
        Xv6Superblock::new(self.size, self.nblocks, self.ninodes)
    }
}

impl FsMeta<u32> for Xv6Meta {
    fn unit_size(&self) -> usize {
        XV6_BLOCK_SIZE
    }

    fn unit_offset(&self, unit: u32) -> u64 {
        block_offset(unit)
    }

    fn root_unit(&self) -> u32 {
        XV6_ROOT_INODE
    }

    fn first_data_unit(&self) -> u32 {
        self.layout.first_data_block
    }

    fn last_data_unit(&self) -> u32 {
        self.size.saturating_sub(1)
    }

    fn total_units(&self) -> usize {
        self.size as usize
    }

    fn size_bytes(&self) -> u64 {
        block_offset(self.size)
    }
}
