// SPDX-License-Identifier: MIT

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// xv6 superblock, stored at the start of block 1.
///
/// Fields hold the raw little-endian words; use the accessors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, IntoBytes, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct Xv6Superblock {
    size: u32,
    nblocks: u32,
    ninodes: u32,
}

const _: () = assert!(core::mem::size_of::<Xv6Superblock>() == 12);

impl Xv6Superblock {
    pub fn new(size: u32, nblocks: u32, ninodes: u32) -> Self {
        Self {
            size: size.to_le(),
            nblocks: nblocks.to_le(),
            ninodes: ninodes.to_le(),
        }
    }

    /// Total blocks in the file system.
    #[inline]
    pub fn size(&self) -> u32 {
        u32::from_le(self.size)
    }

    /// Number of data blocks.
    #[inline]
    pub fn nblocks(&self) -> u32 {
        u32::from_le(self.nblocks)
    }

    /// Number of inodes.
    #[inline]
    pub fn ninodes(&self) -> u32 {
        u32::from_le(self.ninodes)
    }
}
