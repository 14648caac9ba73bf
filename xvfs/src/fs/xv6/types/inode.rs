// SPDX-License-Identifier: MIT
//! xv6 on-disk inode

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::fs::xv6::constant::*;

/// Decoded inode type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InodeKind {
    Free,
    Dir,
    File,
    Device,
    Unknown(i16),
}

impl InodeKind {
    pub fn from_raw(raw: i16) -> Self {
        match raw {
            XV6_T_FREE => InodeKind::Free,
            XV6_T_DIR => InodeKind::Dir,
            XV6_T_FILE => InodeKind::File,
            XV6_T_DEV => InodeKind::Device,
            other => InodeKind::Unknown(other),
        }
    }

    pub fn raw(&self) -> i16 {
        match self {
            InodeKind::Free => XV6_T_FREE,
            InodeKind::Dir => XV6_T_DIR,
            InodeKind::File => XV6_T_FILE,
            InodeKind::Device => XV6_T_DEV,
            InodeKind::Unknown(raw) => *raw,
        }
    }

    /// Any non-zero type counts as in use, valid or not.
    #[inline]
    pub fn is_in_use(&self) -> bool {
        !matches!(self, InodeKind::Free)
    }
}

/// xv6 on-disk inode (64 bytes, 8 per block).
///
/// `addrs[0..12]` are direct block addresses, `addrs[12]` is the indirect
/// block. Zero means "no block".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, IntoBytes, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct Xv6Inode {
    kind: i16,
    major: i16,
    minor: i16,
    nlink: i16,
    size: u32,
    addrs: [u32; XV6_NDIRECT + 1],
}

const _: () = assert!(core::mem::size_of::<Xv6Inode>() == XV6_INODE_SIZE);

impl Xv6Inode {
    pub fn new(kind: InodeKind) -> Self {
        let mut inode = Self::default();
        inode.set_kind(kind);
        inode
    }

    pub fn device(major: i16, minor: i16) -> Self {
        let mut inode = Self::new(InodeKind::Device);
        inode.major = major.to_le();
        inode.minor = minor.to_le();
        inode
    }

    #[inline]
    pub fn kind(&self) -> InodeKind {
        InodeKind::from_raw(self.raw_kind())
    }

    #[inline]
    pub fn raw_kind(&self) -> i16 {
        i16::from_le(self.kind)
    }

    pub fn set_kind(&mut self, kind: InodeKind) {
        self.kind = kind.raw().to_le();
    }

    pub fn major(&self) -> i16 {
        i16::from_le(self.major)
    }

    pub fn minor(&self) -> i16 {
        i16::from_le(self.minor)
    }

    #[inline]
    pub fn nlink(&self) -> i16 {
        i16::from_le(self.nlink)
    }

    pub fn set_nlink(&mut self, nlink: i16) {
        self.nlink = nlink.to_le();
    }

    /// Raw size word.
    #[inline]
    pub fn size(&self) -> u32 {
        u32::from_le(self.size)
    }

    /// Size read as a signed word; negative values make the inode invalid.
    #[inline]
    pub fn signed_size(&self) -> i32 {
        self.size() as i32
    }

    pub fn set_size(&mut self, size: u32) {
        self.size = size.to_le();
    }

    /// Inodes with a zero size own no blocks and are skipped by the scan.
    #[inline]
    pub fn has_data(&self) -> bool {
        self.size() != 0
    }

    /// Directory entries covered by the size.
    #[inline]
    pub fn dirent_count(&self) -> usize {
        self.size() as usize / XV6_DIRENT_SIZE
    }

    #[inline]
    pub fn direct(&self, slot: usize) -> u32 {
        u32::from_le(self.addrs[slot])
    }

    pub fn set_direct(&mut self, slot: usize, block: u32) {
        self.addrs[slot] = block.to_le();
    }

    /// Direct addresses in slot order.
    pub fn direct_addrs(&self) -> impl Iterator<Item = u32> + '_ {
        self.addrs[..XV6_NDIRECT].iter().map(|a| u32::from_le(*a))
    }

    #[inline]
    pub fn indirect(&self) -> u32 {
        u32::from_le(self.addrs[XV6_NDIRECT])
    }

    pub fn set_indirect(&mut self, block: u32) {
        self.addrs[XV6_NDIRECT] = block.to_le();
    }
}

/// Content of an indirect block: `XV6_NINDIRECT` little-endian addresses.
#[derive(Debug, Clone, Copy, IntoBytes, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct Xv6IndirectBlock {
    addrs: [u32; XV6_NINDIRECT],
}

impl Default for Xv6IndirectBlock {
    fn default() -> Self {
        Self {
            addrs: [0; XV6_NINDIRECT],
        }
    }
}

impl Xv6IndirectBlock {
    #[inline]
    pub fn get(&self, slot: usize) -> u32 {
        u32::from_le(self.addrs[slot])
    }

    pub fn set(&mut self, slot: usize, block: u32) {
        self.addrs[slot] = block.to_le();
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.addrs.iter().map(|a| u32::from_le(*a))
    }
}
