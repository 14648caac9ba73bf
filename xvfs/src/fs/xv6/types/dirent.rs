// SPDX-License-Identifier: MIT

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::fs::xv6::constant::*;

/// xv6 directory entry (16 bytes). `inum == 0` marks an empty slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, IntoBytes, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct Xv6Dirent {
    inum: u16,
    name: [u8; XV6_DIRSIZ],
}

const _: () = assert!(core::mem::size_of::<Xv6Dirent>() == XV6_DIRENT_SIZE);

impl Xv6Dirent {
    /// Builds an entry; names longer than `XV6_DIRSIZ` are truncated.
    pub fn new(inum: u16, name: &[u8]) -> Self {
        let mut raw = [0u8; XV6_DIRSIZ];
        let len = name.len().min(XV6_DIRSIZ);
        raw[..len].copy_from_slice(&name[..len]);
        Self {
            inum: inum.to_le(),
            name: raw,
        }
    }

    #[inline]
    pub fn inum(&self) -> u16 {
        u16::from_le(self.inum)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inum() == 0
    }

    /// Name bytes up to the first NUL.
    pub fn name(&self) -> &[u8] {
        let end = self
            .name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(XV6_DIRSIZ);
        &self.name[..end]
    }

    #[inline]
    pub fn is_dot(&self) -> bool {
        self.name() == XV6_DOT_NAME
    }

    #[inline]
    pub fn is_dotdot(&self) -> bool {
        self.name() == XV6_DOTDOT_NAME
    }

    #[inline]
    pub fn is_dot_or_dotdot(&self) -> bool {
        self.is_dot() || self.is_dotdot()
    }
}

/// One directory block worth of entries.
pub type Xv6DirBlock = [Xv6Dirent; XV6_DIRENTS_PER_BLOCK];
