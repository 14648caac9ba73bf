// SPDX-License-Identifier: MIT

//! Consistency rules as pure predicates.
//!
//! Each function looks at already-read values and answers `Ok(())` or the
//! [`Violation`] it detects. Reading the image and deciding whether to stop
//! is left to the caller.

use crate::{
    core::checker::Violation,
    fs::xv6::{constant::XV6_ROOT_INODE, layout::Xv6Layout, types::*},
};

/// Where a block address was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimSite {
    /// One of the inode's direct slots.
    Direct,
    /// The indirect slot itself, or an entry of the indirect block.
    Indirect,
}

impl ClaimSite {
    fn out_of_range(self) -> Violation {
        match self {
            ClaimSite::Direct => Violation::BadDirectAddress,
            ClaimSite::Indirect => Violation::BadIndirectAddress,
        }
    }

    fn reused(self) -> Violation {
        match self {
            ClaimSite::Direct => Violation::DirectReuse,
            ClaimSite::Indirect => Violation::IndirectReuse,
        }
    }
}

/// Root inode must hold data.
pub fn root_has_data(root: &Xv6Inode) -> Result<(), Violation> {
    if root.signed_size() > 0 {
        Ok(())
    } else {
        Err(Violation::RootMissing)
    }
}

/// "." and ".." of the root must both name the root.
pub fn root_entry(entry: &Xv6Dirent) -> Result<(), Violation> {
    if entry.inum() as u32 == XV6_ROOT_INODE {
        Ok(())
    } else {
        Err(Violation::RootMissing)
    }
}

/// Allocated inodes need a known type and a non-negative size.
pub fn inode_shape(inode: &Xv6Inode) -> Result<(), Violation> {
    let known = matches!(
        inode.kind(),
        InodeKind::Dir | InodeKind::File | InodeKind::Device
    );
    if known && inode.signed_size() >= 0 {
        Ok(())
    } else {
        Err(Violation::BadInode)
    }
}

pub fn address_in_range(layout: &Xv6Layout, addr: u32, site: ClaimSite) -> Result<(), Violation> {
    if layout.in_range(addr) {
        Ok(())
    } else {
        Err(site.out_of_range())
    }
}

/// A referenced block must be marked in use.
pub fn address_marked(marked: bool) -> Result<(), Violation> {
    if marked { Ok(()) } else { Err(Violation::MarkedFree) }
}

/// `fresh` is `false` when the block had already been claimed.
pub fn address_unclaimed(fresh: bool, site: ClaimSite) -> Result<(), Violation> {
    if fresh { Ok(()) } else { Err(site.reused()) }
}

/// "." inside a directory must name the directory itself.
pub fn self_entry(entry: &Xv6Dirent, dir_inum: u32) -> Result<(), Violation> {
    if entry.inum() as u32 == dir_inum {
        Ok(())
    } else {
        Err(Violation::DirNotFormatted)
    }
}

/// A directory needs exactly one "." and one ".." in its direct blocks.
pub fn dir_tally(tally: u8) -> Result<(), Violation> {
    if tally == 2 {
        Ok(())
    } else {
        Err(Violation::DirNotFormatted)
    }
}

/// A block marked in use in the bitmap must be claimed by some inode.
pub fn bitmap_claimed(claimed: bool) -> Result<(), Violation> {
    if claimed {
        Ok(())
    } else {
        Err(Violation::UnclaimedBlock)
    }
}

/// Reference-count rules for inode numbers 2 and up.
///
/// "Free" is decided by the type field alone.
pub fn reference_count(inode: &Xv6Inode, refs: u32) -> Result<(), Violation> {
    let kind = inode.kind();
    if !kind.is_in_use() {
        return if refs == 0 {
            Ok(())
        } else {
            Err(Violation::FreeInodeReferenced)
        };
    }
    if refs == 0 {
        return Err(Violation::InodeNotReferenced);
    }
    match kind {
        InodeKind::File if refs as i64 != inode.nlink() as i64 => Err(Violation::BadFileRefCount),
        InodeKind::Dir if refs > 1 => Err(Violation::DirMultiplyLinked),
        _ => Ok(()),
    }
}
