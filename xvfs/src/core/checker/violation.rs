// SPDX-License-Identifier: MIT

use core::fmt;

/// Catalogue of consistency rules an inode/bitmap file system can break.
///
/// Each variant carries a stable short code (used in reports and config) and
/// the exact one-line message printed to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Violation {
    /// Inode type outside {free, dir, file, device} or negative size.
    BadInode,
    /// A direct block address lies outside the file system.
    BadDirectAddress,
    /// An indirect block address (or the indirect slot) lies outside the file system.
    BadIndirectAddress,
    /// Root inode has no data, or its "." / ".." do not point at the root.
    RootMissing,
    /// A directory does not carry "." pointing at itself and a "..".
    DirNotFormatted,
    /// A block referenced by an inode is clear in the free-block bitmap.
    MarkedFree,
    /// A data block is marked in use but no inode references it.
    UnclaimedBlock,
    /// A block reached through a direct slot was already claimed.
    DirectReuse,
    /// A block reached through the indirect block was already claimed.
    IndirectReuse,
    /// An in-use inode is not named by any directory.
    InodeNotReferenced,
    /// A directory names a free inode.
    FreeInodeReferenced,
    /// A regular file's link count differs from the number of names it has.
    BadFileRefCount,
    /// A directory is named by more than one parent.
    DirMultiplyLinked,
}

impl Violation {
    /// Every rule in the order the checker evaluates the inode-local ones.
    pub const ALL: [Violation; 13] = [
        Violation::BadInode,
        Violation::BadDirectAddress,
        Violation::BadIndirectAddress,
        Violation::RootMissing,
        Violation::DirNotFormatted,
        Violation::MarkedFree,
        Violation::UnclaimedBlock,
        Violation::DirectReuse,
        Violation::IndirectReuse,
        Violation::InodeNotReferenced,
        Violation::FreeInodeReferenced,
        Violation::BadFileRefCount,
        Violation::DirMultiplyLinked,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Violation::BadInode => "INO.TYPE",
            Violation::BadDirectAddress => "BLK.DIRECT",
            Violation::BadIndirectAddress => "BLK.INDIR",
            Violation::RootMissing => "ROOT.DIR",
            Violation::DirNotFormatted => "DIR.FMT",
            Violation::MarkedFree => "BMP.FREE",
            Violation::UnclaimedBlock => "BMP.USED",
            Violation::DirectReuse => "BLK.DUP",
            Violation::IndirectReuse => "BLK.IDUP",
            Violation::InodeNotReferenced => "REF.LOST",
            Violation::FreeInodeReferenced => "REF.FREE",
            Violation::BadFileRefCount => "REF.FILE",
            Violation::DirMultiplyLinked => "REF.DIR",
        }
    }

    pub fn msg(&self) -> &'static str {
        match self {
            Violation::BadInode => "bad inode",
            Violation::BadDirectAddress => "bad direct address in inode",
            Violation::BadIndirectAddress => "bad indirect address in inode",
            Violation::RootMissing => "root directory does not exist",
            Violation::DirNotFormatted => "directory not properly formatted",
            Violation::MarkedFree => "address used by inode but marked free in bitmap",
            Violation::UnclaimedBlock => "bitmap marks block in use but it is not in use",
            Violation::DirectReuse => "direct address used more than once",
            Violation::IndirectReuse => "indirect address used more than once",
            Violation::InodeNotReferenced => "inode marked use but not found in a directory",
            Violation::FreeInodeReferenced => "inode referred to in directory but marked free",
            Violation::BadFileRefCount => "bad reference count for file",
            Violation::DirMultiplyLinked => "directory appears more than once in file system",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.code() == code)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ERROR: {}.", self.msg())
    }
}
