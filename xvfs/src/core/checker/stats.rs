// SPDX-License-Identifier: MIT

/// Counters collected while walking inodes and directories.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WalkerStats {
    /// Inodes read from the inode table.
    pub inodes_checked: usize,
    /// Allocated directories whose entries were scanned.
    pub dirs_visited: usize,
    /// Allocated regular files.
    pub files_found: usize,
    /// Allocated device nodes.
    pub devices_found: usize,
    /// Directory entries examined.
    pub entries_scanned: usize,
    /// Data blocks claimed by inodes (indirect blocks included).
    pub blocks_claimed: usize,
    /// Indirect blocks followed.
    pub indirect_blocks: usize,
}

impl WalkerStats {
    pub fn new() -> Self {
        Self::default()
    }
}
