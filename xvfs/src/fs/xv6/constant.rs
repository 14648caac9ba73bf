// SPDX-License-Identifier: MIT

// === Blocks ===

/// Block size in bytes.
pub const XV6_BLOCK_SIZE: usize = 512;

/// Block holding the superblock. Block 0 is the (unused) boot block.
pub const XV6_SUPERBLOCK_BLOCK: u32 = 1;

/// First block of the inode table.
pub const XV6_INODE_START_BLOCK: u32 = 2;

// === Inodes ===

pub const XV6_ROOT_INODE: u32 = 1;

/// On-disk inode size in bytes.
pub const XV6_INODE_SIZE: usize = 64;

/// Inodes per block.
pub const XV6_INODES_PER_BLOCK: u32 = (XV6_BLOCK_SIZE / XV6_INODE_SIZE) as u32;

/// Direct block slots per inode.
pub const XV6_NDIRECT: usize = 12;

/// Block addresses held by the indirect block.
pub const XV6_NINDIRECT: usize = XV6_BLOCK_SIZE / 4;

/// Largest file in blocks.
pub const XV6_MAX_FILE_BLOCKS: usize = XV6_NDIRECT + XV6_NINDIRECT;

// Inode types
pub const XV6_T_FREE: i16 = 0;
pub const XV6_T_DIR: i16 = 1;
pub const XV6_T_FILE: i16 = 2;
pub const XV6_T_DEV: i16 = 3;

// === Bitmap ===

/// Bitmap bits per block.
pub const XV6_BITS_PER_BLOCK: u32 = (XV6_BLOCK_SIZE * 8) as u32;

// === Directories ===

/// Name field width of a directory entry (NUL padded, not terminated).
pub const XV6_DIRSIZ: usize = 14;

/// Directory entry size in bytes.
pub const XV6_DIRENT_SIZE: usize = 16;

/// Directory entries per block.
pub const XV6_DIRENTS_PER_BLOCK: usize = XV6_BLOCK_SIZE / XV6_DIRENT_SIZE;

pub const XV6_DOT_NAME: &[u8] = b".";
pub const XV6_DOTDOT_NAME: &[u8] = b"..";

// === Formatter defaults ===

pub const XV6_DEFAULT_SIZE_BLOCKS: u32 = 1024;
pub const XV6_DEFAULT_NINODES: u32 = 200;
