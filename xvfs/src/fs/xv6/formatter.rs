// SPDX-License-Identifier: MIT

use xvio::{XvIO, XvIOExt, XvIOStructExt};
use zerocopy::IntoBytes;

pub use crate::core::formatter::*;

use crate::{
    ensure,
    fs::xv6::{constant::*, layout::block_offset, meta::*, types::*, utils::*},
};

/// Xv6Formatter:
/// - Writes the superblock, a zeroed inode table and the bitmap.
/// - Creates the root directory (inode 1) with "." and ".." in the first
///   data block.
/// - Marks the metadata region and the root block in use, like xv6 mkfs.
pub struct Xv6Formatter<'a, IO: XvIO + ?Sized> {
    io: &'a mut IO,
    meta: &'a Xv6Meta,
}

impl<'a, IO: XvIO + ?Sized> Xv6Formatter<'a, IO> {
    pub fn new(io: &'a mut IO, meta: &'a Xv6Meta) -> Self {
        Self { io, meta }
    }

    fn write_metadata(&mut self) -> FsFormatterResult {
        let layout = &self.meta.layout;
        self.io
            .zero_fill(0, block_offset(layout.first_data_block) as usize)?;
        self.io
            .write_struct(block_offset(XV6_SUPERBLOCK_BLOCK), &self.meta.superblock())?;
        Ok(())
    }

    fn write_root_dir(&mut self) -> FsFormatterResult {
        let layout = self.meta.layout;
        let block = layout.first_data_block;

        let entries = [
            Xv6Dirent::new(XV6_ROOT_INODE as u16, XV6_DOT_NAME),
            Xv6Dirent::new(XV6_ROOT_INODE as u16, XV6_DOTDOT_NAME),
        ];
        self.io.zero_fill(block_offset(block), XV6_BLOCK_SIZE)?;
        self.io.write_at(block_offset(block), entries.as_bytes())?;

        let mut root = Xv6Inode::new(InodeKind::Dir);
        root.set_nlink(1);
        root.set_size((entries.len() * XV6_DIRENT_SIZE) as u32);
        root.set_direct(0, block);
        write_inode(self.io, &layout, XV6_ROOT_INODE, &root)?;
        Ok(())
    }

    fn write_bitmap(&mut self) -> FsFormatterResult {
        let layout = self.meta.layout;
        // metadata blocks plus the root directory block
        for block in 0..=layout.first_data_block {
            set_bitmap_bit(self.io, &layout, block, true)?;
        }
        Ok(())
    }
}

impl<'a, IO: XvIO + ?Sized> FsFormatter for Xv6Formatter<'a, IO> {
    fn format(&mut self, full_format: bool) -> FsFormatterResult {
        ensure!(
            self.io.len() >= self.meta.size_bytes(),
            FsFormatterError::Invalid("image smaller than the file system")
        );
        ensure!(
            self.meta.ninodes > XV6_ROOT_INODE,
            FsFormatterError::Invalid("need room for the root inode")
        );
        ensure!(
            self.meta.ninodes <= u16::MAX as u32 + 1,
            FsFormatterError::Invalid("inode numbers must fit a directory entry")
        );

        self.write_metadata()?;
        if full_format {
            zero_data_region(self.io, self.meta)?;
        }
        self.write_root_dir()?;
        self.write_bitmap()?;
        Ok(())
    }

    fn flush(&mut self) -> FsFormatterResult<()> {
        self.io.flush()?;
        Ok(())
    }
}
