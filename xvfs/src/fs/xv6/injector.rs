// SPDX-License-Identifier: MIT
#[cfg(not(feature = "std"))]
use alloc::vec;

use xvio::{XvIO, XvIOExt, XvIOStructExt};
use zerocopy::IntoBytes;

pub use crate::core::injector::*;

use crate::{
    bail,
    core::{errors::FsAllocatorError, utils::bitmap::BitmapOps},
    ensure,
    fs::xv6::{constant::*, layout::block_offset, meta::*, types::*, utils::*},
};

/// Adds directories, files, devices and hard links to a formatted image.
///
/// Inodes and blocks are taken first-fit from the inode table and the
/// bitmap, so the injector also works on images it did not format.
pub struct Xv6Injector<'a, IO: XvIO + ?Sized> {
    io: &'a mut IO,
    meta: &'a Xv6Meta,
}

impl<'a, IO: XvIO + ?Sized> Xv6Injector<'a, IO> {
    pub fn new(io: &'a mut IO, meta: &'a Xv6Meta) -> Self {
        Self { io, meta }
    }

    /// Creates a device node named `name` inside `parent`.
    pub fn write_device(
        &mut self,
        parent: u32,
        name: &str,
        major: i16,
        minor: i16,
    ) -> FsInjectorResult<u32> {
        self.ensure_dir(parent)?;
        let inum = self.alloc_inode(Xv6Inode::device(major, minor))?;
        self.add_entry(parent, name, inum)?;
        Ok(inum)
    }

    fn ensure_dir(&mut self, inum: u32) -> FsInjectorResult<()> {
        ensure!(
            self.read_inode(inum)?.kind() == InodeKind::Dir,
            FsInjectorError::NotADirectory(inum)
        );
        Ok(())
    }

    pub fn read_inode(&mut self, inum: u32) -> FsInjectorResult<Xv6Inode> {
        ensure!(
            inum < self.meta.ninodes,
            FsInjectorError::Invalid("inode number out of table")
        );
        Ok(read_inode(self.io, &self.meta.layout, inum)?)
    }

    fn write_inode(&mut self, inum: u32, inode: &Xv6Inode) -> FsInjectorResult<()> {
        write_inode(self.io, &self.meta.layout, inum, inode)?;
        Ok(())
    }

    /// First free inode from 2 up, initialized from `template` with one link.
    fn alloc_inode(&mut self, mut template: Xv6Inode) -> FsInjectorResult<u32> {
        for inum in (XV6_ROOT_INODE + 1)..self.meta.ninodes {
            if self.read_inode(inum)?.kind() == InodeKind::Free {
                template.set_nlink(1);
                self.write_inode(inum, &template)?;
                return Ok(inum);
            }
        }
        bail!(FsAllocatorError::OutOfInodes)
    }

    /// First free data block; marks it in use and zeroes it.
    fn alloc_block(&mut self) -> FsInjectorResult<u32> {
        let layout = self.meta.layout;
        let (offset, len) = layout.bitmap_bytes();
        let mut bitmap = vec![0u8; len];
        self.io.read_at(offset, &mut bitmap)?;

        let block = bitmap
            .find_first_zero(layout.first_data_block as usize)
            .map(|b| b as u32)
            .filter(|&b| layout.in_range(b))
            .ok_or(FsAllocatorError::OutOfBlocks)?;

        set_bitmap_bit(self.io, &layout, block, true)?;
        self.io.zero_fill(block_offset(block), XV6_BLOCK_SIZE)?;
        Ok(block)
    }

    /// Block holding file block `index` of `inode`, allocated on demand.
    fn block_for(&mut self, inode: &mut Xv6Inode, index: usize) -> FsInjectorResult<u32> {
        if index < XV6_NDIRECT {
            if inode.direct(index) == 0 {
                let block = self.alloc_block()?;
                inode.set_direct(index, block);
            }
            return Ok(inode.direct(index));
        }

        let slot = index - XV6_NDIRECT;
        ensure!(slot < XV6_NINDIRECT, FsInjectorError::FileTooLarge);
        if inode.indirect() == 0 {
            let block = self.alloc_block()?;
            inode.set_indirect(block);
        }

        let indirect = inode.indirect();
        let mut table = read_indirect(self.io, indirect)?;
        if table.get(slot) == 0 {
            let block = self.alloc_block()?;
            table.set(slot, block);
            self.io.write_struct(block_offset(indirect), &table)?;
        }
        Ok(table.get(slot))
    }

    /// Writes `data` at the end of `inode` and grows its size.
    fn append(&mut self, inode: &mut Xv6Inode, data: &[u8]) -> FsInjectorResult<()> {
        let mut pos = inode.size() as usize;
        let mut rest = data;
        while !rest.is_empty() {
            let within = pos % XV6_BLOCK_SIZE;
            let n = rest.len().min(XV6_BLOCK_SIZE - within);
            let block = self.block_for(inode, pos / XV6_BLOCK_SIZE)?;
            self.io
                .write_at(block_offset(block) + within as u64, &rest[..n])?;
            pos += n;
            rest = &rest[n..];
        }
        inode.set_size(pos as u32);
        Ok(())
    }

    fn add_entry(&mut self, dir: u32, name: &str, target: u32) -> FsInjectorResult<()> {
        let inum = u16::try_from(target)
            .map_err(|_| FsInjectorError::Invalid("inode number does not fit a directory entry"))?;
        self.ensure_dir(dir)?;
        let mut parent = self.read_inode(dir)?;

        let entry = Xv6Dirent::new(inum, name.as_bytes());
        self.append(&mut parent, entry.as_bytes())?;
        self.write_inode(dir, &parent)
    }
}

impl<'a, IO: XvIO + ?Sized> FsNodeInjector for Xv6Injector<'a, IO> {
    fn write_dir(&mut self, parent: u32, name: &str) -> FsInjectorResult<u32> {
        self.ensure_dir(parent)?;
        let inum = self.alloc_inode(Xv6Inode::new(InodeKind::Dir))?;

        let mut dir = self.read_inode(inum)?;
        let entries = [
            Xv6Dirent::new(inum as u16, XV6_DOT_NAME),
            Xv6Dirent::new(parent as u16, XV6_DOTDOT_NAME),
        ];
        self.append(&mut dir, entries.as_bytes())?;
        self.write_inode(inum, &dir)?;

        self.add_entry(parent, name, inum)?;

        // ".." is a link to the parent
        let mut up = self.read_inode(parent)?;
        up.set_nlink(up.nlink() + 1);
        self.write_inode(parent, &up)?;
        Ok(inum)
    }

    fn write_file(&mut self, parent: u32, name: &str, content: &[u8]) -> FsInjectorResult<u32> {
        self.ensure_dir(parent)?;
        let inum = self.alloc_inode(Xv6Inode::new(InodeKind::File))?;
        let mut file = self.read_inode(inum)?;
        self.append(&mut file, content)?;
        self.write_inode(inum, &file)?;
        self.add_entry(parent, name, inum)?;
        Ok(inum)
    }

    fn write_link(&mut self, parent: u32, name: &str, target: u32) -> FsInjectorResult<()> {
        self.ensure_dir(parent)?;
        let mut inode = self.read_inode(target)?;
        match inode.kind() {
            InodeKind::Free => bail!(FsInjectorError::Invalid("cannot link a free inode")),
            InodeKind::Dir => bail!(FsInjectorError::Invalid("cannot link a directory")),
            _ => {}
        }
        inode.set_nlink(inode.nlink() + 1);
        self.write_inode(target, &inode)?;
        self.add_entry(parent, name, target)
    }

    fn flush(&mut self) -> FsInjectorResult<()> {
        self.io.flush()?;
        Ok(())
    }
}
