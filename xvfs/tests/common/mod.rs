// SPDX-License-Identifier: MIT
#![allow(dead_code)]

use xvfs::fs::xv6::utils;
use xvfs::xv6::*;

/// In-memory xv6 image plus the helpers tests use to break it.
pub struct Image {
    pub buf: Vec<u8>,
    pub meta: Xv6Meta,
}

/// Inode numbers of the nodes created by [`Image::populated`].
pub struct Tree {
    pub docs: u32,
    pub note: u32,
    pub big: u32,
    pub console: u32,
    pub empty: u32,
}

impl Image {
    pub fn new(size: u32, ninodes: u32) -> Self {
        let meta = Xv6Meta::new(size, ninodes).expect("meta failed");
        let mut buf = vec![0u8; size as usize * XV6_BLOCK_SIZE];
        Xv6Formatter::new(&mut MemXvIO::new(&mut buf), &meta)
            .format(true)
            .expect("format failed");
        Self { buf, meta }
    }

    /// `/docs/note`, `/big` (indirect blocks), `/console` (device),
    /// `/empty` (no blocks) and `/docs/alias` (second link to `note`).
    pub fn populated() -> (Self, Tree) {
        let mut img = Self::new(1024, 64);
        let docs = img.mkdir(XV6_ROOT_INODE, "docs");
        let note = img.file(docs, "note", b"xv6 notes");
        let big = img.file(XV6_ROOT_INODE, "big", &vec![0x5Au8; 20 * XV6_BLOCK_SIZE]);
        let console = img.device(XV6_ROOT_INODE, "console", 1, 1);
        let empty = img.file(XV6_ROOT_INODE, "empty", b"");
        img.link(docs, "alias", note);
        (
            img,
            Tree {
                docs,
                note,
                big,
                console,
                empty,
            },
        )
    }

    fn injector_io(&mut self) -> (MemXvIO<'_>, &Xv6Meta) {
        (MemXvIO::new(&mut self.buf), &self.meta)
    }

    pub fn mkdir(&mut self, parent: u32, name: &str) -> u32 {
        let (mut io, meta) = self.injector_io();
        Xv6Injector::new(&mut io, meta)
            .write_dir(parent, name)
            .expect("mkdir failed")
    }

    pub fn file(&mut self, parent: u32, name: &str, content: &[u8]) -> u32 {
        let (mut io, meta) = self.injector_io();
        Xv6Injector::new(&mut io, meta)
            .write_file(parent, name, content)
            .expect("file failed")
    }

    pub fn device(&mut self, parent: u32, name: &str, major: i16, minor: i16) -> u32 {
        let (mut io, meta) = self.injector_io();
        Xv6Injector::new(&mut io, meta)
            .write_device(parent, name, major, minor)
            .expect("device failed")
    }

    pub fn link(&mut self, parent: u32, name: &str, target: u32) {
        let (mut io, meta) = self.injector_io();
        Xv6Injector::new(&mut io, meta)
            .write_link(parent, name, target)
            .expect("link failed")
    }

    pub fn inode(&self, inum: u32) -> Xv6Inode {
        let mut io = SliceXvIO::new(&self.buf);
        utils::read_inode(&mut io, &self.meta.layout, inum).expect("read inode failed")
    }

    pub fn set_inode(&mut self, inum: u32, inode: &Xv6Inode) {
        let layout = self.meta.layout;
        let mut io = MemXvIO::new(&mut self.buf);
        utils::write_inode(&mut io, &layout, inum, inode).expect("write inode failed")
    }

    /// Edits an inode in place.
    pub fn patch_inode(&mut self, inum: u32, f: impl FnOnce(&mut Xv6Inode)) {
        let mut inode = self.inode(inum);
        f(&mut inode);
        self.set_inode(inum, &inode);
    }

    pub fn bitmap_bit(&self, block: u32) -> bool {
        let mut io = SliceXvIO::new(&self.buf);
        utils::bitmap_bit(&mut io, &self.meta.layout, block).expect("read bitmap failed")
    }

    pub fn set_bitmap(&mut self, block: u32, used: bool) {
        let layout = self.meta.layout;
        let mut io = MemXvIO::new(&mut self.buf);
        utils::set_bitmap_bit(&mut io, &layout, block, used).expect("write bitmap failed")
    }

    pub fn dir_block(&self, block: u32) -> Xv6DirBlock {
        let mut io = SliceXvIO::new(&self.buf);
        utils::read_dir_block(&mut io, block).expect("read dir block failed")
    }

    pub fn set_dirent(&mut self, block: u32, slot: usize, entry: Xv6Dirent) {
        let offset = block as u64 * XV6_BLOCK_SIZE as u64 + (slot * XV6_DIRENT_SIZE) as u64;
        let mut io = MemXvIO::new(&mut self.buf);
        io.write_struct(offset, &entry).expect("write dirent failed")
    }

    /// Slot of the entry called `name` in the first block of `dir`.
    pub fn find_entry(&self, dir: u32, name: &str) -> (u32, usize) {
        let block = self.inode(dir).direct(0);
        let slot = self
            .dir_block(block)
            .iter()
            .position(|e| e.name() == name.as_bytes())
            .expect("entry not found");
        (block, slot)
    }

    /// Lowest data block whose bitmap bit is clear.
    pub fn free_block(&self) -> u32 {
        (self.meta.layout.first_data_block..self.meta.size)
            .find(|&b| !self.bitmap_bit(b))
            .expect("image full")
    }

    pub fn indirect_entry(&self, indirect: u32, slot: usize) -> u32 {
        let mut io = SliceXvIO::new(&self.buf);
        utils::read_indirect(&mut io, indirect)
            .expect("read indirect failed")
            .get(slot)
    }

    pub fn set_indirect_entry(&mut self, indirect: u32, slot: usize, block: u32) {
        let offset = indirect as u64 * XV6_BLOCK_SIZE as u64 + slot as u64 * 4;
        let mut io = MemXvIO::new(&mut self.buf);
        io.write_u32_at(offset, block).expect("write indirect failed")
    }

    pub fn check_with(&self, opt: &Xv6CheckOptions) -> VerifyReport {
        let mut io = SliceXvIO::new(&self.buf);
        let meta = Xv6Meta::from_io(&mut io).expect("superblock failed");
        Xv6Checker::new(&mut io, &meta)
            .check_with(opt)
            .expect("check failed")
    }

    pub fn check(&self) -> VerifyReport {
        self.check_with(&Xv6CheckOptions::default())
    }

    pub fn first_violation(&self) -> Option<Violation> {
        self.check().first_violation()
    }
}
