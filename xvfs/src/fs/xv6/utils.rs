// SPDX-License-Identifier: MIT

use xvio::{XvIO, XvIOExt, XvIOStructExt, errors::XvIOResult};

use crate::fs::xv6::{
    layout::{Xv6Layout, block_offset},
    types::*,
};

#[inline]
pub fn read_inode<IO: XvIO + ?Sized>(
    io: &mut IO,
    layout: &Xv6Layout,
    inum: u32,
) -> XvIOResult<Xv6Inode> {
    io.read_struct(layout.inode_offset(inum))
}

#[inline]
pub fn write_inode<IO: XvIO + ?Sized>(
    io: &mut IO,
    layout: &Xv6Layout,
    inum: u32,
    inode: &Xv6Inode,
) -> XvIOResult {
    io.write_struct(layout.inode_offset(inum), inode)
}

#[inline]
pub fn read_dir_block<IO: XvIO + ?Sized>(io: &mut IO, block: u32) -> XvIOResult<Xv6DirBlock> {
    io.read_struct(block_offset(block))
}

#[inline]
pub fn read_indirect<IO: XvIO + ?Sized>(io: &mut IO, block: u32) -> XvIOResult<Xv6IndirectBlock> {
    io.read_struct(block_offset(block))
}

/// Reads the bitmap bit of `block`.
#[inline]
pub fn bitmap_bit<IO: XvIO + ?Sized>(
    io: &mut IO,
    layout: &Xv6Layout,
    block: u32,
) -> XvIOResult<bool> {
    let (offset, mask) = layout.bitmap_bit(block);
    Ok(io.read_u8_at(offset)? & mask != 0)
}

/// Sets or clears the bitmap bit of `block`.
pub fn set_bitmap_bit<IO: XvIO + ?Sized>(
    io: &mut IO,
    layout: &Xv6Layout,
    block: u32,
    used: bool,
) -> XvIOResult {
    let (offset, mask) = layout.bitmap_bit(block);
    let byte = io.read_u8_at(offset)?;
    let byte = if used { byte | mask } else { byte & !mask };
    io.write_u8_at(offset, byte)
}
