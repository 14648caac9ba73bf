// SPDX-License-Identifier: MIT

//! Inode table scan and block address walk.

#[cfg(not(feature = "std"))]
use alloc::format;

use xvio::XvIO;

use super::{
    context::CheckRun,
    dirgraph::SelfParentTally,
    rules::{self, ClaimSite},
};
use crate::{
    core::checker::{FsCheckerResult, VerifyReport, WalkerStats},
    fs::xv6::{layout::Xv6Layout, types::*, utils::*},
};

/// Walks every inode with data, claiming its blocks and checking the
/// formatting of directories on the way.
pub(crate) struct InodeScanner<'s, IO: XvIO + ?Sized> {
    io: &'s mut IO,
    layout: &'s Xv6Layout,
    run: &'s mut CheckRun,
    stats: &'s mut WalkerStats,
}

impl<'s, IO: XvIO + ?Sized> InodeScanner<'s, IO> {
    pub fn new(
        io: &'s mut IO,
        layout: &'s Xv6Layout,
        run: &'s mut CheckRun,
        stats: &'s mut WalkerStats,
    ) -> Self {
        Self {
            io,
            layout,
            run,
            stats,
        }
    }

    pub fn scan(&mut self, rep: &mut VerifyReport) -> FsCheckerResult<()> {
        for inum in 0..self.layout.ninodes {
            let inode = read_inode(self.io, self.layout, inum)?;
            self.stats.inodes_checked += 1;
            if !inode.has_data() {
                continue;
            }
            self.scan_inode(inum, &inode, rep)?;
        }
        self.run.inodes_scanned = true;
        Ok(())
    }

    fn scan_inode(
        &mut self,
        inum: u32,
        inode: &Xv6Inode,
        rep: &mut VerifyReport,
    ) -> FsCheckerResult<()> {
        let shape = rules::inode_shape(inode);
        if !self.run.enforce(rep, shape, || {
            format!(
                "inode {inum}, type {}, size {}",
                inode.raw_kind(),
                inode.signed_size()
            )
        })? {
            return Ok(());
        }

        let mut tally = match inode.kind() {
            InodeKind::Dir => {
                self.stats.dirs_visited += 1;
                Some(SelfParentTally::new(inum, inode))
            }
            InodeKind::File => {
                self.stats.files_found += 1;
                None
            }
            _ => {
                self.stats.devices_found += 1;
                None
            }
        };

        for (slot, addr) in inode.direct_addrs().enumerate() {
            if addr == 0 {
                continue;
            }
            if !self.claim(inum, addr, ClaimSite::Direct, rep)? {
                continue;
            }
            if let Some(tally) = tally.as_mut() {
                let entries = read_dir_block(self.io, addr)?;
                self.run.enforce(rep, tally.observe(&entries), || {
                    format!("directory inode {inum}, slot {slot}, block {addr}")
                })?;
            }
        }

        if let Some(tally) = tally {
            self.stats.entries_scanned += tally.examined();
            self.run.enforce(rep, tally.finish(), || {
                format!("directory inode {inum} lacks \".\" or \"..\"")
            })?;
        }

        self.walk_indirect(inum, inode.indirect(), rep)
    }

    /// Claims the indirect block itself, then every address it lists.
    fn walk_indirect(
        &mut self,
        inum: u32,
        indirect: u32,
        rep: &mut VerifyReport,
    ) -> FsCheckerResult<()> {
        if indirect == 0 || !self.claim(inum, indirect, ClaimSite::Indirect, rep)? {
            return Ok(());
        }
        self.stats.indirect_blocks += 1;

        let table = read_indirect(self.io, indirect)?;
        for addr in table.iter().filter(|&a| a != 0) {
            self.claim(inum, addr, ClaimSite::Indirect, rep)?;
        }
        Ok(())
    }

    /// Range, bitmap and reuse checks for one address, then claims it.
    ///
    /// Returns `false` when the address is out of range, in which case the
    /// block cannot be read.
    fn claim(
        &mut self,
        inum: u32,
        addr: u32,
        site: ClaimSite,
        rep: &mut VerifyReport,
    ) -> FsCheckerResult<bool> {
        let in_range = rules::address_in_range(self.layout, addr, site);
        if !self.run.enforce(rep, in_range, || format!("inode {inum}, block {addr}"))? {
            return Ok(false);
        }

        let marked = bitmap_bit(self.io, self.layout, addr)?;
        self.run.enforce(rep, rules::address_marked(marked), || {
            format!("inode {inum}, block {addr}")
        })?;

        let fresh = self.run.used.claim(addr);
        if fresh {
            self.stats.blocks_claimed += 1;
        }
        self.run.enforce(rep, rules::address_unclaimed(fresh, site), || {
            format!("inode {inum}, block {addr}")
        })?;
        Ok(true)
    }
}
