// SPDX-License-Identifier: MIT

//! Directory graph checks: root identity, "." / ".." formatting and the
//! global reference count table.

#[cfg(not(feature = "std"))]
use alloc::{format, vec::Vec};

use xvio::XvIO;

use super::{context::CheckRun, rules};
use crate::{
    core::checker::{FsCheckerResult, Violation, VerifyReport, WalkerStats},
    fs::xv6::{constant::*, layout::Xv6Layout, types::*, utils::*},
};

/// Counts "." / ".." entries of one directory while its direct blocks are
/// walked.
///
/// Only the first two self/parent entries are tallied; "." must name the
/// directory itself, ".." may name anything.
#[derive(Debug)]
pub(crate) struct SelfParentTally {
    dir_inum: u32,
    remaining: usize,
    tally: u8,
    examined: usize,
}

impl SelfParentTally {
    pub fn new(dir_inum: u32, inode: &Xv6Inode) -> Self {
        Self {
            dir_inum,
            remaining: inode.dirent_count(),
            tally: 0,
            examined: 0,
        }
    }

    /// Examines the entries of one direct block.
    pub fn observe(&mut self, block: &Xv6DirBlock) -> Result<(), Violation> {
        let n = self.remaining.min(XV6_DIRENTS_PER_BLOCK);
        self.remaining -= n;
        self.examined += n;

        // a bad "." still counts towards the tally
        let mut outcome = Ok(());
        for entry in &block[..n] {
            if self.tally >= 2 {
                break;
            }
            if entry.is_dot() {
                if outcome.is_ok() {
                    outcome = rules::self_entry(entry, self.dir_inum);
                }
                self.tally += 1;
            } else if entry.is_dotdot() {
                self.tally += 1;
            }
        }
        outcome
    }

    pub fn examined(&self) -> usize {
        self.examined
    }

    pub fn finish(&self) -> Result<(), Violation> {
        rules::dir_tally(self.tally)
    }
}

/// Root inode must hold data whose first block carries "." and ".." naming
/// the root.
pub(crate) fn check_root_identity<IO: XvIO + ?Sized>(
    io: &mut IO,
    layout: &Xv6Layout,
    run: &CheckRun,
    rep: &mut VerifyReport,
) -> FsCheckerResult<()> {
    if layout.ninodes <= XV6_ROOT_INODE {
        run.enforce(rep, Err(Violation::RootMissing), || {
            format!("inode table holds {} inodes", layout.ninodes)
        })?;
        return Ok(());
    }

    let root = read_inode(io, layout, XV6_ROOT_INODE)?;
    if !run.enforce(rep, rules::root_has_data(&root), || {
        format!("root inode size {}", root.signed_size())
    })? {
        return Ok(());
    }

    let block = root.direct(0);
    if block == 0 || !layout.in_range(block) {
        run.enforce(rep, Err(Violation::RootMissing), || {
            format!("root first block {block}")
        })?;
        return Ok(());
    }

    let entries = read_dir_block(io, block)?;
    let visible = root.dirent_count().min(XV6_DIRENTS_PER_BLOCK);
    let self_parent = entries[..visible]
        .iter()
        .filter(|e| e.is_dot_or_dotdot())
        .take(2);
    for entry in self_parent {
        if !run.enforce(rep, rules::root_entry(entry), || {
            format!("root entry {:?} names inode {}", name_str(entry), entry.inum())
        })? {
            break;
        }
    }
    Ok(())
}

/// Data blocks of a directory in file order, skipping holes and addresses
/// outside the file system.
fn dir_blocks<IO: XvIO + ?Sized>(
    io: &mut IO,
    layout: &Xv6Layout,
    inode: &Xv6Inode,
) -> FsCheckerResult<Vec<u32>> {
    let mut blocks: Vec<u32> = inode
        .direct_addrs()
        .filter(|&b| b != 0 && layout.in_range(b))
        .collect();

    let indirect = inode.indirect();
    if indirect != 0 && layout.in_range(indirect) {
        let table = read_indirect(io, indirect)?;
        blocks.extend(table.iter().filter(|&b| b != 0 && layout.in_range(b)));
    }
    Ok(blocks)
}

/// Fills `run.refs` from every allocated directory.
///
/// "." and ".." do not count. Each counted entry uses one unit of the
/// directory's `size / 16` budget; the budget is only consulted before a
/// block, so a started block is counted to its end.
pub(crate) fn count_references<IO: XvIO + ?Sized>(
    io: &mut IO,
    layout: &Xv6Layout,
    run: &mut CheckRun,
    stats: &mut WalkerStats,
) -> FsCheckerResult<()> {
    for inum in 0..layout.ninodes {
        let inode = read_inode(io, layout, inum)?;
        if inode.kind() != InodeKind::Dir || inode.signed_size() <= 0 {
            continue;
        }

        let mut budget = inode.dirent_count();
        for block in dir_blocks(io, layout, &inode)? {
            if budget == 0 {
                break;
            }
            let entries = read_dir_block(io, block)?;
            stats.entries_scanned += entries.len();
            for entry in entries
                .iter()
                .filter(|e| !e.is_dot_or_dotdot() && !e.is_empty())
            {
                run.add_ref(entry.inum() as u32);
                budget = budget.saturating_sub(1);
            }
        }
    }
    Ok(())
}

/// Applies the reference count rules to inode numbers 2 and up.
pub(crate) fn check_reference_counts<IO: XvIO + ?Sized>(
    io: &mut IO,
    layout: &Xv6Layout,
    run: &CheckRun,
    rep: &mut VerifyReport,
) -> FsCheckerResult<()> {
    for inum in (XV6_ROOT_INODE + 1)..layout.ninodes {
        let inode = read_inode(io, layout, inum)?;
        let refs = run.refs_of(inum);
        run.enforce(rep, rules::reference_count(&inode, refs), || {
            format!(
                "inode {inum}, type {}, nlink {}, {refs} references",
                inode.raw_kind(),
                inode.nlink()
            )
        })?;
    }
    Ok(())
}

fn name_str(entry: &Xv6Dirent) -> &str {
    core::str::from_utf8(entry.name()).unwrap_or("?")
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    fn dir_block(entries: &[(u16, &[u8])]) -> Xv6DirBlock {
        let mut block = [Xv6Dirent::default(); XV6_DIRENTS_PER_BLOCK];
        for (slot, (inum, name)) in entries.iter().enumerate() {
            block[slot] = Xv6Dirent::new(*inum, name);
        }
        block
    }

    fn dir_inode(entries: u32) -> Xv6Inode {
        let mut inode = Xv6Inode::new(InodeKind::Dir);
        inode.set_size(entries * XV6_DIRENT_SIZE as u32);
        inode
    }

    #[test]
    fn test_tally_accepts_formatted_dir() {
        let mut tally = SelfParentTally::new(4, &dir_inode(3));
        tally
            .observe(&dir_block(&[(4, b"."), (1, b".."), (9, b"f")]))
            .unwrap();
        assert_eq!(tally.finish(), Ok(()));
        assert_eq!(tally.examined(), 3);
    }

    #[test]
    fn test_tally_rejects_wrong_self() {
        let mut tally = SelfParentTally::new(4, &dir_inode(2));
        assert_eq!(
            tally.observe(&dir_block(&[(5, b"."), (1, b"..")])),
            Err(Violation::DirNotFormatted)
        );
        // already reported, the tally itself is complete
        assert_eq!(tally.finish(), Ok(()));
    }

    #[test]
    fn test_tally_respects_size_budget() {
        // ".." sits past the directory size and must not be seen
        let mut tally = SelfParentTally::new(4, &dir_inode(1));
        tally.observe(&dir_block(&[(4, b"."), (1, b"..")])).unwrap();
        assert_eq!(tally.finish(), Err(Violation::DirNotFormatted));
    }

    #[test]
    fn test_tally_stops_after_two() {
        let mut tally = SelfParentTally::new(4, &dir_inode(3));
        tally
            .observe(&dir_block(&[(4, b"."), (1, b".."), (7, b".")]))
            .unwrap();
        assert_eq!(tally.finish(), Ok(()));
    }
}
