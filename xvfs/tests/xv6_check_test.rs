// SPDX-License-Identifier: MIT

mod common;

use common::Image;
use xvfs::xv6::*;

#[test]
fn test_well_formed_image_passes() {
    let (img, _) = Image::populated();
    let rep = img.check();

    assert!(rep.ok(), "unexpected findings:\n{rep}");
    assert_eq!(rep.count(Severity::Warn), 0);
    assert!(img.check_with(&Xv6CheckOptions::accumulate()).ok());
}

#[test]
fn test_check_is_idempotent() {
    let (mut img, tree) = Image::populated();
    let shared = img.inode(tree.note).direct(0);
    img.patch_inode(tree.big, |i| i.set_direct(0, shared));

    let first = img.check();
    let second = img.check();
    assert_eq!(first.to_string(), second.to_string());
    assert_eq!(first.first_violation(), second.first_violation());
}

#[test]
fn test_directory_spanning_blocks_passes() {
    let mut img = Image::new(1024, 64);
    let dir = img.mkdir(XV6_ROOT_INODE, "many");
    for i in 0..40 {
        img.file(dir, &format!("f{i:02}"), b"");
    }
    let inode = img.inode(dir);
    assert_ne!(inode.direct(1), 0);

    let rep = img.check();
    assert!(rep.ok(), "unexpected findings:\n{rep}");
}

#[test]
fn test_stats_and_phase_findings() {
    let (img, _) = Image::populated();
    let mut io = SliceXvIO::new(&img.buf);
    let meta = Xv6Meta::from_io(&mut io).expect("superblock failed");
    let mut checker = Xv6Checker::new(&mut io, &meta);
    let rep = checker.check_all().expect("check failed");

    let codes: Vec<_> = rep.findings.iter().map(|f| f.code).collect();
    assert_eq!(codes, vec!["GEO.OK", "ROOT.OK", "INO.SCAN"]);

    let stats = checker.stats();
    assert_eq!(stats.inodes_checked, 64);
    assert_eq!(stats.dirs_visited, 2);
    assert_eq!(stats.files_found, 2);
    assert_eq!(stats.indirect_blocks, 1);
    // root + docs + note + 20 data blocks of big + its indirect block
    assert_eq!(stats.blocks_claimed, 24);
}

#[test]
fn test_check_through_std_backend() {
    use std::io::Write;

    let (img, _) = Image::populated();
    let mut file = tempfile::tempfile().expect("tempfile failed");
    file.write_all(&img.buf).expect("write failed");

    let mut io = StdXvIO::new(&mut file).expect("open failed");
    let mut counted = IOCounter::with_align(&mut io, XV6_BLOCK_SIZE as u64);
    let meta = Xv6Meta::from_io(&mut counted).expect("superblock failed");
    let rep = Xv6Checker::new(&mut counted, &meta)
        .check_all()
        .expect("check failed");

    assert!(rep.ok());
    assert!(counted.snapshot().reads > 64);
}

// === root ===

#[test]
fn test_root_dot_pointing_elsewhere() {
    let (mut img, _) = Image::populated();
    let block = img.inode(XV6_ROOT_INODE).direct(0);
    img.set_dirent(block, 0, Xv6Dirent::new(2, b"."));

    assert_eq!(img.first_violation(), Some(Violation::RootMissing));
    assert_eq!(
        Violation::RootMissing.to_string(),
        "ERROR: root directory does not exist."
    );
}

#[test]
fn test_root_dotdot_pointing_elsewhere() {
    let (mut img, _) = Image::populated();
    let block = img.inode(XV6_ROOT_INODE).direct(0);
    img.set_dirent(block, 1, Xv6Dirent::new(3, b".."));

    assert_eq!(img.first_violation(), Some(Violation::RootMissing));
}

#[test]
fn test_root_without_data() {
    let (mut img, _) = Image::populated();
    img.patch_inode(XV6_ROOT_INODE, |i| i.set_size(0));

    assert_eq!(img.first_violation(), Some(Violation::RootMissing));
}

#[test]
fn test_root_checked_before_inodes() {
    let (mut img, tree) = Image::populated();
    img.patch_inode(tree.note, |i| i.set_kind(InodeKind::Unknown(7)));
    let block = img.inode(XV6_ROOT_INODE).direct(0);
    img.set_dirent(block, 0, Xv6Dirent::new(2, b"."));

    let rep = img.check();
    assert_eq!(rep.first_violation(), Some(Violation::RootMissing));
    assert_eq!(rep.count(Severity::Error), 1);
}

// === inode shape and addresses ===

#[test]
fn test_unknown_type_with_data() {
    let (mut img, tree) = Image::populated();
    img.patch_inode(tree.note, |i| i.set_kind(InodeKind::Unknown(7)));

    assert_eq!(img.first_violation(), Some(Violation::BadInode));
}

#[test]
fn test_negative_size() {
    let (mut img, tree) = Image::populated();
    img.patch_inode(tree.big, |i| i.set_size(0x8000_0000));

    assert_eq!(img.first_violation(), Some(Violation::BadInode));
}

#[test]
fn test_unknown_type_without_data_is_caught_by_references() {
    let (mut img, _) = Image::populated();
    img.patch_inode(20, |i| i.set_kind(InodeKind::Unknown(9)));

    assert_eq!(img.first_violation(), Some(Violation::InodeNotReferenced));
}

#[test]
fn test_direct_address_out_of_range() {
    let (mut img, tree) = Image::populated();
    let size = img.meta.size;
    img.patch_inode(tree.note, |i| i.set_direct(1, size));

    assert_eq!(img.first_violation(), Some(Violation::BadDirectAddress));
}

#[test]
fn test_indirect_slot_out_of_range() {
    let (mut img, tree) = Image::populated();
    img.patch_inode(tree.big, |i| i.set_indirect(5000));

    assert_eq!(img.first_violation(), Some(Violation::BadIndirectAddress));
}

#[test]
fn test_indirect_entry_out_of_range() {
    let (mut img, tree) = Image::populated();
    let indirect = img.inode(tree.big).indirect();
    img.set_indirect_entry(indirect, 3, 99_999);

    assert_eq!(img.first_violation(), Some(Violation::BadIndirectAddress));
}

#[test]
fn test_used_block_marked_free() {
    let (mut img, tree) = Image::populated();
    let block = img.inode(tree.note).direct(0);
    img.set_bitmap(block, false);

    assert_eq!(img.first_violation(), Some(Violation::MarkedFree));
}

#[test]
fn test_indirect_block_itself_marked_free() {
    let (mut img, tree) = Image::populated();
    let indirect = img.inode(tree.big).indirect();
    img.set_bitmap(indirect, false);

    assert_eq!(img.first_violation(), Some(Violation::MarkedFree));
}

// === directory formatting ===

#[test]
fn test_dot_naming_another_inode() {
    let (mut img, tree) = Image::populated();
    let block = img.inode(tree.docs).direct(0);
    img.set_dirent(block, 0, Xv6Dirent::new(tree.note as u16, b"."));

    assert_eq!(img.first_violation(), Some(Violation::DirNotFormatted));
}

#[test]
fn test_missing_dotdot() {
    let (mut img, tree) = Image::populated();
    let block = img.inode(tree.docs).direct(0);
    img.set_dirent(block, 1, Xv6Dirent::new(1, b"xx"));

    assert_eq!(img.first_violation(), Some(Violation::DirNotFormatted));
}

// === block reuse ===

#[test]
fn test_two_direct_slots_share_a_block() {
    let (mut img, tree) = Image::populated();
    let shared = img.inode(tree.note).direct(0);
    img.patch_inode(tree.big, |i| i.set_direct(0, shared));

    assert_eq!(img.first_violation(), Some(Violation::DirectReuse));
}

#[test]
fn test_two_indirect_entries_share_a_block() {
    let (mut img, tree) = Image::populated();
    let indirect = img.inode(tree.big).indirect();
    let first = img.indirect_entry(indirect, 0);
    img.set_indirect_entry(indirect, 1, first);

    assert_eq!(img.first_violation(), Some(Violation::IndirectReuse));
}

#[test]
fn test_indirect_entry_reuses_direct_block() {
    let (mut img, tree) = Image::populated();
    let shared = img.inode(tree.note).direct(0);
    let indirect = img.inode(tree.big).indirect();
    img.set_indirect_entry(indirect, 0, shared);

    assert_eq!(img.first_violation(), Some(Violation::IndirectReuse));
}

#[test]
fn test_direct_slot_reuses_indirect_entry() {
    let (mut img, tree) = Image::populated();
    let late = img.file(XV6_ROOT_INODE, "late", b"abc");
    let indirect = img.inode(tree.big).indirect();
    let shared = img.indirect_entry(indirect, 0);
    img.patch_inode(late, |i| i.set_direct(0, shared));

    assert_eq!(img.first_violation(), Some(Violation::DirectReuse));
}

#[test]
fn test_indirect_slot_reuses_direct_block() {
    let (mut img, tree) = Image::populated();
    let shared = img.inode(tree.note).direct(0);
    img.patch_inode(tree.big, |i| i.set_indirect(shared));

    assert_eq!(img.first_violation(), Some(Violation::IndirectReuse));
}

#[test]
fn test_direct_slot_into_inode_table() {
    let (mut img, tree) = Image::populated();
    let inode_block = img.meta.layout.inode_start;
    img.patch_inode(tree.note, |i| i.set_direct(1, inode_block));

    assert_eq!(img.first_violation(), Some(Violation::DirectReuse));
}

#[test]
fn test_indirect_entry_into_bitmap() {
    let (mut img, tree) = Image::populated();
    let bitmap_block = img.meta.layout.bitmap_start;
    let indirect = img.inode(tree.big).indirect();
    img.set_indirect_entry(indirect, 0, bitmap_block);

    assert_eq!(img.first_violation(), Some(Violation::IndirectReuse));
}

#[test]
fn test_superblock_as_indirect_block() {
    let (mut img, tree) = Image::populated();
    img.patch_inode(tree.big, |i| i.set_indirect(XV6_SUPERBLOCK_BLOCK));

    assert_eq!(img.first_violation(), Some(Violation::IndirectReuse));
}

// === bitmap sweep ===

#[test]
fn test_marked_block_nobody_owns() {
    let (mut img, _) = Image::populated();
    let stray = img.free_block();
    img.set_bitmap(stray, true);

    let rep = img.check();
    assert_eq!(rep.first_violation(), Some(Violation::UnclaimedBlock));
    let finding = rep.findings.iter().find(|f| f.rule.is_some()).expect("no violation");
    assert_eq!(finding.detail.as_deref(), Some(format!("block {stray}").as_str()));
}

#[test]
fn test_bitmap_sweep_needs_inode_scan() {
    let (mut img, _) = Image::populated();
    let stray = img.free_block();
    img.set_bitmap(stray, true);

    let only_bitmap = Xv6CheckOptions {
        phases: VerifyPhases::BITMAP,
        ..Default::default()
    };
    let rep = img.check_with(&only_bitmap);
    assert!(rep.ok());
    assert_eq!(rep.findings[0].code, "BMP.SKIP");

    let with_scan = Xv6CheckOptions {
        phases: VerifyPhases::INODES | VerifyPhases::BITMAP,
        ..Default::default()
    };
    assert_eq!(
        img.check_with(&with_scan).first_violation(),
        Some(Violation::UnclaimedBlock)
    );
}

// === reference counts ===

#[test]
fn test_free_inode_still_named() {
    let (mut img, tree) = Image::populated();
    img.set_inode(tree.empty, &Xv6Inode::default());

    assert_eq!(img.first_violation(), Some(Violation::FreeInodeReferenced));
}

#[test]
fn test_in_use_inode_without_name() {
    let (mut img, _) = Image::populated();
    let (block, slot) = img.find_entry(XV6_ROOT_INODE, "big");
    img.set_dirent(block, slot, Xv6Dirent::default());

    assert_eq!(img.first_violation(), Some(Violation::InodeNotReferenced));
}

#[test]
fn test_stale_entry_past_directory_size_still_counts() {
    let (mut img, tree) = Image::populated();
    // ".", ".." and "note" fit the size, "alias" sits past it in the same block
    img.patch_inode(tree.docs, |i| i.set_size(3 * XV6_DIRENT_SIZE as u32));

    let rep = img.check();
    assert!(rep.ok(), "unexpected findings:\n{rep}");
}

#[test]
fn test_file_link_count_must_match_names() {
    let mut img = Image::new(512, 32);
    let f = img.file(XV6_ROOT_INODE, "f", b"data");
    img.link(XV6_ROOT_INODE, "g", f);

    // two names, three links
    img.patch_inode(f, |i| i.set_nlink(3));
    assert_eq!(img.first_violation(), Some(Violation::BadFileRefCount));

    // three names, three links
    img.link(XV6_ROOT_INODE, "h", f);
    img.patch_inode(f, |i| i.set_nlink(3));
    assert!(img.check().ok());
}

#[test]
fn test_directory_under_two_parents() {
    let (mut img, tree) = Image::populated();
    let src = img.mkdir(XV6_ROOT_INODE, "src");
    img.file(src, "x", b"");
    let (block, slot) = img.find_entry(src, "x");
    img.set_dirent(block, slot, Xv6Dirent::new(tree.docs as u16, b"x"));

    assert_eq!(img.first_violation(), Some(Violation::DirMultiplyLinked));
}

#[test]
fn test_devices_may_have_many_names() {
    let (mut img, tree) = Image::populated();
    let other = img.mkdir(XV6_ROOT_INODE, "dev");
    img.file(other, "tty", b"");
    let (tty_block, tty_slot) = img.find_entry(other, "tty");
    let tty = img.dir_block(tty_block)[tty_slot].inum() as u32;
    img.set_dirent(tty_block, tty_slot, Xv6Dirent::new(tree.console as u16, b"tty"));
    img.set_inode(tty, &Xv6Inode::default());

    let rep = img.check();
    assert!(rep.ok(), "unexpected findings:\n{rep}");
}

// === modes and errors ===

#[test]
fn test_accumulating_mode_reports_everything() {
    let (mut img, tree) = Image::populated();
    img.patch_inode(tree.note, |i| i.set_kind(InodeKind::Unknown(7)));
    let stray = img.free_block();
    img.set_bitmap(stray, true);

    let fast = img.check();
    assert_eq!(fast.count(Severity::Error), 1);
    assert_eq!(fast.first_violation(), Some(Violation::BadInode));

    let all = img.check_with(&Xv6CheckOptions::accumulate());
    let rules: Vec<_> = all.violations().collect();
    // note's own block is no longer claimed either
    assert_eq!(
        rules,
        vec![
            Violation::BadInode,
            Violation::UnclaimedBlock,
            Violation::UnclaimedBlock
        ]
    );
}

#[test]
fn test_unreadable_indirect_block_is_an_io_error() {
    let (mut img, tree) = Image::populated();
    img.buf.truncate(700 * XV6_BLOCK_SIZE);
    img.patch_inode(tree.big, |i| i.set_indirect(900));
    img.set_bitmap(900, true);

    let mut io = SliceXvIO::new(&img.buf);
    let meta = Xv6Meta::from_io(&mut io).expect("superblock failed");
    let res = Xv6Checker::new(&mut io, &meta).check_all();

    assert_eq!(res.err(), Some(FsCheckerError::IO(XvIOError::OutOfBounds)));
}
