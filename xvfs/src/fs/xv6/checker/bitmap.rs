// SPDX-License-Identifier: MIT

#[cfg(not(feature = "std"))]
use alloc::{format, vec};

use xvio::XvIO;

use super::{context::CheckRun, rules};
use crate::{
    core::checker::{Finding, FsCheckerResult, VerifyReport},
    fs::xv6::layout::Xv6Layout,
};

/// Every block marked in use must have been claimed by the metadata region or
/// the inode scan.
///
/// The other direction, claimed but marked free, is checked when blocks are
/// claimed.
pub(crate) fn sweep_unclaimed<IO: XvIO + ?Sized>(
    io: &mut IO,
    layout: &Xv6Layout,
    run: &CheckRun,
    rep: &mut VerifyReport,
) -> FsCheckerResult<()> {
    if !run.inodes_scanned {
        rep.push(Finding::warn(
            "BMP.SKIP",
            "bitmap sweep skipped: inode scan did not run",
        ));
        return Ok(());
    }

    let (offset, len) = layout.bitmap_bytes();
    let mut on_disk = vec![0u8; len];
    io.read_at(offset, &mut on_disk)?;

    run.used.try_for_each_orphan(&on_disk, |block| {
        run.enforce(rep, rules::bitmap_claimed(false), || format!("block {block}"))
            .map(|_| ())
    })
}
