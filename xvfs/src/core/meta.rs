// SPDX-License-Identifier: MIT

/// Trait implemented by each FS-specific Meta structure.
///
/// Exposes the static geometry needed while formatting, injecting or checking.
pub trait FsMeta<Unit: Ord + Copy> {
    /// Size of one block in bytes.
    fn unit_size(&self) -> usize;

    /// Byte offset inside the image of a given block.
    fn unit_offset(&self, unit: Unit) -> u64;

    /// Root unit (root inode number).
    fn root_unit(&self) -> Unit;

    /// First block of the data region.
    fn first_data_unit(&self) -> Unit;

    /// Last block of the data region.
    fn last_data_unit(&self) -> Unit;

    /// Total number of blocks covered by the file system.
    fn total_units(&self) -> usize;

    /// Total size in bytes of the FS.
    fn size_bytes(&self) -> u64;

    /// Check if a given block lies in the data region.
    fn is_valid_unit(&self, unit: Unit) -> bool {
        unit >= self.first_data_unit() && unit <= self.last_data_unit()
    }
}
