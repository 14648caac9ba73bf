// SPDX-License-Identifier: MIT

pub use crate::core::errors::{FsInjectorError, FsInjectorResult};

/// Populates a formatted file system with nodes.
///
/// Nodes are addressed by their inode number; every call returns the number
/// of the node it created so callers can nest further nodes below it.
pub trait FsNodeInjector {
    /// Creates a directory named `name` inside `parent`.
    fn write_dir(&mut self, parent: u32, name: &str) -> FsInjectorResult<u32>;

    /// Creates a regular file named `name` inside `parent` holding `content`.
    fn write_file(&mut self, parent: u32, name: &str, content: &[u8]) -> FsInjectorResult<u32>;

    /// Adds another name for `target` inside `parent`.
    fn write_link(&mut self, parent: u32, name: &str, target: u32) -> FsInjectorResult<()>;

    /// Flushes pending writes.
    fn flush(&mut self) -> FsInjectorResult<()> {
        Ok(())
    }
}
