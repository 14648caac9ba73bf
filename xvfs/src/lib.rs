// SPDX-License-Identifier: MIT
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

// Core Modules
pub mod core;
pub mod fs;

// Reusable types and traits
pub use crate::core::traits::*;

/// xv6 file system implementation.
///
/// See [`xv6::Xv6Checker`], [`xv6::Xv6Formatter`] and [`xv6::Xv6Injector`].
pub mod xv6 {
    pub use super::fs::xv6::prelude::*;
}
