// SPDX-License-Identifier: MIT

// === Sub-modules ===
pub mod checker;
pub mod errors;
pub mod formatter;
pub mod injector;
#[macro_use]
pub mod macros;
pub mod meta;
pub mod utils;

// === Core Traits ===
pub mod traits {
    pub use super::checker::FsChecker;
    pub use super::formatter::FsFormatter;
    pub use super::injector::FsNodeInjector;
    pub use super::meta::FsMeta;
}

// === Error types ===
pub use errors::*;
