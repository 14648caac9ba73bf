// SPDX-License-Identifier: MIT
pub mod xv6;
