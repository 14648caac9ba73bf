// SPDX-License-Identifier: MIT

use core::fmt;

/// Result type for XvIO operations.
pub type XvIOResult<T = ()> = core::result::Result<T, XvIOError>;

/// Error type for XvIO operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XvIOError {
    /// Access outside `[0, len)` of the image.
    OutOfBounds,
    /// Operation not supported by this backend (e.g. writes on a read-only view).
    Unsupported,
    Invalid(&'static str),
    Other(&'static str),
}

impl XvIOError {
    pub fn msg(&self) -> &'static str {
        match self {
            XvIOError::OutOfBounds => "Out of bounds",
            XvIOError::Unsupported => "Unsupported operation",
            XvIOError::Invalid(msg) => msg,
            XvIOError::Other(msg) => msg,
        }
    }
}

impl From<&'static str> for XvIOError {
    #[inline]
    fn from(msg: &'static str) -> Self {
        XvIOError::Other(msg)
    }
}

impl fmt::Display for XvIOError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.msg())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for XvIOError {}
