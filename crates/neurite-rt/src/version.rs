//! Runtime and solution versioning.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic version of a runtime or a compiled solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RtVersion {
    /// Breaking-change counter; must match between runtime and solution.
    pub major: u8,
    /// Feature counter.
    pub minor: u8,
    /// Fix counter.
    pub patch: u16,
}

impl RtVersion {
    /// Build a version triple.
    pub const fn new(major: u8, minor: u8, patch: u16) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Pack into a single 32-bit value (`major << 24 | minor << 16 | patch`).
    pub const fn combined(self) -> u32 {
        (self.major as u32) << 24 | (self.minor as u32) << 16 | self.patch as u32
    }

    /// Unpack from the combined 32-bit form.
    pub const fn from_combined(v: u32) -> Self {
        Self {
            major: (v >> 24) as u8,
            minor: (v >> 16) as u8,
            patch: v as u16,
        }
    }

    /// Whether a solution carrying this version can run on `runtime`.
    pub fn is_compatible_with(self, runtime: RtVersion) -> bool {
        self.major == runtime.major
    }
}

impl fmt::Display for RtVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Version of this runtime library.
pub const fn runtime_version() -> RtVersion {
    RtVersion::new(1, 0, 0)
}
