//! Document identity.

use std::fmt;

/// Handle of one document in a workspace.
///
/// The semantic layer never carries URIs or paths around; documents are
/// identified by this `u32` wrapper everywhere, and the workspace keeps the
/// handle-to-URI mapping. Handles are assigned in load order and stay valid
/// for the lifetime of the workspace (removed documents leave a hole, the
/// handle is not reissued).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct DocumentId(pub u32);

impl DocumentId {
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// The raw slot index behind the handle.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentId({})", self.0)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc#{}", self.0)
    }
}

impl From<u32> for DocumentId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}
