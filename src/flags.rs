use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The `flags` header field. Only the high bit is assigned; RFC 2131
/// requires the rest remain as the client sent them.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Default, Clone, PartialEq, Eq)]
pub struct Flags(u16);

/// broadcast bit of the `flags` field
pub const BROADCAST: u16 = 0x8000;

impl Flags {
    /// Create new Flags from u16
    pub fn new(n: u16) -> Self {
        Self(n)
    }
    /// get the status of the broadcast flag
    pub fn broadcast(&self) -> bool {
        (self.0 & BROADCAST) != 0
    }
    /// set the broadcast bit, returns a new Flags
    pub fn set_broadcast(mut self) -> Self {
        self.0 |= BROADCAST;
        self
    }
}

impl fmt::Debug for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flags")
            .field("broadcast", &self.broadcast())
            .finish()
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl From<u16> for Flags {
    fn from(n: u16) -> Self {
        Self(n)
    }
}
impl From<Flags> for u16 {
    fn from(f: Flags) -> Self {
        f.0
    }
}
