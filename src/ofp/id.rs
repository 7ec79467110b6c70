//! Identifier types
//!
//! Datapath (switch) and port identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Datapath identifier of a connected switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatapathId(pub u64);

impl fmt::Display for DatapathId {
    // Low six bytes, dash-separated: 00-00-00-00-00-01.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.0.to_be_bytes();
        write!(
            f,
            "{:02x}-{:02x}-{:02x}-{:02x}-{:02x}-{:02x}",
            b[2], b[3], b[4], b[5], b[6], b[7]
        )
    }
}

/// Physical or reserved switch port number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortNo(pub u16);

impl PortNo {
    /// The switch-local port.
    pub const LOCAL: PortNo = PortNo(0xFFFE);

    /// True for ports counter replies should be read for.
    pub fn is_physical(self) -> bool {
        self.0 < Self::LOCAL.0
    }
}

impl fmt::Display for PortNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
