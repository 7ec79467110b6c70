//! Topology descriptors

pub mod diamond;

pub use diamond::{CoreLink, CorePorts, DiamondTopology, HostAttachment, SwitchRole};
