//! Device-control boundary
//!
//! Identifiers, parsed frames, control messages and the command channel the
//! controller talks to. Wire encoding lives behind `DeviceChannel`.

mod channel;
mod events;
mod frame;
mod id;
mod message;
mod recorder;

pub use channel::{ChannelError, DeviceChannel};
pub use events::{ConnectionDown, ConnectionUp, PacketIn, PortStatsReply};
pub use frame::{ArpHeader, Frame, FrameBody, Ipv4Header, MacAddr, MacAddrParseError};
pub use id::{DatapathId, PortNo};
pub use message::{Action, FlowMatch, FlowMod, PacketOut, PortStats};
pub use recorder::{Command, RecordingChannel};

/// Ethertype of IPv4 frames.
pub const ETH_TYPE_IPV4: u16 = 0x0800;
/// Ethertype of ARP frames.
pub const ETH_TYPE_ARP: u16 = 0x0806;
