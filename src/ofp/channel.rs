//! Command channel
//!
//! Fire-and-forget commands toward switches. Implementations own the wire
//! encoding and the per-switch connections.

use super::id::DatapathId;
use super::message::{FlowMod, PacketOut};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChannelError {
    #[error("no connection to switch {0}")]
    Disconnected(DatapathId),
}

/// Commands the controller issues to switches.
///
/// A returned error means the command was not sent. Callers log and drop it;
/// nothing is retried.
pub trait DeviceChannel {
    /// Whether a connection handle for `dpid` currently exists.
    fn is_connected(&self, dpid: DatapathId) -> bool;

    fn send_counter_request(&mut self, dpid: DatapathId) -> Result<(), ChannelError>;

    fn send_flow_rule(&mut self, dpid: DatapathId, rule: FlowMod) -> Result<(), ChannelError>;

    fn send_packet_out(&mut self, dpid: DatapathId, out: PacketOut) -> Result<(), ChannelError>;

    /// A switch's connection came up.
    fn on_connected(&mut self, _dpid: DatapathId) {}

    /// A switch's connection went away.
    fn on_disconnected(&mut self, _dpid: DatapathId) {}
}
