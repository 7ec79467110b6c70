//! In-memory command channel
//!
//! Tracks which switches are connected and records every command sent to
//! them, in order. Used by the replay driver and the tests.

use super::channel::{ChannelError, DeviceChannel};
use super::id::DatapathId;
use super::message::{FlowMod, PacketOut};
use serde::Serialize;
use std::collections::HashSet;
use tracing::trace;

/// One command accepted by the channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    CounterRequest { dpid: DatapathId },
    FlowRule { dpid: DatapathId, rule: FlowMod },
    PacketOut { dpid: DatapathId, out: PacketOut },
}

impl Command {
    pub fn dpid(&self) -> DatapathId {
        match self {
            Command::CounterRequest { dpid }
            | Command::FlowRule { dpid, .. }
            | Command::PacketOut { dpid, .. } => *dpid,
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingChannel {
    connected: HashSet<DatapathId>,
    pub sent: Vec<Command>,
    pub dropped: u64,
}

impl RecordingChannel {
    pub fn connect(&mut self, dpid: DatapathId) {
        self.connected.insert(dpid);
    }

    pub fn disconnect(&mut self, dpid: DatapathId) {
        self.connected.remove(&dpid);
    }

    pub fn flow_rules(&self, dpid: DatapathId) -> impl Iterator<Item = &FlowMod> + '_ {
        self.sent.iter().filter_map(move |c| match c {
            Command::FlowRule { dpid: d, rule } if *d == dpid => Some(rule),
            _ => None,
        })
    }

    pub fn packet_outs(&self, dpid: DatapathId) -> impl Iterator<Item = &PacketOut> + '_ {
        self.sent.iter().filter_map(move |c| match c {
            Command::PacketOut { dpid: d, out } if *d == dpid => Some(out),
            _ => None,
        })
    }

    pub fn counter_requests(&self) -> impl Iterator<Item = DatapathId> + '_ {
        self.sent.iter().filter_map(|c| match c {
            Command::CounterRequest { dpid } => Some(*dpid),
            _ => None,
        })
    }

    fn accept(&mut self, cmd: Command) -> Result<(), ChannelError> {
        let dpid = cmd.dpid();
        if !self.connected.contains(&dpid) {
            self.dropped += 1;
            return Err(ChannelError::Disconnected(dpid));
        }
        trace!(%dpid, ?cmd, "command recorded");
        self.sent.push(cmd);
        Ok(())
    }
}

impl DeviceChannel for RecordingChannel {
    fn is_connected(&self, dpid: DatapathId) -> bool {
        self.connected.contains(&dpid)
    }

    fn send_counter_request(&mut self, dpid: DatapathId) -> Result<(), ChannelError> {
        self.accept(Command::CounterRequest { dpid })
    }

    fn send_flow_rule(&mut self, dpid: DatapathId, rule: FlowMod) -> Result<(), ChannelError> {
        self.accept(Command::FlowRule { dpid, rule })
    }

    fn send_packet_out(&mut self, dpid: DatapathId, out: PacketOut) -> Result<(), ChannelError> {
        self.accept(Command::PacketOut { dpid, out })
    }

    fn on_connected(&mut self, dpid: DatapathId) {
        self.connect(dpid);
    }

    fn on_disconnected(&mut self, dpid: DatapathId) {
        self.disconnect(dpid);
    }
}
