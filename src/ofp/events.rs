//! Switch notifications
//!
//! Each notification from a switch is posted onto the control loop as one of
//! these events and handed to the controller when it comes up.

use super::channel::DeviceChannel;
use super::frame::Frame;
use super::id::{DatapathId, PortNo};
use super::message::PortStats;
use crate::controller::Controller;
use crate::sched::{ControlLoop, Event};
use tracing::debug;

/// Connection established; carries the port names from the features reply.
#[derive(Debug, Clone)]
pub struct ConnectionUp {
    pub dpid: DatapathId,
    pub ports: Vec<String>,
}

impl<C: DeviceChannel + 'static> Event<Controller<C>> for ConnectionUp {
    fn execute(self: Box<Self>, lp: &mut ControlLoop<Controller<C>>, ctl: &mut Controller<C>) {
        let ConnectionUp { dpid, ports } = *self;
        debug!(%dpid, now = ?lp.now(), "ConnectionUp");
        ctl.on_connection_up(lp, dpid, ports.as_slice());
    }
}

/// Connection lost.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionDown {
    pub dpid: DatapathId,
}

impl<C: DeviceChannel + 'static> Event<Controller<C>> for ConnectionDown {
    fn execute(self: Box<Self>, _lp: &mut ControlLoop<Controller<C>>, ctl: &mut Controller<C>) {
        ctl.on_connection_down(self.dpid);
    }
}

/// Unmatched packet.
#[derive(Debug, Clone)]
pub struct PacketIn {
    pub dpid: DatapathId,
    pub in_port: PortNo,
    pub frame: Frame,
    /// Raw packet bytes, echoed back in packet-outs.
    pub payload: Vec<u8>,
}

impl<C: DeviceChannel + 'static> Event<Controller<C>> for PacketIn {
    fn execute(self: Box<Self>, _lp: &mut ControlLoop<Controller<C>>, ctl: &mut Controller<C>) {
        let PacketIn {
            dpid,
            in_port,
            frame,
            payload,
        } = *self;
        ctl.on_packet_in(dpid, in_port, &frame, payload);
    }
}

/// Per-port counter reply.
#[derive(Debug, Clone)]
pub struct PortStatsReply {
    pub dpid: DatapathId,
    pub stats: Vec<PortStats>,
}

impl<C: DeviceChannel + 'static> Event<Controller<C>> for PortStatsReply {
    fn execute(self: Box<Self>, _lp: &mut ControlLoop<Controller<C>>, ctl: &mut Controller<C>) {
        ctl.on_port_stats(self.dpid, &self.stats);
    }
}
