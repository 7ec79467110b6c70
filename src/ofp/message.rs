//! Control messages
//!
//! Flow rules, packet-outs and per-port counters as the controller sees them.

use super::frame::{Frame, MacAddr};
use super::id::PortNo;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// Match fields of a flow rule. `None` is a wildcard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowMatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_port: Option<PortNo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dl_src: Option<MacAddr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dl_dst: Option<MacAddr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dl_type: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nw_src: Option<Ipv4Addr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nw_dst: Option<Ipv4Addr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nw_proto: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nw_tos: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tp_src: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tp_dst: Option<u16>,
}

impl FlowMatch {
    /// Wildcard-everything match.
    pub fn any() -> Self {
        Self::default()
    }

    /// Exact match on every field the frame carries, plus the ingress port.
    pub fn from_frame(frame: &Frame, in_port: PortNo) -> Self {
        let mut m = FlowMatch {
            in_port: Some(in_port),
            dl_src: Some(frame.dl_src),
            dl_dst: Some(frame.dl_dst),
            dl_type: Some(frame.ethertype()),
            ..FlowMatch::default()
        };
        if let Some(ip) = frame.ipv4() {
            m.nw_src = Some(ip.src);
            m.nw_dst = Some(ip.dst);
            m.nw_proto = Some(ip.proto);
            m.nw_tos = Some(ip.tos);
            m.tp_src = ip.tp_src;
            m.tp_dst = ip.tp_dst;
        } else if let Some(arp) = frame.arp() {
            m.nw_src = Some(arp.sender_ip);
            m.nw_dst = Some(arp.target_ip);
            m.nw_proto = u8::try_from(arp.opcode).ok();
        }
        m
    }

    pub fn with_in_port(mut self, port: PortNo) -> Self {
        self.in_port = Some(port);
        self
    }

    pub fn with_dl_type(mut self, dl_type: u16) -> Self {
        self.dl_type = Some(dl_type);
        self
    }

    pub fn with_nw_dst(mut self, dst: Ipv4Addr) -> Self {
        self.nw_dst = Some(dst);
        self
    }
}

/// Forwarding action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "port", rename_all = "snake_case")]
pub enum Action {
    Output(PortNo),
}

/// Install-or-overwrite request for one flow rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowMod {
    #[serde(rename = "match")]
    pub matcher: FlowMatch,
    pub actions: Vec<Action>,
    pub priority: u16,
    /// Seconds without a hit before the rule expires; 0 = never.
    pub idle_timeout: u16,
    /// Seconds after install before the rule expires; 0 = never.
    pub hard_timeout: u16,
}

impl FlowMod {
    /// Never-expiring rule forwarding `matcher` out of `port`.
    pub fn permanent(matcher: FlowMatch, port: PortNo, priority: u16) -> Self {
        Self {
            matcher,
            actions: vec![Action::Output(port)],
            priority,
            idle_timeout: 0,
            hard_timeout: 0,
        }
    }

    /// First output port, if any.
    pub fn out_port(&self) -> Option<PortNo> {
        self.actions.iter().map(|Action::Output(p)| *p).next()
    }
}

/// Immediate single-packet forward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketOut {
    #[serde(default)]
    pub payload: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_port: Option<PortNo>,
    pub actions: Vec<Action>,
}

impl PacketOut {
    pub fn forward(payload: Vec<u8>, out_port: PortNo, in_port: Option<PortNo>) -> Self {
        Self {
            payload,
            in_port,
            actions: vec![Action::Output(out_port)],
        }
    }

    pub fn out_port(&self) -> Option<PortNo> {
        self.actions.iter().map(|Action::Output(p)| *p).next()
    }
}

/// Counters of one port from a counter reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortStats {
    pub port_no: PortNo,
    #[serde(default)]
    pub rx_packets: u64,
    #[serde(default)]
    pub tx_packets: u64,
    #[serde(default)]
    pub rx_bytes: u64,
    #[serde(default)]
    pub tx_bytes: u64,
}
