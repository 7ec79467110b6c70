//! Parsed frames
//!
//! A typed view of the headers carried by an unmatched packet. Only the
//! frame kinds the controller acts on are decoded; everything else is kept
//! as its ethertype.

use super::{ETH_TYPE_ARP, ETH_TYPE_IPV4};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use thiserror::Error;

/// Ethernet hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddr(pub [u8; 6]);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid MAC address `{0}`")]
pub struct MacAddrParseError(String);

impl FromStr for MacAddr {
    type Err = MacAddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut out = [0u8; 6];
        let mut parts = s.split(':');
        for byte in out.iter_mut() {
            let part = parts.next().ok_or_else(|| MacAddrParseError(s.to_string()))?;
            if part.len() != 2 {
                return Err(MacAddrParseError(s.to_string()));
            }
            *byte = u8::from_str_radix(part, 16).map_err(|_| MacAddrParseError(s.to_string()))?;
        }
        if parts.next().is_some() {
            return Err(MacAddrParseError(s.to_string()));
        }
        Ok(MacAddr(out))
    }
}

impl TryFrom<String> for MacAddr {
    type Error = MacAddrParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<MacAddr> for String {
    fn from(m: MacAddr) -> String {
        m.to_string()
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

/// Address-resolution header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArpHeader {
    /// 1 = request, 2 = reply
    #[serde(default = "default_arp_opcode")]
    pub opcode: u16,
    pub sender_ip: Ipv4Addr,
    pub target_ip: Ipv4Addr,
}

fn default_arp_opcode() -> u16 {
    1
}

/// IPv4 header plus the transport ports, when the payload carries them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ipv4Header {
    pub src: Ipv4Addr,
    pub dst: Ipv4Addr,
    #[serde(default)]
    pub proto: u8,
    #[serde(default)]
    pub tos: u8,
    #[serde(default)]
    pub tp_src: Option<u16>,
    #[serde(default)]
    pub tp_dst: Option<u16>,
}

/// Decoded network-layer content of a frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrameBody {
    Arp(ArpHeader),
    Ipv4(Ipv4Header),
    Other { ethertype: u16 },
}

/// A parsed Ethernet frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(default)]
    pub dl_src: MacAddr,
    #[serde(default)]
    pub dl_dst: MacAddr,
    #[serde(flatten)]
    pub body: FrameBody,
}

impl Frame {
    pub fn arp(&self) -> Option<&ArpHeader> {
        match &self.body {
            FrameBody::Arp(a) => Some(a),
            _ => None,
        }
    }

    pub fn ipv4(&self) -> Option<&Ipv4Header> {
        match &self.body {
            FrameBody::Ipv4(ip) => Some(ip),
            _ => None,
        }
    }

    pub fn ethertype(&self) -> u16 {
        match &self.body {
            FrameBody::Arp(_) => ETH_TYPE_ARP,
            FrameBody::Ipv4(_) => ETH_TYPE_IPV4,
            FrameBody::Other { ethertype } => *ethertype,
        }
    }
}
