//! Diamond topology
//!
//! Five switches: an ingress edge, three parallel relays, an egress edge.
//!
//! ```text
//!            +-- relay_a --+
//!  h1..h3 -- ingress -- relay_b -- egress -- h4..h6
//!            +-- relay_c --+
//! ```
//!
//! The descriptor names which declared port identifies each role and which
//! port numbers the core links and hosts use. Nothing here is learned at
//! runtime.

use crate::ofp::PortNo;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::net::Ipv4Addr;

/// Topological role of a switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchRole {
    Ingress,
    RelayA,
    RelayB,
    RelayC,
    Egress,
}

impl SwitchRole {
    pub const ALL: [SwitchRole; 5] = [
        SwitchRole::Ingress,
        SwitchRole::RelayA,
        SwitchRole::RelayB,
        SwitchRole::RelayC,
        SwitchRole::Egress,
    ];

    pub fn is_edge(self) -> bool {
        matches!(self, SwitchRole::Ingress | SwitchRole::Egress)
    }

    /// The core link a relay sits on.
    pub fn core_link(self) -> Option<CoreLink> {
        match self {
            SwitchRole::RelayA => Some(CoreLink::RelayA),
            SwitchRole::RelayB => Some(CoreLink::RelayB),
            SwitchRole::RelayC => Some(CoreLink::RelayC),
            SwitchRole::Ingress | SwitchRole::Egress => None,
        }
    }
}

impl fmt::Display for SwitchRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SwitchRole::Ingress => "ingress",
            SwitchRole::RelayA => "relay_a",
            SwitchRole::RelayB => "relay_b",
            SwitchRole::RelayC => "relay_c",
            SwitchRole::Egress => "egress",
        };
        f.write_str(s)
    }
}

/// One of the three monitored ingress-to-relay links, named by its relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoreLink {
    RelayA,
    RelayB,
    RelayC,
}

impl CoreLink {
    pub const ALL: [CoreLink; 3] = [CoreLink::RelayA, CoreLink::RelayB, CoreLink::RelayC];

    pub fn relay(self) -> SwitchRole {
        match self {
            CoreLink::RelayA => SwitchRole::RelayA,
            CoreLink::RelayB => SwitchRole::RelayB,
            CoreLink::RelayC => SwitchRole::RelayC,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for CoreLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ingress->{}", self.relay())
    }
}

/// Port numbers at both ends of one core path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorePorts {
    pub link: CoreLink,
    /// Ingress port leading to the relay.
    pub ingress_port: PortNo,
    /// Egress port leading to the relay.
    pub egress_port: PortNo,
}

/// A host and where it plugs in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostAttachment {
    pub name: String,
    pub ip: Ipv4Addr,
    /// `ingress` or `egress`
    pub edge: SwitchRole,
    pub port: PortNo,
    /// Core path that reaches this host from the opposite edge.
    pub via: CoreLink,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiamondTopology {
    /// Port names whose presence identifies each role.
    pub port_names: BTreeMap<SwitchRole, Vec<String>>,
    pub core: Vec<CorePorts>,
    /// Relay port facing the ingress switch.
    pub relay_uplink: PortNo,
    /// Relay port facing the egress switch.
    pub relay_downlink: PortNo,
    pub hosts: Vec<HostAttachment>,
}

impl Default for DiamondTopology {
    fn default() -> Self {
        Self::reference()
    }
}

impl DiamondTopology {
    /// s1 (ingress) .. s5 (egress), hosts h1..h6 on 10.0.0.1..6.
    pub fn reference() -> Self {
        let port_names = [
            (SwitchRole::Ingress, "s1-eth1"),
            (SwitchRole::RelayA, "s2-eth1"),
            (SwitchRole::RelayB, "s3-eth1"),
            (SwitchRole::RelayC, "s4-eth1"),
            (SwitchRole::Egress, "s5-eth1"),
        ]
        .into_iter()
        .map(|(role, name)| (role, vec![name.to_string()]))
        .collect();

        let core = CoreLink::ALL
            .iter()
            .enumerate()
            .map(|(i, &link)| CorePorts {
                link,
                ingress_port: PortNo(4 + i as u16),
                egress_port: PortNo(1 + i as u16),
            })
            .collect();

        let mut hosts = Vec::with_capacity(6);
        for (i, &via) in CoreLink::ALL.iter().enumerate() {
            let n = i as u8;
            hosts.push(HostAttachment {
                name: format!("h{}", n + 1),
                ip: Ipv4Addr::new(10, 0, 0, n + 1),
                edge: SwitchRole::Ingress,
                port: PortNo(1 + n as u16),
                via,
            });
            hosts.push(HostAttachment {
                name: format!("h{}", n + 4),
                ip: Ipv4Addr::new(10, 0, 0, n + 4),
                edge: SwitchRole::Egress,
                port: PortNo(4 + n as u16),
                via,
            });
        }
        hosts.sort_by_key(|h| h.ip);

        Self {
            port_names,
            core,
            relay_uplink: PortNo(1),
            relay_downlink: PortNo(2),
            hosts,
        }
    }

    /// Role whose expected port names intersect `declared`, if exactly one does.
    pub fn role_for_ports<S: AsRef<str>>(&self, declared: &[S]) -> Option<SwitchRole> {
        let mut found = None;
        for (role, names) in &self.port_names {
            let hit = declared
                .iter()
                .any(|d| names.iter().any(|n| n == d.as_ref()));
            if hit {
                if found.is_some() {
                    return None;
                }
                found = Some(*role);
            }
        }
        found
    }

    pub fn core_ports(&self, link: CoreLink) -> Option<&CorePorts> {
        self.core.iter().find(|c| c.link == link)
    }

    /// Core link leaving the ingress switch through `port`.
    pub fn link_at_ingress_port(&self, port: PortNo) -> Option<CoreLink> {
        self.core
            .iter()
            .find(|c| c.ingress_port == port)
            .map(|c| c.link)
    }

    pub fn ingress_port(&self, link: CoreLink) -> Option<PortNo> {
        self.core_ports(link).map(|c| c.ingress_port)
    }

    pub fn host(&self, ip: Ipv4Addr) -> Option<&HostAttachment> {
        self.hosts.iter().find(|h| h.ip == ip)
    }

    pub fn hosts_at(&self, edge: SwitchRole) -> impl Iterator<Item = &HostAttachment> + '_ {
        self.hosts.iter().filter(move |h| h.edge == edge)
    }

    /// Port an edge switch uses to reach `ip`: the host port when it is
    /// attached locally, else the core port of the host's via link.
    pub fn edge_port_toward(&self, edge: SwitchRole, ip: Ipv4Addr) -> Option<PortNo> {
        let host = self.host(ip)?;
        if host.edge == edge {
            return Some(host.port);
        }
        let core = self.core_ports(host.via)?;
        match edge {
            SwitchRole::Ingress => Some(core.ingress_port),
            SwitchRole::Egress => Some(core.egress_port),
            _ => None,
        }
    }
}
