//! Rule installation
//!
//! Turns roles and routing decisions into flow rules and packet-outs.
//! Send failures are logged and dropped.

use crate::config::{ControllerConfig, RuleConfig};
use crate::ofp::{
    Action, DatapathId, DeviceChannel, ETH_TYPE_ARP, ETH_TYPE_IPV4, FlowMatch, FlowMod, PacketOut,
    PortNo,
};
use crate::topo::{CoreLink, DiamondTopology, SwitchRole};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Where one new flow goes and how long its rule lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutingDecision {
    pub link: CoreLink,
    pub out_port: PortNo,
    pub priority: u16,
    pub idle_timeout: u16,
}

#[derive(Debug)]
pub struct RuleInstaller {
    topology: DiamondTopology,
    rules: RuleConfig,
    defaults_installed: HashSet<DatapathId>,
}

impl RuleInstaller {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            topology: config.topology.clone(),
            rules: config.rules,
            defaults_installed: HashSet::new(),
        }
    }

    /// Decision for sending a new flow down `link`.
    pub fn decision(&self, link: CoreLink) -> Option<RoutingDecision> {
        let out_port = self.topology.ingress_port(link)?;
        Some(RoutingDecision {
            link,
            out_port,
            priority: self.rules.flow_priority,
            idle_timeout: self.rules.flow_idle_timeout_s,
        })
    }

    /// Static rules a switch in `role` needs so every host is reachable.
    ///
    /// The ingress switch gets no rules toward remote hosts: those flows
    /// must reach the controller for a per-flow decision.
    pub fn default_rules(&self, role: SwitchRole) -> Vec<FlowMod> {
        let topo = &self.topology;
        let host = self.rules.host_priority;
        let transit = self.rules.transit_priority;
        let to_host = |ip| FlowMatch::any().with_dl_type(ETH_TYPE_IPV4).with_nw_dst(ip);

        match role {
            SwitchRole::Ingress => topo
                .hosts_at(SwitchRole::Ingress)
                .map(|h| FlowMod::permanent(to_host(h.ip), h.port, host))
                .collect(),
            SwitchRole::Egress => topo
                .hosts
                .iter()
                .filter_map(|h| {
                    let port = topo.edge_port_toward(SwitchRole::Egress, h.ip)?;
                    Some(FlowMod::permanent(to_host(h.ip), port, host))
                })
                .collect(),
            relay => {
                let (up, down) = (topo.relay_uplink, topo.relay_downlink);
                let mut rules = Vec::with_capacity(4);
                for (from, to) in [(up, down), (down, up)] {
                    for dl_type in [ETH_TYPE_ARP, ETH_TYPE_IPV4] {
                        let m = FlowMatch::any().with_in_port(from).with_dl_type(dl_type);
                        rules.push(FlowMod::permanent(m, to, transit));
                    }
                }
                debug!(%relay, rules = rules.len(), "relay pass-through rules");
                rules
            }
        }
    }

    /// Install `role`'s default rules on `dpid` the first time it is seen.
    /// Returns false when they were already installed or none could be sent.
    #[tracing::instrument(skip(self, ch), fields(%dpid, %role))]
    pub fn install_defaults<C: DeviceChannel + ?Sized>(
        &mut self,
        ch: &mut C,
        dpid: DatapathId,
        role: SwitchRole,
    ) -> bool {
        if !self.defaults_installed.insert(dpid) {
            return false;
        }
        let rules = self.default_rules(role);
        let count = rules.len();
        let sent = rules
            .into_iter()
            .map(|rule| send_rule(ch, dpid, rule))
            .filter(|&ok| ok)
            .count();
        if count > 0 && sent == 0 {
            warn!(count, "no default rule reached the switch, will retry");
            self.defaults_installed.remove(&dpid);
            return false;
        }
        info!(count, sent, "default rules installed");
        true
    }

    /// Forget that `dpid` has its defaults; its next packet-in reinstalls them.
    pub fn forget_defaults(&mut self, dpid: DatapathId) {
        self.defaults_installed.remove(&dpid);
    }

    pub fn defaults_installed(&self, dpid: DatapathId) -> bool {
        self.defaults_installed.contains(&dpid)
    }

    /// Install a time-limited rule for one flow and forward its first packet.
    #[tracing::instrument(skip(self, ch, matcher, payload), fields(%dpid, link = %decision.link, out_port = %decision.out_port))]
    pub fn install_flow_rule<C: DeviceChannel + ?Sized>(
        &self,
        ch: &mut C,
        dpid: DatapathId,
        matcher: FlowMatch,
        decision: &RoutingDecision,
        payload: Vec<u8>,
    ) {
        let in_port = matcher.in_port;
        let rule = FlowMod {
            matcher,
            actions: vec![Action::Output(decision.out_port)],
            priority: decision.priority,
            idle_timeout: decision.idle_timeout,
            hard_timeout: self.rules.flow_hard_timeout_s,
        };
        send_rule(ch, dpid, rule);
        forward(ch, dpid, payload, decision.out_port, in_port);
    }

    /// Send one packet out of `out_port` without touching the flow table.
    pub fn forward_packet<C: DeviceChannel + ?Sized>(
        &self,
        ch: &mut C,
        dpid: DatapathId,
        payload: Vec<u8>,
        out_port: PortNo,
        in_port: Option<PortNo>,
    ) {
        forward(ch, dpid, payload, out_port, in_port);
    }
}

fn send_rule<C: DeviceChannel + ?Sized>(ch: &mut C, dpid: DatapathId, rule: FlowMod) -> bool {
    match ch.send_flow_rule(dpid, rule) {
        Ok(()) => true,
        Err(e) => {
            warn!(%dpid, error = %e, "flow rule dropped");
            false
        }
    }
}

fn forward<C: DeviceChannel + ?Sized>(
    ch: &mut C,
    dpid: DatapathId,
    payload: Vec<u8>,
    out_port: PortNo,
    in_port: Option<PortNo>,
) {
    if let Err(e) = ch.send_packet_out(dpid, PacketOut::forward(payload, out_port, in_port)) {
        warn!(%dpid, error = %e, "packet-out dropped");
    }
}
