//! Controller
//!
//! Owns every piece of controller state and handles the notifications the
//! control loop dispatches. All handlers run serially with exclusive access.

use crate::config::{ConfigError, ControllerConfig};
use crate::ofp::{DatapathId, DeviceChannel, FlowMatch, Frame, PortNo, PortStats};
use crate::sched::{ControlLoop, LoopTime};
use crate::te::{
    DeviceRegistry, FlowClassifier, FlowIntent, LinkLoadEstimator, PathSelector, PollScheduler,
    RoleBindingResult, RoutingDecision, RuleInstaller, Selection,
};
use crate::topo::{CoreLink, SwitchRole};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::net::Ipv4Addr;
use tracing::{debug, info, trace, warn};

/// Running counters of what the controller did.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ControllerStats {
    pub packet_ins: u64,
    pub priority_flows: u64,
    pub best_effort_flows: u64,
    /// Best-effort flows that had no eligible candidate.
    pub fallback_flows: u64,
    /// Routed flows per core link, indexed by `CoreLink::index`.
    pub flows_per_link: [u64; 3],
    pub counter_replies: u64,
}

pub struct Controller<C> {
    config: ControllerConfig,
    pub(crate) registry: DeviceRegistry,
    pub(crate) estimator: LinkLoadEstimator,
    pub(crate) classifier: FlowClassifier,
    pub(crate) selector: PathSelector,
    pub(crate) installer: RuleInstaller,
    pub(crate) poll: PollScheduler,
    pub channel: C,
    rng: StdRng,
    pub stats: ControllerStats,
}

impl<C: DeviceChannel + 'static> Controller<C> {
    pub fn new(config: ControllerConfig, channel: C) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            registry: DeviceRegistry::new(),
            estimator: LinkLoadEstimator::new(&config),
            classifier: FlowClassifier::new(&config.intents),
            selector: PathSelector::new(&config),
            installer: RuleInstaller::new(&config),
            poll: PollScheduler::new(LoopTime::from_millis(config.poll_interval_ms)),
            channel,
            rng,
            stats: ControllerStats::default(),
            config,
        })
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn estimator(&self) -> &LinkLoadEstimator {
        &self.estimator
    }

    pub fn poll(&self) -> &PollScheduler {
        &self.poll
    }

    pub fn installer(&self) -> &RuleInstaller {
        &self.installer
    }

    /// A switch connected and declared its ports.
    #[tracing::instrument(skip(self, lp, ports), fields(%dpid))]
    pub fn on_connection_up<S: AsRef<str>>(
        &mut self,
        lp: &mut ControlLoop<Self>,
        dpid: DatapathId,
        ports: &[S],
    ) -> RoleBindingResult {
        self.channel.on_connected(dpid);
        let result = self.registry.register(&self.config.topology, dpid, ports);
        if let RoleBindingResult::Bound { role, became_ready } = result {
            self.estimator.watch(role, dpid);
            if became_ready {
                info!("🟢 all switches registered, starting counter polls");
                self.poll.arm::<Self>(lp);
            }
        }
        result
    }

    /// A switch's connection went away. Its role binding stays; its default
    /// rules are reinstalled after it comes back.
    pub fn on_connection_down(&mut self, dpid: DatapathId) {
        info!(%dpid, role = ?self.registry.role_of(dpid), "switch disconnected");
        self.channel.on_disconnected(dpid);
        self.installer.forget_defaults(dpid);
    }

    /// A switch had no rule for a packet.
    #[tracing::instrument(skip(self, frame, payload), fields(%dpid, %in_port, ethertype = frame.ethertype()))]
    pub fn on_packet_in(
        &mut self,
        dpid: DatapathId,
        in_port: PortNo,
        frame: &Frame,
        payload: Vec<u8>,
    ) -> Option<RoutingDecision> {
        self.stats.packet_ins += 1;
        let Some(role) = self.registry.role_of(dpid) else {
            warn!("packet from unregistered switch ignored");
            return None;
        };
        self.installer.install_defaults(&mut self.channel, dpid, role);

        if let Some(arp) = frame.arp() {
            if role.is_edge() {
                self.forward_arp(dpid, role, in_port, arp.target_ip, payload);
            }
            return None;
        }
        if role != SwitchRole::Ingress {
            return None;
        }
        let Some(ip) = frame.ipv4() else {
            trace!("non-IP frame at ingress ignored");
            return None;
        };

        let topo = &self.config.topology;
        if let Some(host) = topo.host(ip.dst).filter(|h| h.edge == SwitchRole::Ingress) {
            let port = host.port;
            debug!(dst = %ip.dst, %port, "local delivery at ingress");
            self.installer.forward_packet(&mut self.channel, dpid, payload, port, Some(in_port));
            return None;
        }

        if !self.registry.is_ready() {
            debug!(readiness = ?self.registry.readiness(), "topology incomplete, flow not routed");
            return None;
        }

        let decision = self.route_flow(ip.src, ip.dst)?;
        let matcher = FlowMatch::from_frame(frame, in_port);
        self.installer.install_flow_rule(&mut self.channel, dpid, matcher, &decision, payload);
        Some(decision)
    }

    /// Pick the core link for a new flow from `src` to `dst`.
    pub fn route_flow(&mut self, src: Ipv4Addr, dst: Ipv4Addr) -> Option<RoutingDecision> {
        let intent = self.classifier.classify(src, dst);
        let link = match &intent {
            FlowIntent::Priority { path, .. } => {
                self.stats.priority_flows += 1;
                *path
            }
            FlowIntent::BestEffort => {
                self.stats.best_effort_flows += 1;
                let selection = self.select_best_effort_path();
                if matches!(selection, Selection::Fallback(_)) {
                    self.stats.fallback_flows += 1;
                }
                selection.link()
            }
        };
        self.stats.flows_per_link[link.index()] += 1;
        info!(%src, %dst, ?intent, %link, "flow routed");
        self.installer.decision(link)
    }

    /// Weighted draw over the current link estimates.
    pub fn select_best_effort_path(&mut self) -> Selection {
        self.selector.select_best_effort_path(self.estimator.samples(), &mut self.rng)
    }

    /// A switch answered a counter request.
    pub fn on_port_stats(&mut self, dpid: DatapathId, stats: &[PortStats]) {
        self.stats.counter_replies += 1;
        if self.registry.role_of(dpid).is_none() {
            debug!(%dpid, "counters from unregistered switch ignored");
            return;
        }
        let used = self.estimator.on_port_stats(dpid, stats);
        trace!(%dpid, used, "counter reply applied");
    }

    /// One poll timer firing.
    pub fn on_poll_tick(&mut self) -> usize {
        self.poll.poll(&self.registry, &mut self.channel)
    }

    /// Stop re-arming the poll timer.
    pub fn shutdown(&mut self) {
        info!("controller shutting down");
        self.poll.stop();
    }

    fn forward_arp(
        &mut self,
        dpid: DatapathId,
        role: SwitchRole,
        in_port: PortNo,
        target: Ipv4Addr,
        payload: Vec<u8>,
    ) {
        match self.config.topology.edge_port_toward(role, target) {
            Some(port) => {
                trace!(%target, %port, "forwarding ARP");
                self.installer.forward_packet(&mut self.channel, dpid, payload, port, Some(in_port));
            }
            None => debug!(%target, "ARP for unknown host dropped"),
        }
    }

    /// Current estimate for `link`, bits per poll interval.
    pub fn bitrate(&self, link: CoreLink) -> u64 {
        self.estimator.sample(link).estimated_bitrate
    }
}

impl<C> std::fmt::Debug for Controller<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("readiness", &self.registry.readiness())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

