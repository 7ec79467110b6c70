//! Link load estimation
//!
//! Each poll cycle the ingress switch reports cumulative transmit counters
//! for its three core ports. The byte delta between consecutive replies,
//! times eight, is the link's bitrate for that interval.
//!
//! Relays report their uplink receive counters too; those only feed the
//! sent/received packet report and never influence routing.

use crate::config::ControllerConfig;
use crate::ofp::{DatapathId, PortNo, PortStats};
use crate::topo::{CoreLink, SwitchRole};
use std::collections::HashMap;
use tracing::{debug, info, trace};

/// Last two readings of a cumulative counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterPair {
    pub previous: u64,
    pub current: u64,
}

impl CounterPair {
    pub fn push(&mut self, value: u64) {
        self.previous = self.current;
        self.current = value;
    }

    /// Absolute change between the two readings.
    pub fn delta(&self) -> u64 {
        self.current.abs_diff(self.previous)
    }
}

/// Load state of one core link.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkSample {
    pub link: CoreLink,
    pub previous_bytes: u64,
    pub current_bytes: u64,
    /// Bits sent during the last poll interval.
    pub estimated_bitrate: u64,
    /// Bits per poll interval.
    pub capacity: u64,
    /// Ingress-side transmit packets.
    pub sent_packets: CounterPair,
    /// Relay-side receive packets.
    pub received_packets: CounterPair,
    /// Byte samples recorded so far.
    pub samples: u64,
}

impl LinkSample {
    pub fn new(link: CoreLink, capacity: u64) -> Self {
        Self {
            link,
            previous_bytes: 0,
            current_bytes: 0,
            estimated_bitrate: 0,
            capacity,
            sent_packets: CounterPair::default(),
            received_packets: CounterPair::default(),
            samples: 0,
        }
    }

    pub fn record_tx_bytes(&mut self, tx_bytes: u64) {
        self.previous_bytes = self.current_bytes;
        self.current_bytes = tx_bytes;
        self.estimated_bitrate = self.current_bytes.abs_diff(self.previous_bytes).saturating_mul(8);
        self.samples += 1;
    }

    /// Estimated bitrate as a fraction of capacity.
    pub fn utilization(&self) -> f64 {
        if self.capacity == 0 {
            return f64::INFINITY;
        }
        self.estimated_bitrate as f64 / self.capacity as f64
    }

    /// True when the estimate is strictly above `ratio` of capacity.
    pub fn exceeds(&self, ratio: f64) -> bool {
        self.estimated_bitrate as f64 > ratio * self.capacity as f64
    }
}

#[derive(Debug)]
pub struct LinkLoadEstimator {
    /// Indexed by `CoreLink::index`.
    samples: [LinkSample; 3],
    ingress: Option<DatapathId>,
    ingress_ports: HashMap<PortNo, CoreLink>,
    relays: HashMap<DatapathId, CoreLink>,
    relay_uplink: PortNo,
}

impl LinkLoadEstimator {
    pub fn new(config: &ControllerConfig) -> Self {
        let capacity = |link| config.link(link).map_or(0, |l| l.capacity);
        let ingress_ports = config
            .topology
            .core
            .iter()
            .map(|c| (c.ingress_port, c.link))
            .collect();
        Self {
            samples: CoreLink::ALL.map(|l| LinkSample::new(l, capacity(l))),
            ingress: None,
            ingress_ports,
            relays: HashMap::new(),
            relay_uplink: config.topology.relay_uplink,
        }
    }

    /// Start accepting counters from a switch that just got its role.
    pub fn watch(&mut self, role: SwitchRole, dpid: DatapathId) {
        match role {
            SwitchRole::Ingress => self.ingress = Some(dpid),
            SwitchRole::Egress => {}
            relay => {
                if let Some(link) = relay.core_link() {
                    self.relays.insert(dpid, link);
                }
            }
        }
    }

    /// Record a transmit byte counter. Returns the updated link, or `None`
    /// when `(dpid, port)` is not a monitored ingress core port.
    pub fn on_counter_sample(
        &mut self,
        dpid: DatapathId,
        port: PortNo,
        tx_bytes: u64,
    ) -> Option<&LinkSample> {
        if self.ingress != Some(dpid) {
            return None;
        }
        let link = *self.ingress_ports.get(&port)?;
        let sample = &mut self.samples[link.index()];
        sample.record_tx_bytes(tx_bytes);
        debug!(
            %link,
            previous_bytes = sample.previous_bytes,
            current_bytes = sample.current_bytes,
            estimated_bitrate = sample.estimated_bitrate,
            utilization = sample.utilization(),
            "link load updated"
        );
        Some(sample)
    }

    /// Apply a whole counter reply. Returns how many port entries were used.
    #[tracing::instrument(level = "debug", skip(self, stats), fields(%dpid, entries = stats.len()))]
    pub fn on_port_stats(&mut self, dpid: DatapathId, stats: &[PortStats]) -> usize {
        let mut used = 0;
        for s in stats.iter().filter(|s| s.port_no.is_physical()) {
            if self.on_counter_sample(dpid, s.port_no, s.tx_bytes).is_some() {
                if let Some(&link) = self.ingress_ports.get(&s.port_no) {
                    self.samples[link.index()].sent_packets.push(s.tx_packets);
                }
                used += 1;
            } else if let Some(&link) = self.relays.get(&dpid) {
                if s.port_no == self.relay_uplink {
                    let sample = &mut self.samples[link.index()];
                    sample.received_packets.push(s.rx_packets);
                    info!(
                        %link,
                        sent = sample.sent_packets.delta(),
                        received = sample.received_packets.delta(),
                        "packets sent vs received"
                    );
                    used += 1;
                }
            } else {
                trace!(port = %s.port_no, "port not monitored");
            }
        }
        used
    }

    pub fn sample(&self, link: CoreLink) -> &LinkSample {
        &self.samples[link.index()]
    }

    pub fn samples(&self) -> &[LinkSample] {
        &self.samples
    }

    /// Packets the ingress sent on `link` vs packets its relay received,
    /// over the last interval each side reported.
    pub fn delivery(&self, link: CoreLink) -> (u64, u64) {
        let s = self.sample(link);
        (s.sent_packets.delta(), s.received_packets.delta())
    }
}
