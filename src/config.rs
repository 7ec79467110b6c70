//! Controller configuration
//!
//! JSON-loadable settings. `Default` is the reference deployment: 1 s polls,
//! 70% saturation threshold, link weights 200:50:10 and the two pinned
//! host pairs.

use crate::ofp::PortNo;
use crate::topo::{CoreLink, DiamondTopology, SwitchRole};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub poll_interval_ms: u64,
    /// Fraction of capacity above which a non-exempt link leaves the draw.
    pub saturation_ratio: f64,
    pub topology: DiamondTopology,
    pub links: Vec<LinkConfig>,
    pub intents: Vec<IntentConfig>,
    pub rules: RuleConfig,
    /// Fixed RNG seed for reproducible path draws.
    pub seed: Option<u64>,
}

/// Capacity and draw weight of one core link.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkConfig {
    pub link: CoreLink,
    /// Bits per poll interval.
    pub capacity: u64,
    pub weight: u32,
    /// Never excluded from best-effort selection.
    #[serde(default)]
    pub exempt: bool,
}

/// A pinned (source, destination) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentConfig {
    pub name: String,
    pub src: Ipv4Addr,
    pub dst: Ipv4Addr,
    pub path: CoreLink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Edge rules delivering to a host (or back across the core).
    pub host_priority: u16,
    /// Relay pass-through rules.
    pub transit_priority: u16,
    /// Per-flow rules installed at the ingress switch.
    pub flow_priority: u16,
    pub flow_idle_timeout_s: u16,
    pub flow_hard_timeout_s: u16,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            host_priority: 100,
            transit_priority: 10,
            flow_priority: 100,
            flow_idle_timeout_s: 2,
            flow_hard_timeout_s: 0,
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1_000,
            saturation_ratio: 0.7,
            topology: DiamondTopology::reference(),
            links: vec![
                LinkConfig {
                    link: CoreLink::RelayA,
                    capacity: 1_000_000,
                    weight: 200,
                    exempt: true,
                },
                LinkConfig {
                    link: CoreLink::RelayB,
                    capacity: 1_000_000,
                    weight: 50,
                    exempt: false,
                },
                LinkConfig {
                    link: CoreLink::RelayC,
                    capacity: 1_000_000,
                    weight: 10,
                    exempt: false,
                },
            ],
            intents: vec![
                IntentConfig {
                    name: "h1-h4".to_string(),
                    src: Ipv4Addr::new(10, 0, 0, 1),
                    dst: Ipv4Addr::new(10, 0, 0, 4),
                    path: CoreLink::RelayB,
                },
                IntentConfig {
                    name: "h2-h5".to_string(),
                    src: Ipv4Addr::new(10, 0, 0, 2),
                    dst: Ipv4Addr::new(10, 0, 0, 5),
                    path: CoreLink::RelayC,
                },
            ],
            rules: RuleConfig::default(),
            seed: None,
        }
    }
}

impl ControllerConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let cfg: ControllerConfig = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn link(&self, link: CoreLink) -> Option<&LinkConfig> {
        self.links.iter().find(|l| l.link == link)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.poll_interval_ms == 0 {
            return invalid("poll_interval_ms must be > 0".into());
        }
        if !(self.saturation_ratio > 0.0 && self.saturation_ratio <= 1.0) {
            return invalid(format!(
                "saturation_ratio must be in (0, 1], got {}",
                self.saturation_ratio
            ));
        }

        for role in SwitchRole::ALL {
            let named = self
                .topology
                .port_names
                .get(&role)
                .is_some_and(|names| !names.is_empty());
            if !named {
                return invalid(format!("no port names declared for role {role}"));
            }
        }

        for link in CoreLink::ALL {
            let count = self.links.iter().filter(|l| l.link == link).count();
            if count != 1 {
                return invalid(format!("link {link} configured {count} times, expected once"));
            }
            if self.topology.core_ports(link).is_none() {
                return invalid(format!("topology has no ports for link {link}"));
            }
        }
        self.validate_ports()?;
        if self.links.iter().all(|l| l.weight == 0) {
            return invalid("at least one link needs a non-zero weight".into());
        }
        if let Some(l) = self.links.iter().find(|l| l.capacity == 0) {
            return invalid(format!("link {} has zero capacity", l.link));
        }

        for h in &self.topology.hosts {
            if !h.edge.is_edge() {
                return invalid(format!("host {} attached to non-edge role {}", h.name, h.edge));
            }
        }

        let mut pairs = HashSet::new();
        for intent in &self.intents {
            if !pairs.insert((intent.src, intent.dst)) {
                return invalid(format!(
                    "intent {} duplicates pair {} -> {}",
                    intent.name, intent.src, intent.dst
                ));
            }
        }
        Ok(())
    }

    /// Each port on an edge or relay switch serves exactly one purpose.
    fn validate_ports(&self) -> Result<(), ConfigError> {
        let topo = &self.topology;
        if topo.relay_uplink == topo.relay_downlink {
            return Err(ConfigError::Invalid(format!(
                "relay uplink and downlink share port {}",
                topo.relay_uplink
            )));
        }

        let mut used: HashSet<(SwitchRole, PortNo)> = HashSet::new();
        let core = topo.core.iter().flat_map(|c| {
            [
                (SwitchRole::Ingress, c.ingress_port, c.link.to_string()),
                (SwitchRole::Egress, c.egress_port, c.link.to_string()),
            ]
        });
        let hosts = topo.hosts.iter().map(|h| (h.edge, h.port, h.name.clone()));
        for (role, port, owner) in core.chain(hosts) {
            if !used.insert((role, port)) {
                return Err(ConfigError::Invalid(format!(
                    "{owner} reuses port {port} on {role}"
                )));
            }
        }
        Ok(())
    }
}
