//! Device registry
//!
//! Binds connecting switches to topology roles by their declared port names
//! and tracks when all five roles are known.

use crate::ofp::DatapathId;
use crate::topo::{DiamondTopology, SwitchRole};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

/// `Discovering` until every role is bound, then `Ready` for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Discovering { bound: usize },
    Ready,
}

/// Outcome of one registration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleBindingResult {
    /// New binding. `became_ready` is true only on the call that completed the topology.
    Bound { role: SwitchRole, became_ready: bool },
    /// This device already holds a role; nothing changed.
    AlreadyBound(SwitchRole),
    /// The role belongs to a different device; nothing changed.
    RoleTaken { role: SwitchRole, holder: DatapathId },
    /// No port matched a known naming convention (or several roles did).
    Unrecognized,
}

#[derive(Debug, Default)]
pub struct DeviceRegistry {
    by_dpid: HashMap<DatapathId, SwitchRole>,
    by_role: BTreeMap<SwitchRole, DatapathId>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to bind `dpid` to a role using `topo`'s port-name convention.
    #[tracing::instrument(skip(self, topo, declared_ports), fields(%dpid, ports = declared_ports.len()))]
    pub fn register<S: AsRef<str>>(
        &mut self,
        topo: &DiamondTopology,
        dpid: DatapathId,
        declared_ports: &[S],
    ) -> RoleBindingResult {
        if let Some(&role) = self.by_dpid.get(&dpid) {
            debug!(%role, "device already registered");
            return RoleBindingResult::AlreadyBound(role);
        }

        let Some(role) = topo.role_for_ports(declared_ports) else {
            let names: Vec<&str> = declared_ports.iter().map(|s| s.as_ref()).collect();
            warn!(?names, "no role matches declared ports, ignoring device");
            return RoleBindingResult::Unrecognized;
        };

        if let Some(&holder) = self.by_role.get(&role) {
            warn!(%role, %holder, "role already bound to another device, ignoring");
            return RoleBindingResult::RoleTaken { role, holder };
        }

        self.by_dpid.insert(dpid, role);
        self.by_role.insert(role, dpid);
        let became_ready = self.is_ready();
        info!(%role, bound = self.by_role.len(), became_ready, "switch registered");
        RoleBindingResult::Bound { role, became_ready }
    }

    pub fn readiness(&self) -> Readiness {
        if self.is_ready() {
            Readiness::Ready
        } else {
            Readiness::Discovering {
                bound: self.by_role.len(),
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        SwitchRole::ALL.iter().all(|r| self.by_role.contains_key(r))
    }

    pub fn role_of(&self, dpid: DatapathId) -> Option<SwitchRole> {
        self.by_dpid.get(&dpid).copied()
    }

    pub fn dpid_of(&self, role: SwitchRole) -> Option<DatapathId> {
        self.by_role.get(&role).copied()
    }

    pub fn len(&self) -> usize {
        self.by_role.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_role.is_empty()
    }
}
