//! Flow classification
//!
//! Exact-match lookup of (source, destination) against the configured
//! intents. Anything not listed is best-effort.

use crate::config::IntentConfig;
use crate::topo::CoreLink;
use std::collections::HashMap;
use std::net::Ipv4Addr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowIntent {
    /// Pinned to `path` regardless of load.
    Priority { name: String, path: CoreLink },
    BestEffort,
}

impl FlowIntent {
    pub fn is_priority(&self) -> bool {
        matches!(self, FlowIntent::Priority { .. })
    }
}

#[derive(Debug, Default)]
pub struct FlowClassifier {
    table: HashMap<(Ipv4Addr, Ipv4Addr), (String, CoreLink)>,
}

impl FlowClassifier {
    pub fn new(intents: &[IntentConfig]) -> Self {
        let table = intents
            .iter()
            .map(|i| ((i.src, i.dst), (i.name.clone(), i.path)))
            .collect();
        Self { table }
    }

    pub fn classify(&self, src: Ipv4Addr, dst: Ipv4Addr) -> FlowIntent {
        match self.table.get(&(src, dst)) {
            Some((name, path)) => FlowIntent::Priority {
                name: name.clone(),
                path: *path,
            },
            None => FlowIntent::BestEffort,
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
