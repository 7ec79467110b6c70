//! Best-effort path selection
//!
//! Weighted random draw over the core links, after dropping every
//! non-exempt link whose estimate is above the saturation ratio. Dropped
//! links simply leave the table; the remaining weights are used as-is.

use super::estimator::LinkSample;
use crate::config::ControllerConfig;
use crate::topo::CoreLink;
use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub link: CoreLink,
    pub weight: u32,
    pub exempt: bool,
}

/// Chosen link and how it was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Drawn among two or more remaining candidates.
    Weighted(CoreLink),
    /// Exactly one candidate remained.
    Only(CoreLink),
    /// Every candidate was excluded or weightless.
    Fallback(CoreLink),
}

impl Selection {
    pub fn link(self) -> CoreLink {
        match self {
            Selection::Weighted(l) | Selection::Only(l) | Selection::Fallback(l) => l,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PathSelector {
    candidates: Vec<Candidate>,
    saturation_ratio: f64,
}

impl PathSelector {
    pub fn new(config: &ControllerConfig) -> Self {
        let candidates = CoreLink::ALL
            .iter()
            .filter_map(|&link| config.link(link))
            .map(|l| Candidate {
                link: l.link,
                weight: l.weight,
                exempt: l.exempt,
            })
            .collect();
        Self {
            candidates,
            saturation_ratio: config.saturation_ratio,
        }
    }

    fn is_excluded(&self, c: &Candidate, samples: &[LinkSample]) -> bool {
        !c.exempt
            && samples
                .iter()
                .find(|s| s.link == c.link)
                .is_some_and(|s| s.exceeds(self.saturation_ratio))
    }

    /// Candidates that survive the saturation check, in table order.
    pub fn eligible(&self, samples: &[LinkSample]) -> Vec<Candidate> {
        self.candidates
            .iter()
            .filter(|c| !self.is_excluded(c, samples))
            .copied()
            .collect()
    }

    pub fn select_best_effort_path<R: Rng + ?Sized>(
        &self,
        samples: &[LinkSample],
        rng: &mut R,
    ) -> Selection {
        let eligible = self.eligible(samples);
        if eligible.len() < self.candidates.len() {
            let excluded: Vec<CoreLink> = self
                .candidates
                .iter()
                .filter(|c| !eligible.iter().any(|e| e.link == c.link))
                .map(|c| c.link)
                .collect();
            debug!(?excluded, ratio = self.saturation_ratio, "links above saturation threshold");
        }

        match eligible.as_slice() {
            [] => {}
            [only] if only.weight > 0 => return Selection::Only(only.link),
            many => {
                if let Ok(dist) = WeightedIndex::new(many.iter().map(|c| c.weight)) {
                    return Selection::Weighted(many[dist.sample(rng)].link);
                }
            }
        }

        let fallback = self.fallback(samples);
        warn!(link = %fallback, "no eligible candidate, using fallback link");
        Selection::Fallback(fallback)
    }

    /// The exempt link if there is one, else the least utilized link.
    fn fallback(&self, samples: &[LinkSample]) -> CoreLink {
        if let Some(c) = self.candidates.iter().find(|c| c.exempt) {
            return c.link;
        }
        samples
            .iter()
            .min_by(|a, b| a.utilization().total_cmp(&b.utilization()))
            .map_or(CoreLink::RelayA, |s| s.link)
    }
}
