//! Traffic engineering core
//!
//! Switch registration, link load estimation, flow classification, path
//! selection, rule installation and counter polling.

mod classifier;
mod estimator;
mod installer;
mod poll;
mod registry;
mod selector;

pub use classifier::{FlowClassifier, FlowIntent};
pub use estimator::{CounterPair, LinkLoadEstimator, LinkSample};
pub use installer::{RoutingDecision, RuleInstaller};
pub use poll::{POLLED_ROLES, PollScheduler, PollTick};
pub use registry::{DeviceRegistry, Readiness, RoleBindingResult};
pub use selector::{Candidate, PathSelector, Selection};
