pub mod config;
pub mod controller;
pub mod ofp;
pub mod scenario;
pub mod sched;
pub mod te;
pub mod topo;

#[cfg(test)]
mod test;
