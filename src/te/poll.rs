//! Counter polling
//!
//! A recurring timer on the control loop, armed once the topology is
//! complete. Each tick asks the ingress switch and the three relays for port
//! counters; replies arrive later as separate notifications.

use super::registry::DeviceRegistry;
use crate::controller::Controller;
use crate::ofp::{DatapathId, DeviceChannel};
use crate::sched::{ControlLoop, Event, LoopTime};
use crate::topo::SwitchRole;
use tracing::{debug, trace, warn};

/// Switches asked for counters each tick.
pub const POLLED_ROLES: [SwitchRole; 4] = [
    SwitchRole::Ingress,
    SwitchRole::RelayA,
    SwitchRole::RelayB,
    SwitchRole::RelayC,
];

#[derive(Debug)]
pub struct PollScheduler {
    interval: LoopTime,
    armed: bool,
    stopped: bool,
    ticks: u64,
    skipped: u64,
}

impl PollScheduler {
    pub fn new(interval: LoopTime) -> Self {
        Self {
            interval,
            armed: false,
            stopped: false,
            ticks: 0,
            skipped: 0,
        }
    }

    pub fn interval(&self) -> LoopTime {
        self.interval
    }

    /// Post the first tick one interval from now. Only the first call arms.
    pub fn arm<W: 'static>(&mut self, lp: &mut ControlLoop<W>) -> bool
    where
        PollTick: Event<W>,
    {
        if self.armed || self.stopped {
            return false;
        }
        self.armed = true;
        lp.schedule_in(self.interval, PollTick);
        debug!(interval = ?self.interval, "poll timer armed");
        true
    }

    /// Keep the timer from re-arming.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Send one counter request per polled switch. Skips the whole tick when
    /// any of them has no connection. Returns the number of requests sent.
    pub fn poll<C: DeviceChannel + ?Sized>(
        &mut self,
        registry: &DeviceRegistry,
        ch: &mut C,
    ) -> usize {
        self.ticks += 1;

        let targets: Option<Vec<DatapathId>> = POLLED_ROLES
            .iter()
            .map(|&r| registry.dpid_of(r).filter(|&d| ch.is_connected(d)))
            .collect();
        let Some(targets) = targets else {
            self.skipped += 1;
            debug!(tick = self.ticks, "switch connection missing, tick skipped");
            return 0;
        };

        let mut sent = 0;
        for dpid in targets {
            match ch.send_counter_request(dpid) {
                Ok(()) => sent += 1,
                Err(e) => warn!(%dpid, error = %e, "counter request dropped"),
            }
        }
        trace!(tick = self.ticks, sent, "counter requests sent");
        sent
    }
}

/// Timer event driving one poll cycle.
#[derive(Debug, Clone, Copy)]
pub struct PollTick;

impl<C: DeviceChannel + 'static> Event<Controller<C>> for PollTick {
    fn execute(self: Box<Self>, lp: &mut ControlLoop<Controller<C>>, ctl: &mut Controller<C>) {
        if ctl.poll.is_stopped() {
            debug!("poll timer stopped");
            return;
        }
        ctl.on_poll_tick();
        let interval = ctl.poll.interval();
        lp.schedule_in(interval, PollTick);
    }
}
