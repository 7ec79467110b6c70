//! Control loop
//!
//! Holds the current loop time and the pending event queue.

use super::event::Event;
use super::scheduled_event::ScheduledEvent;
use super::time::LoopTime;
use std::collections::BinaryHeap;
use tracing::{debug, info, trace};

/// Serial event dispatcher: current time plus a time-ordered queue.
pub struct ControlLoop<W> {
    now: LoopTime,
    next_seq: u64,
    q: BinaryHeap<ScheduledEvent<W>>,
}

impl<W> Default for ControlLoop<W> {
    fn default() -> Self {
        Self {
            now: LoopTime::ZERO,
            next_seq: 0,
            q: BinaryHeap::new(),
        }
    }
}

impl<W: 'static> ControlLoop<W> {
    /// Current loop time
    pub fn now(&self) -> LoopTime {
        self.now
    }

    /// Number of pending events
    pub fn pending(&self) -> usize {
        self.q.len()
    }

    /// Post an event to run at `at`. Events in the past run at the next dispatch.
    #[tracing::instrument(level = "trace", skip(self, ev), fields(event_type = std::any::type_name::<E>(), schedule_at = ?at))]
    pub fn schedule<E: Event<W>>(&mut self, at: LoopTime, ev: E) {
        let seq = self.next_seq;
        trace!(now = ?self.now, seq, "posting event");

        self.next_seq = self.next_seq.wrapping_add(1);
        self.q.push(ScheduledEvent {
            at,
            seq,
            ev: Box::new(ev),
        });
    }

    /// Post an event to run `delay` after the current time.
    pub fn schedule_in<E: Event<W>>(&mut self, delay: LoopTime, ev: E) {
        let at = self.now.after(delay);
        self.schedule(at, ev);
    }

    /// Dispatch events until the queue is empty or the next one is due after `until`.
    pub fn run_until(&mut self, until: LoopTime, world: &mut W) -> u64 {
        let mut dispatched = 0;
        while let Some(top) = self.q.peek() {
            if top.at > until {
                break;
            }
            let Some(item) = self.q.pop() else {
                break;
            };
            self.now = self.now.max(item.at);
            item.ev.execute(self, world);
            dispatched += 1;
        }
        self.now = self.now.max(until);
        debug!(dispatched, now = ?self.now, remaining = self.q.len(), "loop paused");
        dispatched
    }

    /// Dispatch every queued event, including ones posted while running.
    ///
    /// A recurring timer that never stops re-arming keeps this from returning;
    /// prefer `run_until` when timers are armed.
    #[tracing::instrument(skip(self, world))]
    pub fn run(&mut self, world: &mut W) -> u64 {
        info!("▶️  control loop started");

        let mut dispatched = 0;
        while let Some(item) = self.q.pop() {
            dispatched += 1;
            self.now = self.now.max(item.at);

            trace!(
                event_num = dispatched,
                now = ?self.now,
                seq = item.seq,
                remaining_queue = self.q.len(),
                "dispatching event"
            );

            item.ev.execute(self, world);
        }

        info!(total_events = dispatched, final_time = ?self.now, "✅ control loop drained");
        dispatched
    }
}
