//! Scheduled event
//!
//! Queue entry with its due time and insertion sequence.

use super::event::Event;
use super::time::LoopTime;
use std::cmp::Ordering;

/// A queued event, its due time and a tie-breaking sequence number.
pub struct ScheduledEvent<W> {
    pub(crate) at: LoopTime,
    pub(crate) seq: u64,
    pub(crate) ev: Box<dyn Event<W>>,
}

// BinaryHeap is a max-heap; earliest time (then lowest seq) must pop first.
impl<W> Ord for ScheduledEvent<W> {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.at.cmp(&other.at) {
            Ordering::Equal => self.seq.cmp(&other.seq),
            ord => ord,
        }
        .reverse()
    }
}

impl<W> PartialOrd for ScheduledEvent<W> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<W> PartialEq for ScheduledEvent<W> {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}

impl<W> Eq for ScheduledEvent<W> {}
