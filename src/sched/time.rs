//! Loop time
//!
//! Monotonic control-loop time and unit conversions.

/// Control-loop time in nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct LoopTime(pub u64);

impl LoopTime {
    pub const ZERO: LoopTime = LoopTime(0);

    pub fn from_millis(ms: u64) -> LoopTime {
        LoopTime(ms.saturating_mul(1_000_000))
    }
    pub fn from_secs(s: u64) -> LoopTime {
        LoopTime(s.saturating_mul(1_000_000_000))
    }

    pub fn as_millis(self) -> u64 {
        self.0 / 1_000_000
    }

    /// `self + d`, saturating.
    pub fn after(self, d: LoopTime) -> LoopTime {
        LoopTime(self.0.saturating_add(d.0))
    }
}
