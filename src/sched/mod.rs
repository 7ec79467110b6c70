//! Control loop
//!
//! A single-threaded event queue. Timers and device notifications are posted
//! here and dispatched one at a time, each with exclusive access to the
//! controller state.

mod control_loop;
mod event;
mod scheduled_event;
mod time;

pub use control_loop::ControlLoop;
pub use event::Event;
pub use scheduled_event::ScheduledEvent;
pub use time::LoopTime;
