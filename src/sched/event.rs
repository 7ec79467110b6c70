//! Event trait
//!
//! Anything that can be posted onto the control loop.

use super::control_loop::ControlLoop;

/// A unit of work run on the control loop against state `W`.
///
/// Takes `self: Box<Self>` so the event can move its payload out.
pub trait Event<W>: 'static {
    fn execute(self: Box<Self>, lp: &mut ControlLoop<W>, world: &mut W);
}
