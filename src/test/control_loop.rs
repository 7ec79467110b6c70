use crate::sched::{ControlLoop, Event, LoopTime};

#[derive(Default)]
struct Log {
    ids: Vec<u32>,
}

struct Push {
    id: u32,
}

impl Event<Log> for Push {
    fn execute(self: Box<Self>, _lp: &mut ControlLoop<Log>, world: &mut Log) {
        world.ids.push(self.id);
    }
}

struct PushThenScheduleNow {
    id: u32,
    next_id: u32,
}

impl Event<Log> for PushThenScheduleNow {
    fn execute(self: Box<Self>, lp: &mut ControlLoop<Log>, world: &mut Log) {
        world.ids.push(self.id);
        lp.schedule(lp.now(), Push { id: self.next_id });
    }
}

/// Re-arms itself every `period` until `remaining` hits zero.
struct Recurring {
    period: LoopTime,
    remaining: u32,
}

impl Event<Log> for Recurring {
    fn execute(self: Box<Self>, lp: &mut ControlLoop<Log>, world: &mut Log) {
        world.ids.push(lp.now().as_millis() as u32);
        if self.remaining > 1 {
            lp.schedule_in(
                self.period,
                Recurring {
                    period: self.period,
                    remaining: self.remaining - 1,
                },
            );
        }
    }
}

#[test]
fn events_dispatch_by_time_then_insertion_order() {
    let mut lp = ControlLoop::default();
    lp.schedule(LoopTime(10), Push { id: 1 });
    lp.schedule(LoopTime(5), Push { id: 2 });
    lp.schedule(LoopTime(10), Push { id: 3 });

    let mut log = Log::default();
    assert_eq!(lp.run(&mut log), 3);

    assert_eq!(log.ids, vec![2, 1, 3]);
    assert_eq!(lp.now(), LoopTime(10));
}

#[test]
fn event_posted_for_now_runs_after_current_event() {
    let mut lp = ControlLoop::default();
    lp.schedule(LoopTime::ZERO, PushThenScheduleNow { id: 1, next_id: 2 });

    let mut log = Log::default();
    lp.run(&mut log);

    assert_eq!(log.ids, vec![1, 2]);
    assert_eq!(lp.now(), LoopTime::ZERO);
}

#[test]
fn run_until_leaves_later_events_queued_and_advances_time() {
    let mut lp = ControlLoop::default();
    lp.schedule(LoopTime::ZERO, Push { id: 1 });
    lp.schedule(LoopTime(10), Push { id: 2 });

    let mut log = Log::default();
    assert_eq!(lp.run_until(LoopTime(5), &mut log), 1);
    assert_eq!(log.ids, vec![1]);
    assert_eq!(lp.now(), LoopTime(5));
    assert_eq!(lp.pending(), 1);

    lp.run(&mut log);
    assert_eq!(log.ids, vec![1, 2]);
    assert_eq!(lp.now(), LoopTime(10));
}

#[test]
fn run_until_includes_events_due_exactly_at_until() {
    let mut lp = ControlLoop::default();
    lp.schedule(LoopTime(5), Push { id: 1 });

    let mut log = Log::default();
    lp.run_until(LoopTime(5), &mut log);
    assert_eq!(log.ids, vec![1]);
}

#[test]
fn recurring_event_fires_once_per_period() {
    let mut lp = ControlLoop::default();
    let period = LoopTime::from_millis(1_000);
    lp.schedule(period, Recurring { period, remaining: 10 });

    let mut log = Log::default();
    lp.run_until(LoopTime::from_millis(3_500), &mut log);
    assert_eq!(log.ids, vec![1_000, 2_000, 3_000]);
    assert_eq!(lp.pending(), 1);
}

#[test]
fn time_never_moves_backwards_for_late_posts() {
    let mut lp = ControlLoop::default();
    let mut log = Log::default();
    lp.run_until(LoopTime(100), &mut log);

    lp.schedule(LoopTime(10), Push { id: 9 });
    lp.run(&mut log);
    assert_eq!(log.ids, vec![9]);
    assert_eq!(lp.now(), LoopTime(100));
}
