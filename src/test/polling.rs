use super::{controller, dpid, port_names, ready_controller};
use crate::ofp::{ConnectionDown, ConnectionUp, DatapathId};
use crate::sched::LoopTime;
use crate::scenario::Shutdown;
use crate::te::POLLED_ROLES;
use crate::topo::SwitchRole;
use std::collections::HashSet;

#[test]
fn timer_is_not_armed_before_topology_is_complete() {
    let (mut ctl, mut lp) = controller(1);
    for role in &SwitchRole::ALL[..4] {
        ctl.on_connection_up(&mut lp, dpid(*role), &port_names(*role));
    }
    assert!(!ctl.poll().is_armed());
    lp.run_until(LoopTime::from_secs(5), &mut ctl);
    assert_eq!(ctl.channel.counter_requests().count(), 0);
}

#[test]
fn each_tick_requests_counters_from_ingress_and_relays() {
    let (mut ctl, mut lp) = ready_controller(1);
    assert!(ctl.poll().is_armed());

    lp.run_until(LoopTime::from_millis(3_500), &mut ctl);
    assert_eq!(ctl.poll().ticks(), 3);

    let reqs: Vec<DatapathId> = ctl.channel.counter_requests().collect();
    assert_eq!(reqs.len(), 3 * POLLED_ROLES.len());
    let polled: HashSet<_> = reqs.iter().copied().collect();
    let expected: HashSet<_> = POLLED_ROLES.iter().map(|&r| dpid(r)).collect();
    assert_eq!(polled, expected);
    assert!(!polled.contains(&dpid(SwitchRole::Egress)));
}

#[test]
fn reconnecting_switch_does_not_arm_a_second_timer() {
    let (mut ctl, mut lp) = ready_controller(1);
    lp.schedule(
        LoopTime::from_millis(100),
        ConnectionUp {
            dpid: dpid(SwitchRole::RelayA),
            ports: port_names(SwitchRole::RelayA),
        },
    );
    lp.run_until(LoopTime::from_millis(2_500), &mut ctl);
    assert_eq!(ctl.poll().ticks(), 2);
    assert_eq!(lp.pending(), 1);
}

#[test]
fn missing_connection_turns_ticks_into_no_ops() {
    let (mut ctl, mut lp) = ready_controller(1);
    lp.schedule(
        LoopTime::from_millis(1_500),
        ConnectionDown {
            dpid: dpid(SwitchRole::RelayC),
        },
    );
    lp.run_until(LoopTime::from_millis(4_000), &mut ctl);

    assert_eq!(ctl.poll().ticks(), 4);
    assert_eq!(ctl.poll().skipped(), 3);
    assert_eq!(ctl.channel.counter_requests().count(), POLLED_ROLES.len());
    // Registration survives the disconnect.
    assert!(ctl.registry().is_ready());
}

#[test]
fn shutdown_stops_the_timer() {
    let (mut ctl, mut lp) = ready_controller(1);
    lp.schedule(LoopTime::from_millis(2_500), Shutdown);
    lp.run_until(LoopTime::from_secs(10), &mut ctl);

    assert_eq!(ctl.poll().ticks(), 2);
    assert_eq!(lp.pending(), 0);
    assert!(ctl.poll().is_stopped());
}
