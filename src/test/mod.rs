mod control_loop;
mod installer;
mod polling;
mod selector;

use crate::config::ControllerConfig;
use crate::controller::Controller;
use crate::ofp::{DatapathId, Frame, FrameBody, Ipv4Header, MacAddr, RecordingChannel};
use crate::sched::ControlLoop;
use crate::topo::SwitchRole;
use std::net::Ipv4Addr;

pub(crate) type TestController = Controller<RecordingChannel>;

pub(crate) fn dpid(role: SwitchRole) -> DatapathId {
    let n = match role {
        SwitchRole::Ingress => 1,
        SwitchRole::RelayA => 2,
        SwitchRole::RelayB => 3,
        SwitchRole::RelayC => 4,
        SwitchRole::Egress => 5,
    };
    DatapathId(n)
}

/// Port names a Mininet switch `s{n}` would declare.
pub(crate) fn port_names(role: SwitchRole) -> Vec<String> {
    let n = dpid(role).0;
    (1..=6).map(|p| format!("s{n}-eth{p}")).collect()
}

pub(crate) fn controller(seed: u64) -> (TestController, ControlLoop<TestController>) {
    let config = ControllerConfig {
        seed: Some(seed),
        ..ControllerConfig::default()
    };
    let ctl = Controller::new(config, RecordingChannel::default()).expect("reference config");
    (ctl, ControlLoop::default())
}

/// Controller with all five switches registered.
pub(crate) fn ready_controller(seed: u64) -> (TestController, ControlLoop<TestController>) {
    let (mut ctl, mut lp) = controller(seed);
    for role in SwitchRole::ALL {
        ctl.on_connection_up(&mut lp, dpid(role), &port_names(role));
    }
    assert!(ctl.registry().is_ready());
    (ctl, lp)
}

pub(crate) fn ip(last: u8) -> Ipv4Addr {
    Ipv4Addr::new(10, 0, 0, last)
}

pub(crate) fn ipv4_frame(src: u8, dst: u8, tp_src: u16) -> Frame {
    Frame {
        dl_src: MacAddr([0, 0, 0, 0, 0, src]),
        dl_dst: MacAddr([0, 0, 0, 0, 0, dst]),
        body: FrameBody::Ipv4(Ipv4Header {
            src: ip(src),
            dst: ip(dst),
            proto: 6,
            tos: 0,
            tp_src: Some(tp_src),
            tp_dst: Some(5001),
        }),
    }
}
