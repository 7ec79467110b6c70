use super::{ip, ipv4_frame};
use crate::config::ControllerConfig;
use crate::ofp::{
    Action, DatapathId, ETH_TYPE_ARP, ETH_TYPE_IPV4, FlowMatch, PortNo, RecordingChannel,
};
use crate::te::RuleInstaller;
use crate::topo::{CoreLink, SwitchRole};

fn installer() -> RuleInstaller {
    RuleInstaller::new(&ControllerConfig::default())
}

#[test]
fn ingress_defaults_only_deliver_to_local_hosts() {
    let rules = installer().default_rules(SwitchRole::Ingress);
    let got: Vec<_> = rules
        .iter()
        .map(|r| (r.matcher.nw_dst, r.out_port(), r.priority))
        .collect();
    assert_eq!(
        got,
        vec![
            (Some(ip(1)), Some(PortNo(1)), 100),
            (Some(ip(2)), Some(PortNo(2)), 100),
            (Some(ip(3)), Some(PortNo(3)), 100),
        ]
    );
    assert!(rules.iter().all(|r| r.idle_timeout == 0 && r.hard_timeout == 0));
    assert!(rules.iter().all(|r| r.matcher.dl_type == Some(ETH_TYPE_IPV4)));
}

#[test]
fn egress_defaults_reach_every_host() {
    let rules = installer().default_rules(SwitchRole::Egress);
    let mut got: Vec<_> = rules
        .iter()
        .map(|r| (r.matcher.nw_dst.expect("nw_dst"), r.out_port().expect("port")))
        .collect();
    got.sort();
    assert_eq!(
        got,
        vec![
            (ip(1), PortNo(1)),
            (ip(2), PortNo(2)),
            (ip(3), PortNo(3)),
            (ip(4), PortNo(4)),
            (ip(5), PortNo(5)),
            (ip(6), PortNo(6)),
        ]
    );
}

#[test]
fn relay_defaults_pass_arp_and_ip_both_ways() {
    let rules = installer().default_rules(SwitchRole::RelayB);
    assert_eq!(rules.len(), 4);
    for (in_port, out_port) in [(1, 2), (2, 1)] {
        for dl_type in [ETH_TYPE_ARP, ETH_TYPE_IPV4] {
            let m = FlowMatch::any()
                .with_in_port(PortNo(in_port))
                .with_dl_type(dl_type);
            let r = rules
                .iter()
                .find(|r| r.matcher == m)
                .unwrap_or_else(|| panic!("missing rule {m:?}"));
            assert_eq!(r.actions, vec![Action::Output(PortNo(out_port))]);
            assert_eq!(r.priority, 10);
        }
    }
}

#[test]
fn defaults_are_installed_once_per_switch() {
    let mut inst = installer();
    let mut ch = RecordingChannel::default();
    let d = DatapathId(3);
    ch.connect(d);

    assert!(inst.install_defaults(&mut ch, d, SwitchRole::RelayB));
    assert!(!inst.install_defaults(&mut ch, d, SwitchRole::RelayB));
    assert_eq!(ch.flow_rules(d).count(), 4);
    assert!(inst.defaults_installed(d));
}

#[test]
fn flow_rule_is_followed_by_packet_out_on_same_port() {
    let inst = installer();
    let mut ch = RecordingChannel::default();
    let d = DatapathId(1);
    ch.connect(d);

    let decision = inst.decision(CoreLink::RelayC).expect("relay_c ports");
    assert_eq!(decision.out_port, PortNo(6));
    assert_eq!(decision.idle_timeout, 2);

    let frame = ipv4_frame(3, 6, 40000);
    let matcher = FlowMatch::from_frame(&frame, PortNo(3));
    inst.install_flow_rule(&mut ch, d, matcher.clone(), &decision, vec![1, 2, 3]);

    let rules: Vec<_> = ch.flow_rules(d).collect();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].matcher, matcher);
    assert_eq!(rules[0].matcher.tp_src, Some(40000));
    assert_eq!(rules[0].out_port(), Some(PortNo(6)));
    assert_eq!(rules[0].idle_timeout, 2);
    assert_eq!(rules[0].hard_timeout, 0);

    let outs: Vec<_> = ch.packet_outs(d).collect();
    assert_eq!(outs.len(), 1);
    assert_eq!(outs[0].out_port(), Some(PortNo(6)));
    assert_eq!(outs[0].in_port, Some(PortNo(3)));
    assert_eq!(outs[0].payload, vec![1, 2, 3]);
}

#[test]
fn defaults_that_never_reached_the_switch_are_retried() {
    let mut inst = installer();
    let mut ch = RecordingChannel::default();
    let d = DatapathId(5);

    assert!(!inst.install_defaults(&mut ch, d, SwitchRole::Egress));
    assert!(ch.sent.is_empty());
    assert_eq!(ch.dropped, 6);
    assert!(!inst.defaults_installed(d));

    ch.connect(d);
    assert!(inst.install_defaults(&mut ch, d, SwitchRole::Egress));
    assert_eq!(ch.flow_rules(d).count(), 6);
}

#[test]
fn forgotten_defaults_are_sent_again() {
    let mut inst = installer();
    let mut ch = RecordingChannel::default();
    let d = DatapathId(2);
    ch.connect(d);

    assert!(inst.install_defaults(&mut ch, d, SwitchRole::RelayA));
    inst.forget_defaults(d);
    assert!(!inst.defaults_installed(d));
    assert!(inst.install_defaults(&mut ch, d, SwitchRole::RelayA));
    assert_eq!(ch.flow_rules(d).count(), 8);
}
