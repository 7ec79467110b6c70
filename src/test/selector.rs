use crate::config::{ControllerConfig, LinkConfig};
use crate::te::{LinkSample, PathSelector, Selection};
use crate::topo::CoreLink;
use rand::SeedableRng;
use rand::rngs::StdRng;

const CAPACITY: u64 = 1_000_000;

fn samples(a: u64, b: u64, c: u64) -> Vec<LinkSample> {
    [(CoreLink::RelayA, a), (CoreLink::RelayB, b), (CoreLink::RelayC, c)]
        .into_iter()
        .map(|(link, bitrate)| {
            let mut s = LinkSample::new(link, CAPACITY);
            s.estimated_bitrate = bitrate;
            s
        })
        .collect()
}

fn draw_counts(sel: &PathSelector, samples: &[LinkSample], n: usize, seed: u64) -> [usize; 3] {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut counts = [0; 3];
    for _ in 0..n {
        counts[sel.select_best_effort_path(samples, &mut rng).link().index()] += 1;
    }
    counts
}

#[test]
fn unloaded_links_split_roughly_by_weight() {
    let sel = PathSelector::new(&ControllerConfig::default());
    let counts = draw_counts(&sel, &samples(0, 0, 0), 1000, 42);

    // Expected ≈ 769 / 192 / 38.
    assert!((709..=829).contains(&counts[0]), "relay_a {counts:?}");
    assert!((142..=242).contains(&counts[1]), "relay_b {counts:?}");
    assert!((13..=63).contains(&counts[2]), "relay_c {counts:?}");
    assert_eq!(counts.iter().sum::<usize>(), 1000);
}

#[test]
fn saturated_relay_b_is_never_chosen() {
    let sel = PathSelector::new(&ControllerConfig::default());
    let state = samples(0, 800_000, 100_000);
    assert_eq!(
        sel.eligible(&state).iter().map(|c| c.link).collect::<Vec<_>>(),
        vec![CoreLink::RelayA, CoreLink::RelayC]
    );

    let counts = draw_counts(&sel, &state, 2000, 7);
    assert_eq!(counts[CoreLink::RelayB.index()], 0);
    assert!(counts[CoreLink::RelayC.index()] > 0);
}

#[test]
fn saturated_relay_c_is_never_chosen() {
    let sel = PathSelector::new(&ControllerConfig::default());
    let counts = draw_counts(&sel, &samples(0, 0, 750_000), 2000, 11);
    assert_eq!(counts[CoreLink::RelayC.index()], 0);
    assert!(counts[CoreLink::RelayB.index()] > 0);
}

#[test]
fn both_bounded_links_saturated_always_picks_relay_a() {
    let sel = PathSelector::new(&ControllerConfig::default());
    let state = samples(0, 900_000, 900_000);
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..500 {
        assert_eq!(
            sel.select_best_effort_path(&state, &mut rng),
            Selection::Only(CoreLink::RelayA)
        );
    }
}

#[test]
fn exempt_link_stays_eligible_when_saturated() {
    let sel = PathSelector::new(&ControllerConfig::default());
    let state = samples(5_000_000, 0, 0);
    assert_eq!(sel.eligible(&state).len(), 3);
}

#[test]
fn link_exactly_at_threshold_stays_eligible() {
    let sel = PathSelector::new(&ControllerConfig {
        saturation_ratio: 0.5,
        ..ControllerConfig::default()
    });
    assert_eq!(sel.eligible(&samples(0, 500_000, 500_001)).len(), 2);
}

#[test]
fn all_links_excluded_falls_back_to_least_utilized() {
    let mut cfg = ControllerConfig::default();
    cfg.links = CoreLink::ALL
        .iter()
        .map(|&link| LinkConfig {
            link,
            capacity: CAPACITY,
            weight: 1,
            exempt: false,
        })
        .collect();
    let sel = PathSelector::new(&cfg);
    let mut rng = StdRng::seed_from_u64(1);

    let sel_result = sel.select_best_effort_path(&samples(990_000, 800_000, 950_000), &mut rng);
    assert_eq!(sel_result, Selection::Fallback(CoreLink::RelayB));
}

#[test]
fn zero_weight_survivor_is_not_drawn() {
    let mut cfg = ControllerConfig::default();
    for l in &mut cfg.links {
        if l.link == CoreLink::RelayC {
            l.weight = 0;
        }
    }
    let sel = PathSelector::new(&cfg);
    let counts = draw_counts(&sel, &samples(0, 0, 0), 500, 5);
    assert_eq!(counts[CoreLink::RelayC.index()], 0);
}
