use std::collections::BTreeSet;

use trailgrid_core::{Marker, MarkerKind, NodeIndex};
use trailgrid_system_marks::{place_markers, SeededRandom};

const START: NodeIndex = NodeIndex::new(1);

fn exits() -> Vec<NodeIndex> {
    vec![NodeIndex::new(100)]
}

/// 10x10 grid with a wall down column 5 that leaves the top and bottom rows open.
fn walled_paths() -> Vec<NodeIndex> {
    (1..=100)
        .filter(|n| *n != 100)
        .filter(|n| {
            let row = (n - 1) / 10 + 1;
            let column = (n - 1) % 10 + 1;
            !(column == 5 && (2..=9).contains(&row))
        })
        .map(NodeIndex::new)
        .collect()
}

fn place(seed: u64) -> Vec<Marker> {
    let mut rng = SeededRandom::new(seed);
    place_markers(&mut rng, &walled_paths(), START, &exits())
}

fn marker(node: u32, kind: MarkerKind) -> Marker {
    Marker::new(NodeIndex::new(node), kind)
}

#[test]
fn known_sequence_for_seed_42() {
    let mut rng = SeededRandom::new(42);
    let drawn: Vec<f64> = (0..5).map(|_| rng.next_f64()).collect();
    assert_eq!(
        drawn,
        vec![
            0.000_227_178_214_322_849_07,
            0.221_525_488_330_147_07,
            0.955_057_134_491_122_8,
            0.278_559_444_170_542_5,
            0.829_817_983_663_069_2,
        ]
    );
}

#[test]
fn different_seeds_diverge() {
    let mut first = SeededRandom::new(42);
    let mut second = SeededRandom::new(43);
    let first: Vec<f64> = (0..10).map(|_| first.next_f64()).collect();
    let second: Vec<f64> = (0..10).map(|_| second.next_f64()).collect();
    assert_ne!(first, second);
}

#[test]
fn placement_matches_reference_for_large_seed() {
    let markers = place(123_456_789);
    assert_eq!(markers.len(), 51);
    assert_eq!(
        markers
            .iter()
            .filter(|marker| marker.kind == MarkerKind::Reward)
            .count(),
        35
    );
    assert_eq!(
        &markers[..4],
        &[
            marker(74, MarkerKind::Reward),
            marker(86, MarkerKind::Reward),
            marker(43, MarkerKind::Reward),
            marker(57, MarkerKind::Penalty),
        ]
    );
}

#[test]
fn placement_matches_reference_for_seed_1() {
    let markers = place(1);
    assert_eq!(markers.len(), 20);
    assert_eq!(
        &markers[..3],
        &[
            marker(26, MarkerKind::Penalty),
            marker(93, MarkerKind::Reward),
            marker(24, MarkerKind::Reward),
        ]
    );
}

#[test]
fn placement_is_repeatable() {
    assert_eq!(place(987_654_321), place(987_654_321));
    assert_ne!(place(987_654_321), place(2024));
}

#[test]
fn markers_avoid_start_exits_and_duplicates() {
    for seed in [1, 42, 2024, 123_456_789, 987_654_321] {
        let markers = place(seed);
        let nodes: BTreeSet<NodeIndex> = markers.iter().map(|marker| marker.node).collect();
        assert_eq!(nodes.len(), markers.len(), "duplicate marker for seed {seed}");
        assert!(!nodes.contains(&START));
        assert!(!nodes.contains(&NodeIndex::new(100)));
        assert!(nodes.iter().all(|node| walled_paths().contains(node)));
        assert!((20..60).contains(&markers.len()));
    }
}

#[test]
fn count_is_capped_by_eligible_nodes() {
    let paths: Vec<NodeIndex> = [2, 3, 4, 5].into_iter().map(NodeIndex::new).collect();
    let mut rng = SeededRandom::new(7);
    let markers = place_markers(&mut rng, &paths, NodeIndex::new(2), &[NodeIndex::new(9)]);
    assert_eq!(
        markers,
        vec![
            marker(5, MarkerKind::Penalty),
            marker(3, MarkerKind::Reward),
            marker(4, MarkerKind::Reward),
        ]
    );
}
