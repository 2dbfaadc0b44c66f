// Integration tests for neighbor topology.

use tilegeom::{GridCoord, Scheme};

#[test]
fn adjacency_is_symmetric() {
    for scheme in [Scheme::Square, Scheme::Hex] {
        for x in -5..6 {
            for y in -5..6 {
                let a = GridCoord::new(x, y);
                for b in scheme.neighbors(a) {
                    assert!(scheme.neighbors(b).contains(&a), "{scheme:?}: {a} -> {b} not mirrored");
                    assert!(scheme.are_adjacent(b, a));
                }
            }
        }
    }
}

#[test]
fn neighbors_are_distinct_and_exclude_self() {
    for scheme in [Scheme::Square, Scheme::Hex] {
        let c = GridCoord::new(2, 3);
        let mut neighbors = scheme.neighbors(c).into_vec();
        assert!(!neighbors.contains(&c));
        neighbors.sort();
        neighbors.dedup();
        assert_eq!(neighbors.len(), scheme.degree());
    }
}
