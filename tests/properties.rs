use proptest::prelude::*;
use tilegram::{
    Cartogram, Dataset, GridCoord, GridGeometry, MetricsBinding, Region, RegionId, Scheme, TileGrid,
};

#[derive(Clone, Debug)]
enum Op {
    Claim { tile: u16, region: u8 },
    Release { tile: u16 },
    Iterate,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<u16>(), any::<u8>()).prop_map(|(tile, region)| Op::Claim { tile, region }),
        any::<u16>().prop_map(|tile| Op::Release { tile }),
        Just(Op::Iterate),
        Just(Op::Iterate),
    ]
}

fn scheme_strategy() -> impl Strategy<Value = Scheme> {
    prop_oneof![Just(Scheme::Hex), Just(Scheme::Square)]
}

/// Every tile has exactly one owner slot, and per-region listings agree with tile records.
fn assert_exclusive(grid: &TileGrid) {
    let owned = grid.owner_ids().iter().map(|id| grid.owned_count(id)).sum::<usize>();
    assert_eq!(owned + grid.unowned_count(), grid.len());

    for id in grid.owner_ids() {
        for tile in grid.tiles_owned_by(&id) {
            assert!(tile.is_owned_by(&id));
        }
    }
    for tile in grid.tiles() {
        match &tile.owner {
            Some(id) => assert!(grid.tiles_owned_by(id).any(|t| t.coord == tile.coord)),
            None => assert!(grid.unowned_tiles().contains(&tile.coord)),
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn adjacency_is_symmetric(scheme in scheme_strategy(), cols in 1u32..8, rows in 1u32..8, holes in prop::collection::vec(any::<u16>(), 0..10)) {
        let dense = TileGrid::rectangular(GridGeometry::new(scheme, 1.0), cols, rows);
        let coords = dense.coords().collect::<Vec<_>>();
        let holes = holes.iter().map(|h| coords[*h as usize % coords.len()]).collect::<Vec<_>>();
        let grid = TileGrid::new(GridGeometry::new(scheme, 1.0), coords.iter().copied().filter(|c| !holes.contains(c))).unwrap();

        for a in grid.coords() {
            for b in grid.present_neighbors(a) {
                prop_assert!(grid.present_neighbors(b).contains(&a));
                prop_assert!(scheme.are_adjacent(a, b));
            }
        }
    }

    #[test]
    fn edits_and_steps_keep_invariants(
        scheme in scheme_strategy(),
        cols in 2u32..7,
        rows in 2u32..7,
        metrics in prop::collection::vec(1u32..6, 1..4),
        ops in prop::collection::vec(op_strategy(), 1..60),
    ) {
        let mut grid = TileGrid::rectangular(GridGeometry::new(scheme, 1.0), cols, rows);
        let coords = grid.coords().collect::<Vec<_>>();

        let regions = metrics.iter().enumerate()
            .map(|(i, &m)| {
                let anchor = coords[(i * 7) % coords.len()];
                Region::new(format!("R{}", i), format!("R{}", i), m as f64 * 10.0, grid.geometry().position(anchor))
            })
            .collect::<Vec<_>>();
        let ids = regions.iter().map(|r| r.id.clone()).collect::<Vec<RegionId>>();
        let dataset = Dataset::new("prop", "m", regions).unwrap();
        let mut binding = MetricsBinding::new(10.0, dataset.sum_metrics()).unwrap();
        let mut engine = Cartogram::default();

        for op in ops {
            match op {
                Op::Claim { tile, region } => {
                    let coord: GridCoord = coords[tile as usize % coords.len()];
                    let before = grid.owner_of(coord).cloned();
                    let result = grid.claim(coord, &ids[region as usize % ids.len()]);
                    // A failed claim changes nothing.
                    if result.is_err() { prop_assert_eq!(grid.owner_of(coord).cloned(), before) }
                }
                Op::Release { tile } => {
                    let coord = coords[tile as usize % coords.len()];
                    let _ = grid.release(coord);
                    prop_assert!(grid.owner_of(coord).is_none());
                }
                Op::Iterate => {
                    engine.iterate(&mut grid, &dataset, &mut binding).unwrap();
                    for id in &ids {
                        prop_assert!(grid.is_contiguous(id), "{} split after a step", id);
                    }
                }
            }
            assert_exclusive(&grid);
        }
    }
}
