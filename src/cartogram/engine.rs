use std::{cmp::Ordering, collections::BTreeMap};

use ahash::AHashMap;
use geo::Coord;
use log::{debug, info};
use tilegeom::GridCoord;

use crate::{
    cartogram::{EngineConfig, RegionState, Status},
    error::Result,
    grid::TileGrid,
    metrics::MetricsBinding,
    region::{Dataset, Region, RegionId},
};

/// Incremental cartogram solver.
///
/// Each call to [`Cartogram::iterate`] moves every unstable region by at most
/// one tile. Tile counts are always read fresh from the grid, so the grid may
/// be edited freely between calls. The only state kept across calls is the
/// per-region blocked counters, the last states and the observed targets.
#[derive(Debug, Clone, Default)]
pub struct Cartogram {
    config: EngineConfig,
    states: BTreeMap<RegionId, RegionState>,
    blocked: AHashMap<RegionId, u32>,   // Consecutive steps without a legal move.
    observed: Option<(u64, u64)>,       // (metrics revision, dataset generation) of the last step.
    steps: u64,
}

impl Cartogram {
    pub fn new(config: EngineConfig) -> Self {
        Self { config, ..Default::default() }
    }

    #[inline] pub fn config(&self) -> &EngineConfig { &self.config }

    /// Number of steps taken since construction or the last reset.
    #[inline] pub fn steps(&self) -> u64 { self.steps }

    /// State of region `id` after the last step.
    #[inline] pub fn state(&self, id: &RegionId) -> Option<RegionState> { self.states.get(id).copied() }

    /// States of every region after the last step, in ascending id order.
    pub fn states(&self) -> impl Iterator<Item = (&RegionId, RegionState)> + '_ {
        self.states.iter().map(|(id, &state)| (id, state))
    }

    /// Forget all cross-call state. Grid ownership is untouched.
    pub fn reset(&mut self) {
        self.states.clear();
        self.blocked.clear();
        self.observed = None;
        self.steps = 0;
    }

    /// Advance the computation by one step.
    pub fn iterate(&mut self, grid: &mut TileGrid, dataset: &Dataset, metrics: &mut MetricsBinding) -> Result<Status> {
        // Warm restart when targets change: keep ownership, forget blockage.
        let observed = (metrics.revision(), dataset.generation());
        if self.observed != Some(observed) {
            if self.observed.is_some() {
                info!("[cartogram::iterate] targets changed, continuing from current ownership");
            }
            self.blocked.clear();
            self.states.clear();
            self.observed = Some(observed);
        }

        let targets = metrics.target_counts(dataset, self.config.policy)?;

        if self.config.repair_fragments {
            for region in dataset.iter_by_id() {
                repair_fragments(grid, &region.id)?;
            }
        }

        let mut moved = 0;
        for region in dataset.iter_by_id() {
            let count = grid.owned_count(&region.id);
            let step = match count.cmp(&targets.get(&region.id)) {
                Ordering::Less => Some(grow(grid, region)?),
                Ordering::Greater => Some(shrink(grid, region)?),
                Ordering::Equal => None,
            };

            match step {
                Some(false) => *self.blocked.entry(region.id.clone()).or_insert(0) += 1,
                Some(true) => { moved += 1; self.blocked.remove(&region.id); }
                None => { self.blocked.remove(&region.id); }
            }
        }

        // Recompute states from the post-move counts.
        self.states.clear();
        let mut unstable = 0;
        let mut unsatisfiable = Vec::new();
        for region in dataset.iter_by_id() {
            let count = grid.owned_count(&region.id);
            let blocked = self.blocked.get(&region.id).copied().unwrap_or(0);
            let state = match count.cmp(&targets.get(&region.id)) {
                Ordering::Equal => RegionState::Stable,
                _ if blocked >= self.config.grace_steps => RegionState::Unsatisfiable,
                Ordering::Less => RegionState::Growing,
                Ordering::Greater => RegionState::Shrinking,
            };

            if !state.is_stable() { unstable += 1 }
            if state == RegionState::Unsatisfiable { unsatisfiable.push(region.id.clone()) }
            self.states.insert(region.id.clone(), state);
        }

        self.steps += 1;
        debug!("[cartogram::iterate] step {}: {} moved, {} unstable, {} unsatisfiable",
            self.steps, moved, unstable, unsatisfiable.len());

        let status = match (unstable, unsatisfiable.len()) {
            (0, _) => Status::Converged,
            (u, s) if u == s => Status::Unsatisfiable(unsatisfiable),
            _ => Status::Active,
        };

        match &status {
            Status::Converged => info!("[cartogram::iterate] converged after {} steps", self.steps),
            Status::Unsatisfiable(ids) => info!("[cartogram::iterate] {} region(s) cannot reach their targets", ids.len()),
            Status::Active => {}
        }

        Ok(status)
    }
}

/// Keep the largest component of a split cluster and release the rest.
fn repair_fragments(grid: &mut TileGrid, id: &RegionId) -> Result<()> {
    let components = grid.components_of(id);
    if components.len() <= 1 { return Ok(()) }

    debug!("[cartogram::repair_fragments] region {} split into {} parts", id, components.len());
    for coord in components.into_iter().skip(1).flatten() {
        grid.release(coord)?;
    }
    Ok(())
}

/// Claim the candidate nearest the centroid. Returns false when no claim is possible.
fn grow(grid: &mut TileGrid, region: &Region) -> Result<bool> {
    let candidates = match grid.owned_count(&region.id) {
        0 => grid.unowned_tiles(),
        _ => grid.growth_candidates(&region.id),
    };

    for coord in rank(grid, candidates, region.centroid, Reach::Nearest) {
        match grid.claim(coord, &region.id) {
            Ok(()) => return Ok(true),
            Err(e) if e.is_conflict() => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(false)
}

/// Release the removable tile farthest from the centroid. Returns false when none is removable.
fn shrink(grid: &mut TileGrid, region: &Region) -> Result<bool> {
    let candidates = grid.interior_removable_tiles_of(&region.id);

    for coord in rank(grid, candidates, region.centroid, Reach::Farthest) {
        match grid.release(coord) {
            Ok(_) => return Ok(true),
            Err(e) if e.is_conflict() => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(false)
}

#[derive(Clone, Copy)]
enum Reach { Nearest, Farthest }

/// Order `coords` by distance to `centroid`; equal distances go to the lowest coordinate.
fn rank(grid: &TileGrid, coords: Vec<GridCoord>, centroid: Coord<f64>, reach: Reach) -> Vec<GridCoord> {
    let geometry = grid.geometry();
    let mut ranked = coords.into_iter()
        .map(|c| (geometry.distance(c, centroid), c))
        .collect::<Vec<_>>();

    ranked.sort_by(|(da, ca), (db, cb)| {
        let by_distance = match reach {
            Reach::Nearest => da.total_cmp(db),
            Reach::Farthest => db.total_cmp(da),
        };
        by_distance.then_with(|| ca.cmp(cb))
    });
    ranked.into_iter().map(|(_, c)| c).collect()
}

#[cfg(test)]
mod tests {
    use tilegeom::{GridGeometry, Scheme};

    use super::*;
    use crate::metrics::TargetPolicy;

    fn id(s: &str) -> RegionId { RegionId::new(s) }

    fn dataset(regions: &[(&str, f64, f64, f64)]) -> Dataset {
        let regions = regions.iter()
            .map(|&(id, metric, x, y)| Region::new(id, id, metric, Coord { x, y }))
            .collect();
        Dataset::new("test", "pop", regions).unwrap()
    }

    fn run(engine: &mut Cartogram, grid: &mut TileGrid, dataset: &Dataset, metrics: &mut MetricsBinding, limit: usize) -> Status {
        for _ in 0..limit {
            let status = engine.iterate(grid, dataset, metrics).unwrap();
            if status.is_done() { return status }
        }
        Status::Active
    }

    #[test]
    fn ties_resolve_to_lowest_coordinate() {
        let grid = TileGrid::rectangular(GridGeometry::new(Scheme::Square, 1.0), 3, 3);
        let coords = vec![GridCoord::new(2, 1), GridCoord::new(1, 2), GridCoord::new(0, 1), GridCoord::new(1, 0)];
        let centroid = Coord { x: 1.0, y: 1.0 };

        assert_eq!(rank(&grid, coords.clone(), centroid, Reach::Nearest)[0], GridCoord::new(0, 1));
        assert_eq!(rank(&grid, coords, centroid, Reach::Farthest)[0], GridCoord::new(0, 1));
    }

    #[test]
    fn seeds_nearest_centroid() {
        let mut grid = TileGrid::rectangular(GridGeometry::new(Scheme::Square, 1.0), 4, 4);
        let d = dataset(&[("A", 100.0, 2.9, 1.2)]);
        let mut metrics = MetricsBinding::new(100.0, d.sum_metrics()).unwrap();
        let mut engine = Cartogram::default();

        assert_eq!(engine.iterate(&mut grid, &d, &mut metrics).unwrap(), Status::Converged);
        assert_eq!(grid.owner_of(GridCoord::new(3, 1)), Some(&id("A")));
        assert_eq!(engine.state(&id("A")), Some(RegionState::Stable));
        assert_eq!(engine.steps(), 1);
    }

    #[test]
    fn shrinks_farthest_removable_tile() {
        let mut grid = TileGrid::rectangular(GridGeometry::new(Scheme::Square, 1.0), 3, 1);
        for x in 0..3 { grid.claim(GridCoord::new(x, 0), &id("A")).unwrap() }
        let d = dataset(&[("A", 200.0, 0.0, 0.0)]);
        let mut metrics = MetricsBinding::new(100.0, d.sum_metrics()).unwrap();
        let mut engine = Cartogram::default();

        assert_eq!(engine.iterate(&mut grid, &d, &mut metrics).unwrap(), Status::Converged);
        assert_eq!(grid.owner_of(GridCoord::new(2, 0)), None);
        assert!(grid.is_contiguous(&id("A")));
    }

    #[test]
    fn blocked_region_becomes_unsatisfiable_after_grace() {
        // A single tile cannot hold a region that wants two.
        let mut grid = TileGrid::rectangular(GridGeometry::new(Scheme::Hex, 1.0), 1, 1);
        let d = dataset(&[("A", 200.0, 0.0, 0.0)]);
        let mut metrics = MetricsBinding::new(100.0, d.sum_metrics()).unwrap();
        let config = EngineConfig { grace_steps: 3, ..Default::default() };
        let mut engine = Cartogram::new(config);

        for _ in 0..3 {
            assert_eq!(engine.iterate(&mut grid, &d, &mut metrics).unwrap(), Status::Active);
        }
        assert_eq!(engine.iterate(&mut grid, &d, &mut metrics).unwrap(), Status::Unsatisfiable(vec![id("A")]));
        assert_eq!(engine.state(&id("A")), Some(RegionState::Unsatisfiable));
    }

    #[test]
    fn fragments_are_repaired() {
        let mut grid = TileGrid::rectangular(GridGeometry::new(Scheme::Square, 1.0), 5, 1);
        for x in [0, 2, 3] { grid.claim(GridCoord::new(x, 0), &id("A")).unwrap() }
        let d = dataset(&[("A", 300.0, 2.0, 0.0)]);
        let mut metrics = MetricsBinding::new(100.0, d.sum_metrics()).unwrap();
        let mut engine = Cartogram::default();

        let status = run(&mut engine, &mut grid, &d, &mut metrics, 10);
        assert_eq!(status, Status::Converged);
        assert!(grid.is_contiguous(&id("A")));
        assert_eq!(grid.owned_count(&id("A")), 3);
        assert_eq!(grid.owner_of(GridCoord::new(0, 0)), None);
    }

    #[test]
    fn fragment_repair_can_be_disabled() {
        let mut grid = TileGrid::rectangular(GridGeometry::new(Scheme::Square, 1.0), 5, 1);
        for x in [0, 2, 3] { grid.claim(GridCoord::new(x, 0), &id("A")).unwrap() }
        let d = dataset(&[("A", 300.0, 2.0, 0.0)]);
        let mut metrics = MetricsBinding::new(100.0, d.sum_metrics()).unwrap();
        let config = EngineConfig { repair_fragments: false, ..Default::default() };
        let mut engine = Cartogram::new(config);

        assert_eq!(engine.iterate(&mut grid, &d, &mut metrics).unwrap(), Status::Converged);
        assert!(!grid.is_contiguous(&id("A")));
    }

    #[test]
    fn largest_remainder_policy_is_used() {
        let mut grid = TileGrid::rectangular(GridGeometry::new(Scheme::Square, 1.0), 4, 1);
        let d = dataset(&[("A", 150.0, 0.0, 0.0), ("B", 150.0, 3.0, 0.0)]);
        let mut metrics = MetricsBinding::new(100.0, d.sum_metrics()).unwrap();
        let config = EngineConfig { policy: TargetPolicy::LargestRemainder, ..Default::default() };
        let mut engine = Cartogram::new(config);

        assert_eq!(run(&mut engine, &mut grid, &d, &mut metrics, 10), Status::Converged);
        assert_eq!(grid.owned_count(&id("A")) + grid.owned_count(&id("B")), 3);
    }

    #[test]
    fn reset_clears_progress() {
        let mut grid = TileGrid::rectangular(GridGeometry::new(Scheme::Square, 1.0), 2, 1);
        let d = dataset(&[("A", 100.0, 0.0, 0.0)]);
        let mut metrics = MetricsBinding::new(100.0, d.sum_metrics()).unwrap();
        let mut engine = Cartogram::default();
        engine.iterate(&mut grid, &d, &mut metrics).unwrap();

        engine.reset();
        assert_eq!(engine.steps(), 0);
        assert_eq!(engine.state(&id("A")), None);
        assert_eq!(grid.owned_count(&id("A")), 1);
    }
}
