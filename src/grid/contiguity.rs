use std::collections::VecDeque;

use ahash::AHashSet;
use tilegeom::GridCoord;

use crate::{grid::TileGrid, region::RegionId};

impl TileGrid {
    /// Check if releasing tile `t` keeps the rest of its owner's cluster connected.
    ///
    /// Unowned tiles are trivially removable.
    pub(crate) fn check_tile_removable(&self, t: usize) -> bool {
        let owner = self.owners.find(t);
        if owner == 0 { return true }

        // Collect neighbors that share the owner.
        let neighbors = self.adjacency.edges(t)
            .filter(|&v| self.owners.find(v) == owner)
            .collect::<Vec<_>>();

        // With fewer than 2 same-owner neighbors, removal cannot disconnect the cluster.
        if neighbors.len() <= 1 { return true }

        // BFS from one neighbor within the cluster, forbidding `t`.
        // Only the owner's tiles are ever visited.
        let mut visited = AHashSet::with_capacity(self.owners.get(owner).len());
        visited.insert(t);
        visited.insert(neighbors[0]);

        let mut remaining = neighbors.len() - 1;
        let mut queue = VecDeque::from([neighbors[0]]);
        while let Some(u) = queue.pop_front() {
            for v in self.adjacency.edges(u) {
                if self.owners.find(v) == owner && visited.insert(v) {
                    queue.push_back(v);
                    if neighbors.contains(&v) { remaining -= 1; if remaining == 0 { return true } }
                }
            }
        }

        false
    }

    /// Owned tiles of `id` whose release keeps the rest of the cluster connected,
    /// in ascending coordinate order.
    pub fn interior_removable_tiles_of(&self, id: &RegionId) -> Vec<GridCoord> {
        let mut coords = self.owned_indices(id).iter()
            .filter(|&&t| self.check_tile_removable(t))
            .map(|&t| self.tiles[t].coord)
            .collect::<Vec<_>>();
        coords.sort_unstable();
        coords
    }

    /// Connected components of the cluster owned by `id`, largest first.
    ///
    /// Components of equal size are ordered by their lowest coordinate, and each
    /// component lists its coordinates in ascending order.
    pub fn components_of(&self, id: &RegionId) -> Vec<Vec<GridCoord>> {
        let Some(slot) = self.slot(id) else { return Vec::new() };

        let mut owned = self.owners.get(slot).to_vec();
        owned.sort_unstable();

        let mut components = Vec::new();
        let mut visited = AHashSet::with_capacity(owned.len());
        for u in owned {
            if !visited.insert(u) { continue }

            let mut component = Vec::new();
            let mut queue = VecDeque::from([u]);
            while let Some(v) = queue.pop_front() {
                component.push(self.tiles[v].coord);
                for w in self.adjacency.edges(v) {
                    if self.owners.find(w) == slot && visited.insert(w) {
                        queue.push_back(w);
                    }
                }
            }
            component.sort_unstable();
            components.push(component);
        }

        // Stable sort keeps the lowest-coordinate order among equal sizes.
        components.sort_by(|a, b| b.len().cmp(&a.len()));
        components
    }

    /// Check if the cluster owned by `id` is connected. Empty clusters are connected.
    pub fn is_contiguous(&self, id: &RegionId) -> bool {
        self.components_of(id).len() <= 1
    }
}
