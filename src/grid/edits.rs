use tilegeom::GridCoord;

use crate::grid::TileGrid;

impl TileGrid {
    /// Check if ownership differs from the last snapshot taken by `reset_edits`.
    pub fn has_unsaved_edits(&self) -> bool {
        self.tiles.iter().zip(&self.snapshot).any(|(tile, saved)| tile.owner != *saved)
    }

    /// Coordinates whose owner differs from the last snapshot, in ascending order.
    pub fn edited_tiles(&self) -> Vec<GridCoord> {
        self.tiles.iter().zip(&self.snapshot)
            .filter(|(tile, saved)| tile.owner != **saved)
            .map(|(tile, _)| tile.coord)
            .collect()
    }

    /// Snapshot the current ownership. Ownership itself is unchanged.
    pub fn reset_edits(&mut self) {
        self.snapshot = self.tiles.iter().map(|t| t.owner.clone()).collect();
    }
}
