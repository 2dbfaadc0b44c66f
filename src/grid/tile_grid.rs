use std::collections::BTreeMap;

use ahash::AHashMap;
use geo::Rect;
use smallvec::SmallVec;
use tilegeom::{GridCoord, GridGeometry, GridSpan, Scheme};

use crate::{
    error::{Result, TilegramError},
    grid::{Adjacency, OwnerSet, Tile},
    region::RegionId,
};

/// The set of tiles for one geography, their fixed adjacency and current owners.
///
/// Tiles live in an arena sorted by coordinate. Ownership is mirrored in an
/// owner-indexed set so that a region's tiles can be listed without a scan.
#[derive(Debug, Clone)]
pub struct TileGrid {
    geometry: GridGeometry,
    pub(super) tiles: Vec<Tile>,
    index: AHashMap<GridCoord, usize>,   // Map between coordinates and arena positions.
    pub(super) adjacency: Adjacency,     // Present neighbors only; fixed for the grid lifetime.
    pub(super) owners: OwnerSet,         // Tiles per owner slot (slot 0 = unowned).
    slots: AHashMap<RegionId, usize>,    // Map between region ids and owner slots.
    pub(super) snapshot: Vec<Option<RegionId>>, // Ownership at the last reset_edits().
}

impl TileGrid {
    /// Construct a grid from an arbitrary (possibly sparse) set of coordinates.
    pub fn new<I: IntoIterator<Item = GridCoord>>(geometry: GridGeometry, coords: I) -> Result<Self> {
        let mut coords = coords.into_iter().collect::<Vec<_>>();
        coords.sort_unstable();
        if let Some(pair) = coords.windows(2).find(|w| w[0] == w[1]) {
            return Err(TilegramError::DuplicateTile { coord: pair[0] });
        }
        Ok(Self::from_sorted(geometry, coords))
    }

    /// Construct a dense `cols` × `rows` grid starting at `(0, 0)`.
    pub fn rectangular(geometry: GridGeometry, cols: u32, rows: u32) -> Self {
        if cols == 0 || rows == 0 { return Self::from_sorted(geometry, Vec::new()) }
        let span = GridSpan {
            min: GridCoord::new(0, 0),
            max: GridCoord::new(cols as i32 - 1, rows as i32 - 1),
        };
        Self::from_span(geometry, &span)
    }

    /// Construct a dense grid whose tile centers cover `bounds`, padded by
    /// `margin` extra tiles on every side.
    pub fn covering(geometry: GridGeometry, bounds: &Rect<f64>, margin: u32) -> Self {
        let margin = margin as i32;
        match GridSpan::from_coords(geometry.covering(bounds)) {
            Some(span) => Self::from_span(geometry, &GridSpan {
                min: span.min.offset(-margin, -margin),
                max: span.max.offset(margin, margin),
            }),
            None => {
                let center = geometry.nearest(bounds.center());
                Self::from_span(geometry, &GridSpan {
                    min: center.offset(-margin, -margin),
                    max: center.offset(margin, margin),
                })
            }
        }
    }

    fn from_span(geometry: GridGeometry, span: &GridSpan) -> Self {
        let mut coords = span.iter().collect::<Vec<_>>();
        coords.sort_unstable();
        Self::from_sorted(geometry, coords)
    }

    /// Build from sorted, unique coordinates.
    fn from_sorted(geometry: GridGeometry, coords: Vec<GridCoord>) -> Self {
        let index = coords.iter().enumerate()
            .map(|(i, &c)| (c, i))
            .collect::<AHashMap<_, _>>();

        let edges = coords.iter()
            .map(|&c| {
                geometry.scheme().neighbors(c).into_iter()
                    .filter_map(|n| index.get(&n).map(|&i| i as u32))
                    .collect::<Vec<u32>>()
            })
            .collect::<Vec<_>>();

        Self {
            geometry,
            adjacency: Adjacency::new(&edges),
            owners: OwnerSet::new(coords.len()),
            snapshot: vec![None; coords.len()],
            tiles: coords.into_iter().map(Tile::new).collect(),
            index,
            slots: AHashMap::new(),
        }
    }

    /// Get the geometry used to place tiles in the plane.
    #[inline] pub fn geometry(&self) -> &GridGeometry { &self.geometry }

    #[inline] pub fn scheme(&self) -> Scheme { self.geometry.scheme() }

    /// Number of tiles in the grid.
    #[inline] pub fn len(&self) -> usize { self.tiles.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.tiles.is_empty() }

    #[inline] pub fn contains(&self, coord: GridCoord) -> bool { self.index.contains_key(&coord) }

    /// Number of adjacent tile pairs.
    #[inline] pub fn edge_count(&self) -> usize { self.adjacency.edge_count() / 2 }

    /// Get the tile at `coord`.
    #[inline]
    pub fn tile(&self, coord: GridCoord) -> Option<&Tile> {
        self.index.get(&coord).map(|&i| &self.tiles[i])
    }

    /// All tiles, in ascending coordinate order.
    #[inline] pub fn tiles(&self) -> impl Iterator<Item = &Tile> + '_ { self.tiles.iter() }

    #[inline] pub fn coords(&self) -> impl Iterator<Item = GridCoord> + '_ { self.tiles.iter().map(|t| t.coord) }

    /// Bounding span of every tile, or `None` for an empty grid.
    #[inline] pub fn span(&self) -> Option<GridSpan> { GridSpan::from_coords(self.coords()) }

    /// Get the owner of the tile at `coord`.
    #[inline]
    pub fn owner_of(&self, coord: GridCoord) -> Option<&RegionId> {
        self.tile(coord).and_then(|t| t.owner.as_ref())
    }

    /// Tiles currently owned by `id`, in no particular order.
    pub fn tiles_owned_by(&self, id: &RegionId) -> impl Iterator<Item = &Tile> + '_ {
        self.owned_indices(id).iter().map(move |&t| &self.tiles[t])
    }

    /// Number of tiles currently owned by `id`.
    #[inline] pub fn owned_count(&self, id: &RegionId) -> usize { self.owned_indices(id).len() }

    /// Number of tiles no region owns.
    #[inline] pub fn unowned_count(&self) -> usize { self.owners.get(0).len() }

    /// Regions owning at least one tile, in ascending id order.
    pub fn owner_ids(&self) -> Vec<RegionId> {
        let mut ids = self.slots.iter()
            .filter(|&(_, &slot)| !self.owners.get(slot).is_empty())
            .map(|(id, _)| id.clone())
            .collect::<Vec<_>>();
        ids.sort_unstable();
        ids
    }

    /// Geometric neighbors of `coord`; entries may be absent from the grid at its edges.
    #[inline]
    pub fn neighbors_of(&self, coord: GridCoord) -> SmallVec<[GridCoord; 6]> {
        self.scheme().neighbors(coord)
    }

    /// Neighbors of `coord` that are materialized in this grid.
    pub fn present_neighbors(&self, coord: GridCoord) -> Vec<GridCoord> {
        self.index.get(&coord)
            .map(|&t| self.adjacency.edges(t).map(|v| self.tiles[v].coord).collect())
            .unwrap_or_default()
    }

    /// Give an unowned tile to `id`. Fails without side effects if the tile is owned.
    pub fn claim(&mut self, coord: GridCoord, id: &RegionId) -> Result<()> {
        let t = self.tile_index(coord)?;
        if let Some(owner) = &self.tiles[t].owner {
            return Err(TilegramError::GridConflict { coord, owner: Some(owner.clone()), operation: "claim" });
        }

        let slot = self.slot_or_insert(id);
        self.owners.move_to(t, slot);
        let tile = &mut self.tiles[t];
        tile.owner = Some(id.clone());
        tile.version += 1;
        Ok(())
    }

    /// Mark an owned tile as unowned and return its previous owner.
    /// Fails without side effects if the tile is already unowned.
    pub fn release(&mut self, coord: GridCoord) -> Result<RegionId> {
        let t = self.tile_index(coord)?;
        let Some(owner) = self.tiles[t].owner.take() else {
            return Err(TilegramError::GridConflict { coord, owner: None, operation: "release" });
        };

        self.owners.move_to(t, 0);
        self.tiles[t].version += 1;
        Ok(owner)
    }

    /// Owned tiles of `id` with at least one neighbor that is unowned or owned by another region.
    pub fn boundary_tiles_of(&self, id: &RegionId) -> Vec<GridCoord> {
        let Some(slot) = self.slot(id) else { return Vec::new() };
        let mut boundary = self.owners.get(slot).iter()
            .filter(|&&t| self.adjacency.edges(t).any(|v| self.owners.find(v) != slot))
            .map(|&t| self.tiles[t].coord)
            .collect::<Vec<_>>();
        boundary.sort_unstable();
        boundary
    }

    /// Unowned tiles adjacent to the cluster of `id`, in ascending coordinate order.
    pub fn growth_candidates(&self, id: &RegionId) -> Vec<GridCoord> {
        let Some(slot) = self.slot(id) else { return Vec::new() };
        let mut candidates = self.owners.get(slot).iter()
            .flat_map(|&t| self.adjacency.edges(t))
            .filter(|&v| self.owners.find(v) == 0)
            .map(|v| self.tiles[v].coord)
            .collect::<Vec<_>>();
        candidates.sort_unstable();
        candidates.dedup();
        candidates
    }

    /// Unowned tiles anywhere in the grid, in ascending coordinate order.
    pub fn unowned_tiles(&self) -> Vec<GridCoord> {
        let mut coords = self.owners.get(0).iter().map(|&t| self.tiles[t].coord).collect::<Vec<_>>();
        coords.sort_unstable();
        coords
    }

    /// Release every tile. Versions still advance for tiles that were owned.
    pub fn clear_ownership(&mut self) {
        for tile in self.tiles.iter_mut().filter(|t| t.owner.is_some()) {
            tile.owner = None;
            tile.version += 1;
        }
        self.owners.clear();
    }

    /// Complete ownership mapping, coordinate → owner.
    pub fn ownership(&self) -> BTreeMap<GridCoord, Option<RegionId>> {
        self.tiles.iter().map(|t| (t.coord, t.owner.clone())).collect()
    }

    /// Replace all ownership at once. Tiles not listed become unowned.
    /// Fails without side effects on unknown or repeated coordinates.
    pub fn replace_ownership<I>(&mut self, ownership: I) -> Result<()>
    where
        I: IntoIterator<Item = (GridCoord, Option<RegionId>)>,
    {
        let mut assigned: Vec<Option<Option<RegionId>>> = vec![None; self.len()];
        for (coord, owner) in ownership {
            let t = self.tile_index(coord)?;
            if assigned[t].replace(owner).is_some() {
                return Err(TilegramError::DuplicateTile { coord });
            }
        }

        let mut slots = Vec::with_capacity(self.len());
        for (t, owner) in assigned.into_iter().enumerate() {
            let owner = owner.flatten();
            slots.push(owner.as_ref().map_or(0, |id| self.slot_or_insert(id)));
            let tile = &mut self.tiles[t];
            if tile.owner != owner {
                tile.owner = owner;
                tile.version += 1;
            }
        }
        self.owners.rebuild(&slots);
        Ok(())
    }

    /// Arena position of `coord`.
    #[inline]
    pub(crate) fn tile_index(&self, coord: GridCoord) -> Result<usize> {
        self.index.get(&coord).copied().ok_or(TilegramError::UnknownTile { coord })
    }

    #[inline] pub(super) fn slot(&self, id: &RegionId) -> Option<usize> { self.slots.get(id).copied() }

    #[inline]
    pub(super) fn owned_indices(&self, id: &RegionId) -> &[usize] {
        self.slot(id).map(|slot| self.owners.get(slot)).unwrap_or(&[])
    }

    fn slot_or_insert(&mut self, id: &RegionId) -> usize {
        if let Some(&slot) = self.slots.get(id) { return slot }
        let slot = self.owners.add_set();
        self.slots.insert(id.clone(), slot);
        slot
    }
}
