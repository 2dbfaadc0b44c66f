use tilegeom::GridCoord;

use crate::region::RegionId;

/// One grid cell and its owner.
///
/// `version` grows by one on every ownership change, so observers can tell
/// that a tile was touched even when it ends up with its previous owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub coord: GridCoord,
    pub owner: Option<RegionId>,
    pub version: u32,
}

impl Tile {
    #[inline] pub(crate) fn new(coord: GridCoord) -> Self { Self { coord, owner: None, version: 0 } }

    #[inline] pub fn is_owned(&self) -> bool { self.owner.is_some() }

    #[inline] pub fn is_owned_by(&self, id: &RegionId) -> bool { self.owner.as_ref() == Some(id) }
}
