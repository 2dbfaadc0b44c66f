use std::fmt;

use tilegeom::GridCoord;

use crate::region::RegionId;

/// Errors raised by the tile grid, metrics binding and import boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum TilegramError {
    /// A claim hit an owned tile, or a release hit an unowned one.
    /// Nothing was changed; callers should try a different tile.
    GridConflict {
        coord: GridCoord,
        owner: Option<RegionId>,
        operation: &'static str,
    },
    /// The coordinate is not materialized in this grid.
    UnknownTile { coord: GridCoord },
    /// Two tiles were declared at the same coordinate.
    DuplicateTile { coord: GridCoord },
    /// A metric value that would corrupt target-count computation.
    InvalidMetric { name: String, value: f64 },
    /// A dataset that violates its own invariants (duplicate ids, unknown regions, ...).
    InvalidDataset(String),
    /// A serialized tilegram that cannot be imported. The previous grid is untouched.
    ImportFormat(String),
}

impl fmt::Display for TilegramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GridConflict { coord, owner: Some(owner), operation } => {
                write!(f, "Grid conflict: cannot {operation} tile {coord}, owned by '{owner}'")
            }
            Self::GridConflict { coord, owner: None, operation } => {
                write!(f, "Grid conflict: cannot {operation} tile {coord}, tile is unowned")
            }
            Self::UnknownTile { coord } => write!(f, "Tile {coord} is not part of the grid"),
            Self::DuplicateTile { coord } => write!(f, "Tile {coord} is declared more than once"),
            Self::InvalidMetric { name, value } => write!(f, "Invalid metric '{name}' = {value}"),
            Self::InvalidDataset(reason) => write!(f, "Invalid dataset: {reason}"),
            Self::ImportFormat(reason) => write!(f, "Invalid tilegram document: {reason}"),
        }
    }
}

impl std::error::Error for TilegramError {}

impl TilegramError {
    /// Check whether this error is a claim/release conflict.
    #[inline] pub fn is_conflict(&self) -> bool { matches!(self, Self::GridConflict { .. }) }
}

pub type Result<T> = std::result::Result<T, TilegramError>;
