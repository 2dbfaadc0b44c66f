use smallvec::SmallVec;

use crate::coord::GridCoord;

/// Neighbor offsets for square tiles (right, down, left, up).
const SQUARE_OFFSETS: [(i32, i32); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

/// Neighbor offsets for hex tiles on even rows.
const HEX_EVEN_OFFSETS: [(i32, i32); 6] = [(1, 0), (0, -1), (-1, -1), (-1, 0), (-1, 1), (0, 1)];

/// Neighbor offsets for hex tiles on odd rows (shifted half a tile right).
const HEX_ODD_OFFSETS: [(i32, i32); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (0, 1), (1, 1)];

/// Tiling scheme of a grid. Chosen once when the grid is created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Scheme {
    Square,
    #[default]
    Hex,
}

impl Scheme {
    /// Number of neighbors of an interior tile.
    #[inline]
    pub const fn degree(self) -> usize {
        match self {
            Scheme::Square => 4,
            Scheme::Hex => 6,
        }
    }

    /// Neighbor offsets that apply to `coord`.
    #[inline]
    pub const fn offsets(self, coord: GridCoord) -> &'static [(i32, i32)] {
        match self {
            Scheme::Square => &SQUARE_OFFSETS,
            Scheme::Hex if coord.is_odd_row() => &HEX_ODD_OFFSETS,
            Scheme::Hex => &HEX_EVEN_OFFSETS,
        }
    }

    /// All geometric neighbors of `coord`, whether or not a grid materializes them.
    pub fn neighbors(self, coord: GridCoord) -> SmallVec<[GridCoord; 6]> {
        self.offsets(coord).iter().map(|&(dx, dy)| coord.offset(dx, dy)).collect()
    }

    /// Check whether `a` and `b` are adjacent under this scheme.
    pub fn are_adjacent(self, a: GridCoord, b: GridCoord) -> bool {
        self.offsets(a).iter().any(|&(dx, dy)| a.offset(dx, dy) == b)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Scheme::Square => "square",
            Scheme::Hex => "hex",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "square" => Some(Scheme::Square),
            "hex" | "hexagon" | "hexagonal" => Some(Scheme::Hex),
            _ => None,
        }
    }
}
