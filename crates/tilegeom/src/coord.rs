use std::fmt;

/// Integer cell address on a tile grid.
///
/// For hex grids the address uses the "odd-r" offset layout: `y` is the row,
/// `x` the column, and odd rows sit half a tile to the right.
/// Ordering is lexicographic on `(x, y)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
}

impl GridCoord {
    #[inline] pub const fn new(x: i32, y: i32) -> Self { Self { x, y } }

    /// Offset this coordinate by `(dx, dy)`.
    #[inline] pub const fn offset(self, dx: i32, dy: i32) -> Self { Self { x: self.x + dx, y: self.y + dy } }

    /// True when this coordinate lies on an odd row.
    #[inline] pub const fn is_odd_row(self) -> bool { self.y & 1 == 1 }
}

impl From<(i32, i32)> for GridCoord {
    fn from((x, y): (i32, i32)) -> Self { Self { x, y } }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Inclusive bounding box of a set of grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpan {
    pub min: GridCoord,
    pub max: GridCoord,
}

impl GridSpan {
    /// Smallest span containing every coordinate, or `None` for an empty input.
    pub fn from_coords<I: IntoIterator<Item = GridCoord>>(coords: I) -> Option<Self> {
        coords.into_iter().fold(None, |span, c| match span {
            None => Some(Self { min: c, max: c }),
            Some(Self { min, max }) => Some(Self {
                min: GridCoord::new(min.x.min(c.x), min.y.min(c.y)),
                max: GridCoord::new(max.x.max(c.x), max.y.max(c.y)),
            }),
        })
    }

    #[inline] pub const fn cols(&self) -> u32 { (self.max.x - self.min.x + 1) as u32 }

    #[inline] pub const fn rows(&self) -> u32 { (self.max.y - self.min.y + 1) as u32 }

    #[inline]
    pub const fn contains(&self, c: GridCoord) -> bool {
        c.x >= self.min.x && c.x <= self.max.x && c.y >= self.min.y && c.y <= self.max.y
    }

    /// Iterate every coordinate in the span, row by row.
    pub fn iter(&self) -> impl Iterator<Item = GridCoord> + '_ {
        (self.min.y..=self.max.y).flat_map(move |y| (self.min.x..=self.max.x).map(move |x| GridCoord::new(x, y)))
    }
}
