use geo::{Coord, LineString, Polygon, Rect};

use crate::{coord::{GridCoord, GridSpan}, scheme::Scheme};

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Viewport dimensions in plane units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[inline] pub const fn new(width: f64, height: f64) -> Self { Self { width, height } }
}

/// Maps grid coordinates to plane positions for one tiling scheme.
///
/// `tile_size` is the edge length of a square tile, or the circumradius of a
/// pointy-top hexagon. `origin` is the plane position of cell `(0, 0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    scheme: Scheme,
    tile_size: f64,
    origin: Coord<f64>,
}

impl GridGeometry {
    /// Construct a geometry with its origin at `(0, 0)`.
    pub fn new(scheme: Scheme, tile_size: f64) -> Self {
        assert!(tile_size.is_finite() && tile_size > 0.0, "tile_size must be positive and finite");
        Self { scheme, tile_size, origin: Coord { x: 0.0, y: 0.0 } }
    }

    /// Replace the plane position of cell `(0, 0)`.
    pub fn with_origin(mut self, origin: Coord<f64>) -> Self {
        self.origin = origin;
        self
    }

    #[inline] pub fn scheme(&self) -> Scheme { self.scheme }

    #[inline] pub fn tile_size(&self) -> f64 { self.tile_size }

    #[inline] pub fn origin(&self) -> Coord<f64> { self.origin }

    /// Horizontal extent of one tile.
    #[inline]
    pub fn tile_width(&self) -> f64 {
        match self.scheme {
            Scheme::Square => self.tile_size,
            Scheme::Hex => SQRT_3 * self.tile_size,
        }
    }

    /// Vertical extent of one tile.
    #[inline]
    pub fn tile_height(&self) -> f64 {
        match self.scheme {
            Scheme::Square => self.tile_size,
            Scheme::Hex => 2.0 * self.tile_size,
        }
    }

    /// Plane position of the center of `coord`.
    pub fn position(&self, coord: GridCoord) -> Coord<f64> {
        let (x, y) = unit_position(self.scheme, coord);
        Coord { x: self.origin.x + x * self.tile_size, y: self.origin.y + y * self.tile_size }
    }

    /// Grid coordinate whose tile contains `point`.
    pub fn nearest(&self, point: Coord<f64>) -> GridCoord {
        let px = (point.x - self.origin.x) / self.tile_size;
        let py = (point.y - self.origin.y) / self.tile_size;

        match self.scheme {
            Scheme::Square => GridCoord::new(px.round() as i32, py.round() as i32),
            Scheme::Hex => {
                // Fractional axial coordinates, then cube rounding.
                let q = SQRT_3 / 3.0 * px - py / 3.0;
                let r = 2.0 / 3.0 * py;
                let (q, r) = cube_round(q, r);
                GridCoord::new(q + (r - (r & 1)) / 2, r)
            }
        }
    }

    /// Euclidean distance between the center of `coord` and `point`.
    #[inline]
    pub fn distance(&self, coord: GridCoord, point: Coord<f64>) -> f64 {
        let p = self.position(coord);
        (p.x - point.x).hypot(p.y - point.y)
    }

    /// Closed outline of the tile at `coord`.
    pub fn polygon(&self, coord: GridCoord) -> Polygon<f64> {
        let c = self.position(coord);
        let s = self.tile_size;
        let mut ring: Vec<Coord<f64>> = match self.scheme {
            Scheme::Square => {
                let h = s / 2.0;
                vec![
                    Coord { x: c.x - h, y: c.y - h },
                    Coord { x: c.x + h, y: c.y - h },
                    Coord { x: c.x + h, y: c.y + h },
                    Coord { x: c.x - h, y: c.y + h },
                ]
            }
            Scheme::Hex => {
                let w = SQRT_3 * s / 2.0;
                vec![
                    Coord { x: c.x, y: c.y - s },
                    Coord { x: c.x + w, y: c.y - s / 2.0 },
                    Coord { x: c.x + w, y: c.y + s / 2.0 },
                    Coord { x: c.x, y: c.y + s },
                    Coord { x: c.x - w, y: c.y + s / 2.0 },
                    Coord { x: c.x - w, y: c.y - s / 2.0 },
                ]
            }
        };
        ring.push(ring[0]);
        Polygon::new(LineString::from(ring), vec![])
    }

    /// Plane bounding box of every tile in `span`.
    pub fn bounds(&self, span: &GridSpan) -> Rect<f64> {
        let (left, top, width, height) = unit_extent(self.scheme, span);
        let min = Coord { x: self.origin.x + left * self.tile_size, y: self.origin.y + top * self.tile_size };
        let max = Coord { x: min.x + width * self.tile_size, y: min.y + height * self.tile_size };
        Rect::new(min, max)
    }

    /// Coordinates whose tile centers fall inside `rect`.
    pub fn covering(&self, rect: &Rect<f64>) -> Vec<GridCoord> {
        let (lo, hi) = (self.nearest(rect.min()), self.nearest(rect.max()));
        let span = GridSpan {
            min: GridCoord::new(lo.x - 1, lo.y - 1),
            max: GridCoord::new(hi.x + 1, hi.y + 1),
        };
        span.iter()
            .filter(|&c| {
                let p = self.position(c);
                p.x >= rect.min().x && p.x <= rect.max().x && p.y >= rect.min().y && p.y <= rect.max().y
            })
            .collect()
    }

    /// Rescale and recenter so every tile in `span` fits inside `viewport`.
    ///
    /// The tile aspect ratio is unchanged; the grid is centered on the axis
    /// with slack.
    pub fn fit(&mut self, span: &GridSpan, viewport: Viewport) {
        assert!(viewport.width > 0.0 && viewport.height > 0.0, "viewport must have positive dimensions");

        let (left, top, width, height) = unit_extent(self.scheme, span);
        let size = (viewport.width / width).min(viewport.height / height);

        let slack_x = (viewport.width - width * size) / 2.0;
        let slack_y = (viewport.height - height * size) / 2.0;

        self.tile_size = size;
        self.origin = Coord { x: slack_x - left * size, y: slack_y - top * size };
    }
}

/// Center of `coord` for a unit tile size and zero origin.
#[inline]
fn unit_position(scheme: Scheme, coord: GridCoord) -> (f64, f64) {
    match scheme {
        Scheme::Square => (coord.x as f64, coord.y as f64),
        Scheme::Hex => {
            let shift = if coord.is_odd_row() { 0.5 } else { 0.0 };
            (SQRT_3 * (coord.x as f64 + shift), 1.5 * coord.y as f64)
        }
    }
}

/// `(left, top, width, height)` of `span` for a unit tile size and zero origin.
///
/// Hex spans are measured as if both row parities were present.
fn unit_extent(scheme: Scheme, span: &GridSpan) -> (f64, f64, f64, f64) {
    let (cols, rows) = (span.cols() as f64, span.rows() as f64);
    match scheme {
        Scheme::Square => (span.min.x as f64 - 0.5, span.min.y as f64 - 0.5, cols, rows),
        Scheme::Hex => (
            SQRT_3 * (span.min.x as f64 - 0.5),
            1.5 * span.min.y as f64 - 1.0,
            SQRT_3 * (cols + 0.5),
            1.5 * (rows - 1.0) + 2.0,
        ),
    }
}

/// Round fractional axial coordinates `(q, r)` to the containing hex.
fn cube_round(q: f64, r: f64) -> (i32, i32) {
    let s = -q - r;
    let (mut rq, mut rr, rs) = (q.round(), r.round(), s.round());
    let (dq, dr, ds) = ((rq - q).abs(), (rr - r).abs(), (rs - s).abs());

    if dq > dr && dq > ds {
        rq = -rr - rs;
    } else if dr > ds {
        rr = -rq - rs;
    }

    (rq as i32, rr as i32)
}
