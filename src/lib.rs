#![doc = "Tilegram public API"]
mod cartogram;
mod error;
mod geography;
mod grid;
mod io;
mod metrics;
mod region;
mod tilegram;

pub mod cli;
pub mod commands;

#[doc(inline)]
pub use cartogram::{COMPUTE_FPS, Cartogram, DEFAULT_GRACE_STEPS, EngineConfig, RegionState, Status};

#[doc(inline)]
pub use error::{Result, TilegramError};

#[doc(inline)]
pub use geography::{GeoFeature, Geography};

#[doc(inline)]
pub use grid::{Tile, TileGrid};

#[doc(inline)]
pub use io::topojson::{ImportedTilegram, read_topojson, write_topojson};

#[doc(inline)]
pub use metrics::{MetricsBinding, TargetCounts, TargetPolicy};

#[doc(inline)]
pub use region::{Dataset, Region, RegionId};

#[doc(inline)]
pub use tilegram::{DEFAULT_COLUMNS, DEFAULT_TILE_BUDGET, DEFAULT_VIEWPORT, Mode, Tilegram};

#[doc(inline)]
pub use geo::Coord;

#[doc(inline)]
pub use tilegeom::{GridCoord, GridGeometry, GridSpan, Scheme, Viewport};

/// Read `(id, metric)` records from CSV bytes. Returns the metric column name
/// alongside the records.
pub fn read_metrics_csv(bytes: &[u8]) -> anyhow::Result<(String, Vec<(RegionId, f64)>)> {
    io::csv::read_metrics(io::csv::read_csv_bytes(bytes)?)
}

/// Render a grid to SVG with `view` geometry.
pub fn render_svg(grid: &TileGrid, view: &GridGeometry, viewport: Viewport, dataset: Option<&Dataset>) -> anyhow::Result<String> {
    io::svg::render_svg(grid, view, viewport, dataset)
}
