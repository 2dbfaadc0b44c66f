//! TopoJSON tilegram reading and writing.
//!
//! A tilegram is a `Topology` whose `tiles` object is a GeometryCollection of
//! Polygon cells. Owned cells carry the region id as `id` and the metric per
//! tile as `properties.tilegramValue`; unowned cells carry neither. The grid
//! layout is recorded in the topology's own `properties`.

mod model;
mod read;
mod write;

pub use read::{ImportedTilegram, read_topojson};
pub use write::write_topojson;

/// Name of the GeometryCollection holding the cells.
pub const TILES_OBJECT: &str = "tiles";
