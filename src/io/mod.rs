//! File formats: metric CSVs, TopoJSON tilegrams and SVG renderings.

pub(crate) mod csv;
pub(crate) mod fs;
pub(crate) mod svg;
pub mod topojson;
