mod geography;
mod geojson;

pub use geography::{GeoFeature, Geography};
