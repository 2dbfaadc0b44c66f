pub mod coord;
pub mod geometry;
pub mod scheme;

pub use coord::{GridCoord, GridSpan};
pub use geometry::{GridGeometry, Viewport};
pub use scheme::Scheme;
