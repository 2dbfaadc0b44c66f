//! SVG rendering of tilegrams.

mod color;
mod outline;
mod render;
mod writer;

pub(crate) use color::*;
pub(crate) use outline::*;
pub(crate) use render::*;
pub(crate) use writer::*;
