mod adjacency;
mod contiguity;
mod edits;
mod owner_set;
mod tile;
mod tile_grid;

use adjacency::Adjacency;
use owner_set::OwnerSet;
pub use tile::Tile;
pub use tile_grid::TileGrid;
