mod dataset;
mod region;
mod region_id;

pub use dataset::Dataset;
pub use region::Region;
pub use region_id::RegionId;
