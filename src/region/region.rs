use std::sync::Arc;

use geo::Coord;

use super::RegionId;

/// A geographic unit and its metric value.
///
/// The centroid lives in the same plane as the grid geometry, so distances
/// between tiles and centroids are meaningful.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub id: RegionId,
    pub name: Arc<str>,
    pub metric: f64,
    pub centroid: Coord<f64>,
}

impl Region {
    pub fn new(id: impl Into<RegionId>, name: impl AsRef<str>, metric: f64, centroid: Coord<f64>) -> Self {
        Self { id: id.into(), name: Arc::from(name.as_ref()), metric, centroid }
    }
}
