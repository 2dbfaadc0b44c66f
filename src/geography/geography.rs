use std::sync::Arc;

use ahash::AHashMap;
use anyhow::{Context, Result, ensure};
use geo::{BoundingRect, Centroid, Coord, MultiPolygon, Rect};
use log::{info, warn};
use tilegeom::{GridGeometry, Scheme};

use crate::{
    error::TilegramError,
    geography::geojson::read_features,
    grid::TileGrid,
    region::{Dataset, Region, RegionId},
};

/// One geographic unit: its shape and where the engine anchors it.
#[derive(Debug, Clone)]
pub struct GeoFeature {
    pub id: RegionId,
    pub name: Arc<str>,
    pub shape: MultiPolygon<f64>,
    pub centroid: Coord<f64>,
}

impl GeoFeature {
    /// Construct a feature, anchoring it at the centroid of its shape (or the
    /// center of its bounding box for degenerate shapes).
    pub fn new(id: impl Into<RegionId>, name: impl AsRef<str>, shape: MultiPolygon<f64>) -> Self {
        let centroid = shape.centroid().map(|p| p.0)
            .or_else(|| shape.bounding_rect().map(|r| r.center()))
            .unwrap_or(Coord { x: 0.0, y: 0.0 });
        Self { id: id.into(), name: Arc::from(name.as_ref()), shape, centroid }
    }
}

/// A named set of features in a common (screen-oriented) plane.
#[derive(Debug, Clone)]
pub struct Geography {
    name: String,
    features: Vec<GeoFeature>,
    index: AHashMap<RegionId, usize>,
    bounds: Rect<f64>,
}

impl Geography {
    /// Build a geography, rejecting empty input and duplicate ids.
    pub fn new(name: impl Into<String>, features: Vec<GeoFeature>) -> Result<Self> {
        let name = name.into();
        ensure!(!features.is_empty(), "[geography] Geography '{}' has no features", name);

        let mut index = AHashMap::with_capacity(features.len());
        for (i, feature) in features.iter().enumerate() {
            ensure!(index.insert(feature.id.clone(), i).is_none(),
                "[geography] Duplicate feature id '{}' in '{}'", feature.id, name);
        }

        let bounds = features.iter()
            .filter_map(|f| f.shape.bounding_rect())
            .reduce(|a, b| Rect::new(
                Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
            ))
            .with_context(|| format!("[geography] Geography '{}' has no coordinates", name))?;

        Ok(Self { name, features, index, bounds })
    }

    /// Load a geography from GeoJSON bytes.
    pub fn from_geojson(name: impl Into<String>, bytes: &[u8], id_key: &str, name_key: Option<&str>) -> Result<Self> {
        let geography = Self::new(name, read_features(bytes, id_key, name_key)?)?;
        info!("[geography] loaded '{}' with {} features", geography.name, geography.len());
        Ok(geography)
    }

    #[inline] pub fn name(&self) -> &str { &self.name }

    #[inline] pub fn features(&self) -> &[GeoFeature] { &self.features }

    #[inline] pub fn len(&self) -> usize { self.features.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.features.is_empty() }

    /// Bounding box of every feature.
    #[inline] pub fn bounds(&self) -> Rect<f64> { self.bounds }

    #[inline]
    pub fn get(&self, id: &RegionId) -> Option<&GeoFeature> {
        self.index.get(id).map(|&i| &self.features[i])
    }

    /// Tile size giving roughly `columns` tiles across the bounding box.
    pub fn tile_size_for_columns(&self, scheme: Scheme, columns: u32) -> f64 {
        let columns = columns.max(1) as f64;
        let width = self.bounds.width().max(self.bounds.height()).max(f64::EPSILON);
        match scheme {
            Scheme::Square => width / columns,
            Scheme::Hex => width / columns / 3f64.sqrt(),
        }
    }

    /// A dense grid covering the bounding box plus `margin` tiles on each side.
    pub fn grid(&self, scheme: Scheme, tile_size: f64, margin: u32) -> TileGrid {
        TileGrid::covering(GridGeometry::new(scheme, tile_size), &self.bounds, margin)
    }

    /// Join `(id, metric)` records onto the features.
    ///
    /// Records naming an unknown feature are rejected; features without a
    /// record get a zero metric.
    pub fn dataset<I>(&self, metric_name: &str, metrics: I) -> crate::error::Result<Dataset>
    where
        I: IntoIterator<Item = (RegionId, f64)>,
    {
        let mut values: AHashMap<RegionId, f64> = AHashMap::with_capacity(self.len());
        for (id, metric) in metrics {
            if !self.index.contains_key(&id) {
                return Err(TilegramError::InvalidDataset(format!("region '{}' is not in geography '{}'", id, self.name)));
            }
            if values.insert(id.clone(), metric).is_some() {
                return Err(TilegramError::InvalidDataset(format!("duplicate metric for region '{}'", id)));
            }
        }

        let missing = self.features.iter().filter(|f| !values.contains_key(&f.id)).count();
        if missing > 0 {
            warn!("[geography] {} feature(s) of '{}' have no '{}' value; using 0", missing, self.name, metric_name);
        }

        let regions = self.features.iter()
            .map(|f| Region::new(f.id.clone(), &*f.name, values.get(&f.id).copied().unwrap_or(0.0), f.centroid))
            .collect();
        Dataset::new(self.name.clone(), metric_name, regions)
    }
}
