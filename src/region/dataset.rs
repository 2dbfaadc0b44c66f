use std::{collections::BTreeMap, sync::atomic::{AtomicU64, Ordering}};

use ahash::AHashMap;
use geo::Coord;
use tilegeom::GridGeometry;

use crate::{error::{Result, TilegramError}, region::{Region, RegionId}};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// An ordered, immutable collection of regions for one geography.
#[derive(Debug, Clone)]
pub struct Dataset {
    geography: String,
    metric_name: String,
    regions: Vec<Region>,
    index: AHashMap<RegionId, usize>, // Map between region ids and positions in `regions`.
    by_id: Vec<usize>,                // Positions of `regions` sorted by id.
    generation: u64,
}

impl Dataset {
    /// Build a dataset, rejecting duplicate region ids.
    pub fn new(geography: impl Into<String>, metric_name: impl Into<String>, regions: Vec<Region>) -> Result<Self> {
        let mut index = AHashMap::with_capacity(regions.len());
        for (i, region) in regions.iter().enumerate() {
            if index.insert(region.id.clone(), i).is_some() {
                return Err(TilegramError::InvalidDataset(format!("duplicate region id '{}'", region.id)));
            }
        }

        let mut by_id = (0..regions.len()).collect::<Vec<_>>();
        by_id.sort_by(|&a, &b| regions[a].id.cmp(&regions[b].id));

        Ok(Self {
            geography: geography.into(),
            metric_name: metric_name.into(),
            regions,
            index,
            by_id,
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
        })
    }

    /// Rebuild a dataset from tile ownership (used after importing a tilegram).
    ///
    /// Each region's metric is its tile count times `metric_per_tile`, and its
    /// centroid is the mean position of its tiles. Names are taken from `known`
    /// when it has the region, otherwise the id doubles as the name.
    pub fn from_tiles<'a, I>(geography: impl Into<String>, tiles: I, geometry: &GridGeometry, metric_per_tile: f64, known: Option<&Dataset>) -> Result<Self>
    where
        I: IntoIterator<Item = (tilegeom::GridCoord, &'a RegionId)>,
    {
        let mut sums: BTreeMap<&RegionId, (usize, f64, f64)> = BTreeMap::new();
        for (coord, owner) in tiles {
            let p = geometry.position(coord);
            let entry = sums.entry(owner).or_insert((0, 0.0, 0.0));
            entry.0 += 1;
            entry.1 += p.x;
            entry.2 += p.y;
        }

        let metric_name = known.map_or("tiles", |d| d.metric_name()).to_string();
        let regions = sums.into_iter()
            .map(|(id, (count, sx, sy))| {
                let name = known.and_then(|d| d.get(id)).map_or(id.as_str(), |r| &*r.name);
                let centroid = Coord { x: sx / count as f64, y: sy / count as f64 };
                Region::new(id.clone(), name, count as f64 * metric_per_tile, centroid)
            })
            .collect();

        Self::new(geography, metric_name, regions)
    }

    #[inline] pub fn geography(&self) -> &str { &self.geography }

    #[inline] pub fn metric_name(&self) -> &str { &self.metric_name }

    /// Regions in their original order.
    #[inline] pub fn regions(&self) -> &[Region] { &self.regions }

    #[inline] pub fn len(&self) -> usize { self.regions.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.regions.is_empty() }

    #[inline] pub fn contains(&self, id: &RegionId) -> bool { self.index.contains_key(id) }

    /// Unique identity of this dataset, distinct for every dataset built.
    #[inline] pub fn generation(&self) -> u64 { self.generation }

    /// Look up a region by id.
    #[inline]
    pub fn get(&self, id: &RegionId) -> Option<&Region> {
        self.index.get(id).map(|&i| &self.regions[i])
    }

    /// Regions in ascending id order (the engine's processing order).
    pub fn iter_by_id(&self) -> impl Iterator<Item = &Region> + '_ {
        self.by_id.iter().map(|&i| &self.regions[i])
    }

    /// Sum of all region metrics.
    pub fn sum_metrics(&self) -> f64 {
        self.regions.iter().map(|r| r.metric).sum()
    }
}
