//! Conversion between metric values and tile counts.

use std::cmp::Ordering;

use ahash::AHashMap;

use crate::{error::{Result, TilegramError}, region::{Dataset, Region, RegionId}};

/// How per-region targets are reconciled with the overall tile budget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TargetPolicy {
    /// Round each region independently. The sum of targets drifts from the
    /// budget; the difference stays as unowned tiles.
    #[default]
    Rounded,
    /// Hamilton apportionment of `tile_budget()`: floor every quota, then hand
    /// the leftover tiles to the largest fractional remainders (ties by id).
    LargestRemainder,
}

/// Target tile count for every region of one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetCounts {
    counts: AHashMap<RegionId, usize>,
    total: usize,
    generation: u64,
    policy: TargetPolicy,
}

impl TargetCounts {
    /// Target for `id`, zero for regions outside the dataset.
    #[inline] pub fn get(&self, id: &RegionId) -> usize { self.counts.get(id).copied().unwrap_or(0) }

    /// Sum of all targets.
    #[inline] pub fn total(&self) -> usize { self.total }

    #[inline] pub fn len(&self) -> usize { self.counts.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.counts.is_empty() }
}

/// The metric-per-tile conversion factor and the sum of all metric values.
#[derive(Debug, Clone)]
pub struct MetricsBinding {
    metric_per_tile: f64,
    sum_metrics: f64,
    revision: u64,
    cached: Option<TargetCounts>,
}

impl MetricsBinding {
    pub fn new(metric_per_tile: f64, sum_metrics: f64) -> Result<Self> {
        check_metric_per_tile(metric_per_tile)?;
        check_metric("sum_metrics", sum_metrics)?;
        Ok(Self { metric_per_tile, sum_metrics, revision: 0, cached: None })
    }

    /// Bind a dataset so that its total metric spreads over roughly `tile_budget` tiles.
    pub fn for_dataset(dataset: &Dataset, tile_budget: usize) -> Result<Self> {
        for region in dataset.regions() {
            check_metric(region.id.as_str(), region.metric)?;
        }
        let sum = dataset.sum_metrics();
        let metric_per_tile = if sum > 0.0 && tile_budget > 0 { sum / tile_budget as f64 } else { 1.0 };
        Self::new(metric_per_tile, sum)
    }

    #[inline] pub fn metric_per_tile(&self) -> f64 { self.metric_per_tile }

    #[inline] pub fn sum_metrics(&self) -> f64 { self.sum_metrics }

    /// Counter bumped on every setter call; lets callers detect re-seeding.
    #[inline] pub fn revision(&self) -> u64 { self.revision }

    /// Approximate total number of tiles the metrics call for.
    #[inline] pub fn tile_budget(&self) -> usize { (self.sum_metrics / self.metric_per_tile).round() as usize }

    pub fn set_metric_per_tile(&mut self, value: f64) -> Result<()> {
        check_metric_per_tile(value)?;
        self.metric_per_tile = value;
        self.invalidate();
        Ok(())
    }

    pub fn set_sum_metrics(&mut self, value: f64) -> Result<()> {
        check_metric("sum_metrics", value)?;
        self.sum_metrics = value;
        self.invalidate();
        Ok(())
    }

    /// Drop cached targets and bump the revision.
    pub fn invalidate(&mut self) {
        self.revision += 1;
        self.cached = None;
    }

    /// Rounded target for a single region: `round(metric / metric_per_tile)`,
    /// at least one tile for any positive metric.
    pub fn target_tile_count(&self, region: &Region) -> Result<usize> {
        check_metric(region.id.as_str(), region.metric)?;
        if region.metric == 0.0 { return Ok(0) }
        Ok(((region.metric / self.metric_per_tile).round() as usize).max(1))
    }

    /// Targets for every region in `dataset`, cached until a setter runs or
    /// a different dataset or policy is requested.
    pub fn target_counts(&mut self, dataset: &Dataset, policy: TargetPolicy) -> Result<&TargetCounts> {
        let stale = self.cached.as_ref()
            .is_none_or(|t| t.generation != dataset.generation() || t.policy != policy);

        if stale {
            let counts = match policy {
                TargetPolicy::Rounded => self.rounded_counts(dataset)?,
                TargetPolicy::LargestRemainder => self.apportioned_counts(dataset)?,
            };
            let total = counts.values().sum();
            self.cached = Some(TargetCounts { counts, total, generation: dataset.generation(), policy });
        }

        self.cached.as_ref().ok_or_else(|| TilegramError::InvalidDataset("target cache unavailable".into()))
    }

    fn rounded_counts(&self, dataset: &Dataset) -> Result<AHashMap<RegionId, usize>> {
        dataset.regions().iter()
            .map(|region| Ok((region.id.clone(), self.target_tile_count(region)?)))
            .collect()
    }

    fn apportioned_counts(&self, dataset: &Dataset) -> Result<AHashMap<RegionId, usize>> {
        let budget = self.tile_budget();

        // (id, floor, remainder) per region; positive metrics keep at least one tile.
        let mut quotas = Vec::with_capacity(dataset.len());
        for region in dataset.iter_by_id() {
            check_metric(region.id.as_str(), region.metric)?;
            let quota = region.metric / self.metric_per_tile;
            let floor = quota.floor() as usize;
            let (floor, remainder) = match (region.metric > 0.0, floor) {
                (true, 0) => (1, 0.0),
                _ => (floor, quota - floor as f64),
            };
            quotas.push((&region.id, floor, remainder));
        }

        let assigned: usize = quotas.iter().map(|q| q.1).sum();
        let leftover = budget.saturating_sub(assigned).min(quotas.len());

        // Stable sort keeps id order among equal remainders.
        let mut order = (0..quotas.len()).collect::<Vec<_>>();
        order.sort_by(|&a, &b| quotas[b].2.partial_cmp(&quotas[a].2).unwrap_or(Ordering::Equal));
        for &i in order.iter().take(leftover) {
            if quotas[i].2 > 0.0 { quotas[i].1 += 1 }
        }

        Ok(quotas.into_iter().map(|(id, count, _)| (id.clone(), count)).collect())
    }
}

fn check_metric(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 { return Ok(()) }
    Err(TilegramError::InvalidMetric { name: name.to_string(), value })
}

fn check_metric_per_tile(value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 { return Ok(()) }
    Err(TilegramError::InvalidMetric { name: "metric_per_tile".to_string(), value })
}

#[cfg(test)]
mod tests {
    use geo::Coord;

    use super::*;

    fn dataset(metrics: &[(&str, f64)]) -> Dataset {
        let regions = metrics.iter()
            .map(|&(id, m)| Region::new(id, id, m, Coord { x: 0.0, y: 0.0 }))
            .collect();
        Dataset::new("test", "pop", regions).unwrap()
    }

    #[test]
    fn rounding_is_half_away_from_zero_with_minimum_one() {
        let metrics = MetricsBinding::new(100.0, 0.0).unwrap();
        let d = dataset(&[("A", 150.0), ("B", 149.0), ("C", 1.0), ("D", 0.0)]);
        let counts = d.regions().iter().map(|r| metrics.target_tile_count(r).unwrap()).collect::<Vec<_>>();
        assert_eq!(counts, vec![2, 1, 1, 0]);
    }

    #[test]
    fn negative_metrics_are_rejected() {
        let mut metrics = MetricsBinding::new(100.0, 0.0).unwrap();
        let d = dataset(&[("A", 10.0), ("B", -5.0)]);
        let err = metrics.target_counts(&d, TargetPolicy::Rounded).unwrap_err();
        assert_eq!(err, TilegramError::InvalidMetric { name: "B".into(), value: -5.0 });
    }

    #[test]
    fn setters_validate_and_invalidate() {
        let mut metrics = MetricsBinding::new(100.0, 400.0).unwrap();
        assert!(metrics.set_metric_per_tile(0.0).is_err());
        assert!(metrics.set_metric_per_tile(f64::NAN).is_err());
        assert!(metrics.set_sum_metrics(-1.0).is_err());
        assert_eq!(metrics.revision(), 0);

        let d = dataset(&[("A", 100.0), ("B", 300.0)]);
        assert_eq!(metrics.target_counts(&d, TargetPolicy::Rounded).unwrap().total(), 4);

        metrics.set_metric_per_tile(50.0).unwrap();
        assert_eq!(metrics.revision(), 1);
        let targets = metrics.target_counts(&d, TargetPolicy::Rounded).unwrap();
        assert_eq!(targets.get(&RegionId::new("A")), 2);
        assert_eq!(targets.get(&RegionId::new("B")), 6);
        assert_eq!(targets.get(&RegionId::new("Z")), 0);
    }

    #[test]
    fn for_dataset_spreads_sum_over_budget() {
        let d = dataset(&[("A", 100.0), ("B", 300.0)]);
        let metrics = MetricsBinding::for_dataset(&d, 8).unwrap();
        assert_eq!(metrics.metric_per_tile(), 50.0);
        assert_eq!(metrics.sum_metrics(), 400.0);
        assert_eq!(metrics.tile_budget(), 8);
    }

    #[test]
    fn largest_remainder_matches_budget() {
        // Quotas 3.4, 3.35, 3.25 on a budget of 10: plain rounding gives 9.
        let d = dataset(&[("A", 34.0), ("B", 33.5), ("C", 32.5)]);
        let mut metrics = MetricsBinding::new(10.0, 100.0).unwrap();
        assert_eq!(metrics.target_counts(&d, TargetPolicy::Rounded).unwrap().total(), 9);

        let targets = metrics.target_counts(&d, TargetPolicy::LargestRemainder).unwrap();
        assert_eq!(targets.total(), 10);
        assert_eq!(targets.get(&RegionId::new("A")), 4);
        assert_eq!(targets.get(&RegionId::new("B")), 3);
        assert_eq!(targets.get(&RegionId::new("C")), 3);
    }

    #[test]
    fn largest_remainder_keeps_small_regions() {
        let d = dataset(&[("A", 0.2), ("B", 9.8)]);
        let mut metrics = MetricsBinding::new(1.0, 10.0).unwrap();
        let targets = metrics.target_counts(&d, TargetPolicy::LargestRemainder).unwrap();
        assert_eq!(targets.get(&RegionId::new("A")), 1);
        assert_eq!(targets.get(&RegionId::new("B")), 9);
    }
}
