//! Region outline tracing for SVG rendering.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use anyhow::{Result, anyhow};
use geo::{Coord, LineString, Polygon};

/// Quantization scale for view coordinates (pixels).
const Q_SCALE: f64 = 1e4;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub(crate) struct QuantizedPoint(pub i64, pub i64);

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub(crate) struct Segment(pub QuantizedPoint, pub QuantizedPoint); // undirected: stored with canonical (min,max) endpoint order

#[derive(Default, Clone)]
pub(crate) struct SegmentSet(pub BTreeSet<Segment>); // ordered, so tracing is reproducible

#[inline]
pub(crate) fn qpt(c: &Coord<f64>) -> QuantizedPoint {
    QuantizedPoint((c.x * Q_SCALE).round() as i64, (c.y * Q_SCALE).round() as i64)
}

#[inline]
pub(crate) fn seg_norm(a: QuantizedPoint, b: QuantizedPoint) -> Segment {
    if a <= b { Segment(a, b) } else { Segment(b, a) }
}

/// Boundary of the union of `tiles`: edges used by exactly one tile.
pub(crate) fn collect_boundary<'a, I>(tiles: I, ptmap: &mut HashMap<QuantizedPoint, Coord<f64>>) -> SegmentSet
where
    I: IntoIterator<Item = &'a Polygon<f64>>,
{
    let mut set = SegmentSet::default();
    for tile in tiles {
        toggle_ring_segments(tile.exterior(), &mut set, ptmap);
    }
    set
}

/// Toggle every segment of a closed ring: shared edges cancel out.
fn toggle_ring_segments(ring: &LineString<f64>, set: &mut SegmentSet, ptmap: &mut HashMap<QuantizedPoint, Coord<f64>>) {
    for line in ring.lines() {
        let (qa, qb) = (qpt(&line.start), qpt(&line.end));
        if qa == qb { continue }
        let segment = seg_norm(qa, qb);
        if !set.0.remove(&segment) { set.0.insert(segment); }
        ptmap.entry(qa).or_insert(line.start);
        ptmap.entry(qb).or_insert(line.end);
    }
}

/// Turn a set of undirected boundary segments into closed rings (list of coords).
pub(crate) fn polygonize_rings(boundary: &SegmentSet, ptmap: &HashMap<QuantizedPoint, Coord<f64>>) -> Result<Vec<Vec<Coord<f64>>>> {
    // adjacency (multi-graph): QPt -> multiset of neighbors
    let mut adj: BTreeMap<QuantizedPoint, Vec<QuantizedPoint>> = BTreeMap::new();
    for &Segment(a, b) in &boundary.0 {
        adj.entry(a).or_default().push(b);
        adj.entry(b).or_default().push(a);
    }

    // Helper to remove one undirected edge (a<->b)
    let remove_edge = |a: QuantizedPoint, b: QuantizedPoint, adj: &mut BTreeMap<QuantizedPoint, Vec<QuantizedPoint>>| {
        for (from, to) in [(a, b), (b, a)] {
            if let Some(v) = adj.get_mut(&from) {
                if let Some(pos) = v.iter().position(|&x| x == to) { v.remove(pos); }
            }
        }
    };

    // Rings start from the lowest remaining point.
    let nodes = adj.keys().copied().collect::<Vec<_>>();

    let mut rings: Vec<Vec<Coord<f64>>> = Vec::new();
    while let Some(&start) = nodes.iter().find(|&&n| adj.get(&n).is_some_and(|v| !v.is_empty())) {
        let mut ring_q = vec![start];
        let mut prev = start;
        let mut curr = start;

        // Follow edges until we close the loop
        loop {
            let v = adj.get(&curr).ok_or_else(|| anyhow!("[io::svg::outline] Broken adjacency"))?;
            if v.is_empty() { break }

            // Prefer continuing direction (avoid going back)
            let next = v.iter().copied().find(|&u| u != prev).unwrap_or(v[0]);
            remove_edge(curr, next, &mut adj);
            if next == start { break }

            ring_q.push(next);
            prev = curr;
            curr = next;
        }

        let ring = ring_q.into_iter()
            .map(|q| ptmap.get(&q).copied().ok_or_else(|| anyhow!("[io::svg::outline] Missing point for {:?}", q)))
            .collect::<Result<Vec<_>>>()?;
        if ring.len() >= 3 { rings.push(ring) }
    }

    Ok(rings)
}

/// Outline rings of the union of `tiles`.
pub(crate) fn outline_rings<'a, I>(tiles: I) -> Result<Vec<Vec<Coord<f64>>>>
where
    I: IntoIterator<Item = &'a Polygon<f64>>,
{
    let mut ptmap = HashMap::new();
    let boundary = collect_boundary(tiles, &mut ptmap);
    polygonize_rings(&boundary, &ptmap)
}

#[cfg(test)]
mod tests {
    use tilegeom::{GridCoord, GridGeometry, Scheme};

    use super::*;

    #[test]
    fn adjacent_squares_merge_into_one_ring() {
        let geometry = GridGeometry::new(Scheme::Square, 10.0);
        let tiles = [geometry.polygon(GridCoord::new(0, 0)), geometry.polygon(GridCoord::new(1, 0))];
        let rings = outline_rings(&tiles).unwrap();
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].len(), 6);
    }

    #[test]
    fn tracing_is_reproducible() {
        // Two squares touching at a corner: the pinch point has four boundary edges.
        let geometry = GridGeometry::new(Scheme::Square, 10.0);
        let tiles = [
            geometry.polygon(GridCoord::new(0, 0)),
            geometry.polygon(GridCoord::new(1, 1)),
            geometry.polygon(GridCoord::new(3, 0)),
        ];
        let first = outline_rings(&tiles).unwrap();
        for _ in 0..20 {
            assert_eq!(outline_rings(&tiles).unwrap(), first);
        }

        // Each ring starts at its lowest point, and rings come in start order.
        let starts = first.iter().map(|r| qpt(&r[0])).collect::<Vec<_>>();
        assert!(starts.windows(2).all(|w| w[0] < w[1]));
        for ring in &first {
            assert!(ring.iter().all(|c| qpt(c) >= qpt(&ring[0])));
        }
    }

    #[test]
    fn separate_hexes_give_separate_rings() {
        let geometry = GridGeometry::new(Scheme::Hex, 10.0);
        let tiles = [geometry.polygon(GridCoord::new(0, 0)), geometry.polygon(GridCoord::new(4, 0))];
        let rings = outline_rings(&tiles).unwrap();
        assert_eq!(rings.len(), 2);
        assert!(rings.iter().all(|r| r.len() == 6));
    }
}
