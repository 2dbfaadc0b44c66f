use ahash::AHashSet;
use geo::Coord;
use log::{info, warn};
use serde_json::Value;
use tilegeom::{GridCoord, GridGeometry, Scheme};

use crate::{
    error::{Result, TilegramError},
    io::topojson::{TILES_OBJECT, model::{GeometryObject, TILEGRAM_VALUE, TilegramProperties, Topology, Transform}},
    region::{Dataset, RegionId},
};

/// A tilegram decoded from TopoJSON, ready to be placed on a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedTilegram {
    pub geometry: GridGeometry,
    pub metric_per_tile: f64,
    /// Every cell with its owner, in ascending coordinate order.
    pub tiles: Vec<(GridCoord, Option<RegionId>)>,
    pub geography: Option<String>,
    pub metric_name: Option<String>,
}

impl ImportedTilegram {
    #[inline] pub fn coords(&self) -> impl Iterator<Item = GridCoord> + '_ { self.tiles.iter().map(|(c, _)| *c) }

    /// Owned cells only.
    pub fn tagged(&self) -> impl Iterator<Item = (GridCoord, &RegionId)> + '_ {
        self.tiles.iter().filter_map(|(c, id)| id.as_ref().map(|id| (*c, id)))
    }
}

fn format_error(msg: impl Into<String>) -> TilegramError {
    TilegramError::ImportFormat(msg.into())
}

/// Decode a TopoJSON tilegram.
///
/// When `known` is given, every region tag must name one of its regions.
/// Nothing is partially applied: any problem yields `ImportFormat`.
pub fn read_topojson(bytes: &[u8], known: Option<&Dataset>) -> Result<ImportedTilegram> {
    let topology: Topology = serde_json::from_slice(bytes)
        .map_err(|e| format_error(format!("invalid TopoJSON: {}", e)))?;
    if topology.kind != "Topology" {
        return Err(format_error(format!("expected a Topology, found '{}'", topology.kind)));
    }

    let collection = match topology.objects.get(TILES_OBJECT) {
        Some(object) => object,
        None => {
            let (name, object) = topology.objects.iter().next()
                .ok_or_else(|| format_error("topology has no objects"))?;
            warn!("[io::topojson::read] no '{}' object, using '{}'", TILES_OBJECT, name);
            object
        }
    };
    if collection.kind.as_deref() != Some("GeometryCollection") {
        return Err(format_error("tiles object must be a GeometryCollection"));
    }

    let arcs = decode_arcs(&topology.arcs, topology.transform)?;

    // (ring vertices, tag, tilegramValue) per cell.
    let mut cells = Vec::with_capacity(collection.geometries.len());
    for (index, geometry) in collection.geometries.iter().enumerate() {
        match geometry.kind.as_deref() {
            Some("Polygon") => {}
            None => continue,
            Some(other) => return Err(format_error(format!("geometry {} has unsupported type '{}'", index, other))),
        }
        let ring = polygon_ring(geometry, &arcs)
            .map_err(|e| format_error(format!("geometry {}: {}", index, e)))?;
        let tag = geometry.id.as_ref().map(region_tag).transpose()
            .map_err(|e| format_error(format!("geometry {}: {}", index, e)))?;
        let value = geometry.properties.as_ref()
            .and_then(|p| p.get(TILEGRAM_VALUE))
            .and_then(Value::as_f64);
        cells.push((ring, tag, value));
    }
    let properties = topology.properties.unwrap_or_default();
    let geometry = grid_geometry(&properties, cells.first().map(|cell| cell.0.as_slice()))?;
    let metric_per_tile = metric_per_tile(&properties, &cells)?;

    let mut seen = AHashSet::with_capacity(cells.len());
    let mut tiles = Vec::with_capacity(cells.len());
    for (ring, tag, _) in cells {
        let coord = geometry.nearest(ring_center(&ring));
        if !seen.insert(coord) {
            return Err(format_error(format!("duplicate tile at {}", coord)));
        }
        if let (Some(dataset), Some(id)) = (known, &tag) {
            if !dataset.contains(id) {
                return Err(format_error(format!("unknown region '{}' at {}", id, coord)));
            }
        }
        tiles.push((coord, tag));
    }
    tiles.sort_unstable_by_key(|(coord, _)| *coord);

    info!("[io::topojson::read] imported {} tiles ({} owned)", tiles.len(),
        tiles.iter().filter(|(_, id)| id.is_some()).count());

    Ok(ImportedTilegram {
        geometry,
        metric_per_tile,
        tiles,
        geography: properties.tilegram_geography,
        metric_name: properties.tilegram_metric,
    })
}

/// Absolute arc positions, undoing quantization when a transform is present.
fn decode_arcs(arcs: &[Vec<Vec<f64>>], transform: Option<Transform>) -> Result<Vec<Vec<Coord<f64>>>> {
    arcs.iter().enumerate()
        .map(|(a, arc)| {
            let (mut x, mut y) = (0.0, 0.0);
            arc.iter()
                .map(|position| {
                    let &[px, py, ..] = position.as_slice() else {
                        return Err(format_error(format!("arc {} has a position with fewer than 2 values", a)));
                    };
                    Ok(match transform {
                        Some(t) => {
                            x += px;
                            y += py;
                            Coord { x: x * t.scale[0] + t.translate[0], y: y * t.scale[1] + t.translate[1] }
                        }
                        None => Coord { x: px, y: py },
                    })
                })
                .collect()
        })
        .collect()
}

/// Vertices of a Polygon's exterior ring, without the closing vertex.
fn polygon_ring(geometry: &GeometryObject, arcs: &[Vec<Coord<f64>>]) -> std::result::Result<Vec<Coord<f64>>, String> {
    let rings: Vec<Vec<i64>> = geometry.arcs.clone()
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| format!("invalid arcs: {}", e))?
        .unwrap_or_default();
    let exterior = rings.first().ok_or("polygon has no rings")?;

    let mut ring: Vec<Coord<f64>> = Vec::new();
    for &index in exterior {
        // Negative indices reference the reversed arc `!index`.
        let (arc, reversed) = if index >= 0 { (index as usize, false) } else { (!index as usize, true) };
        let arc = arcs.get(arc).ok_or_else(|| format!("arc {} out of range", index))?;

        let mut points = arc.clone();
        if reversed { points.reverse() }
        let skip = usize::from(!ring.is_empty());
        ring.extend(points.into_iter().skip(skip));
    }

    if ring.len() > 1 && ring.first() == ring.last() { ring.pop(); }
    if ring.len() < 3 {
        return Err("ring has fewer than 3 vertices".into());
    }
    Ok(ring)
}

fn region_tag(id: &Value) -> std::result::Result<RegionId, String> {
    match id {
        Value::String(s) => Ok(RegionId::new(s)),
        Value::Number(n) => Ok(RegionId::new(n.to_string())),
        other => Err(format!("region id must be a string or number, found {}", other)),
    }
}

#[inline]
fn ring_center(ring: &[Coord<f64>]) -> Coord<f64> {
    let n = ring.len() as f64;
    let (sx, sy) = ring.iter().fold((0.0, 0.0), |(sx, sy), c| (sx + c.x, sy + c.y));
    Coord { x: sx / n, y: sy / n }
}

/// Grid layout from the recorded properties, inferred from `sample` where missing.
/// Without a sample cell the layout must be fully recorded.
fn grid_geometry(properties: &TilegramProperties, sample: Option<&[Coord<f64>]>) -> Result<GridGeometry> {
    let no_cells = || format_error("tilegram has no cells and no recorded layout");

    let scheme = match properties.tilegram_scheme.as_deref() {
        Some(name) => Scheme::from_str(name)
            .ok_or_else(|| format_error(format!("unknown tile scheme '{}'", name)))?,
        None => {
            let scheme = if sample.ok_or_else(no_cells)?.len() == 4 { Scheme::Square } else { Scheme::Hex };
            warn!("[io::topojson::read] no tile scheme recorded, inferred {}", scheme.as_str());
            scheme
        }
    };
    if properties.tilegram_tile_size.is_none() && sample.is_none() {
        return Err(no_cells());
    }

    let (min, max) = sample.unwrap_or_default().iter().fold(
        (Coord { x: f64::INFINITY, y: f64::INFINITY }, Coord { x: f64::NEG_INFINITY, y: f64::NEG_INFINITY }),
        |(lo, hi), c| (Coord { x: lo.x.min(c.x), y: lo.y.min(c.y) }, Coord { x: hi.x.max(c.x), y: hi.y.max(c.y) }),
    );
    let tile_size = match (properties.tilegram_tile_size, scheme) {
        (Some(size), Scheme::Square) => size.width,
        (Some(size), Scheme::Hex) => size.height / 2.0,
        (None, Scheme::Square) => max.x - min.x,
        (None, Scheme::Hex) => (max.y - min.y) / 2.0,
    };
    if properties.tilegram_tile_size.is_none() {
        warn!("[io::topojson::read] no tile size recorded, inferred {}", tile_size);
    }
    if !(tile_size.is_finite() && tile_size > 0.0) {
        return Err(format_error(format!("invalid tile size {}", tile_size)));
    }

    let geometry = GridGeometry::new(scheme, tile_size);
    let origin = match (properties.tilegram_origin, sample) {
        (Some([x, y]), _) => Coord { x, y },
        (None, None) => geometry.origin(),
        (None, Some(sample)) => {
            // Anchor the grid on the sample cell.
            let center = ring_center(sample);
            let anchor = geometry.position(geometry.nearest(center));
            warn!("[io::topojson::read] no grid origin recorded, anchoring on the first cell");
            Coord { x: center.x - anchor.x, y: center.y - anchor.y }
        }
    };
    Ok(geometry.with_origin(origin))
}

fn metric_per_tile(properties: &TilegramProperties, cells: &[(Vec<Coord<f64>>, Option<RegionId>, Option<f64>)]) -> Result<f64> {
    let value = match properties.tilegram_metric_per_tile {
        Some(value) => value,
        None => {
            let value = cells.iter().find_map(|cell| cell.2)
                .ok_or_else(|| format_error("no metric per tile recorded"))?;
            warn!("[io::topojson::read] no top-level metric per tile, using cell value {}", value);
            value
        }
    };
    if !(value.is_finite() && value > 0.0) {
        return Err(format_error(format!("invalid metric per tile {}", value)));
    }
    Ok(value)
}
