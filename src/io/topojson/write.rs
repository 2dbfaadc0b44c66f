use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde_json::{Map, Value, json};

use crate::{
    grid::TileGrid,
    io::topojson::{TILES_OBJECT, model::{GeometryObject, TILEGRAM_VALUE, TileSize, TilegramProperties, Topology}},
    region::Dataset,
};

/// Encode the grid's ownership as a TopoJSON tilegram.
///
/// Cells are placed with the grid's own geometry, one arc per cell. `dataset`
/// only contributes the geography and metric names.
pub fn write_topojson(grid: &TileGrid, metric_per_tile: f64, dataset: Option<&Dataset>) -> Result<String> {
    let geometry = grid.geometry();

    let mut arcs = Vec::with_capacity(grid.len());
    let mut geometries = Vec::with_capacity(grid.len());
    for (index, tile) in grid.tiles().enumerate() {
        let ring = geometry.polygon(tile.coord).exterior().coords()
            .map(|c| vec![c.x, c.y])
            .collect::<Vec<_>>();
        arcs.push(ring);

        let properties = tile.owner.as_ref().map(|_| {
            let mut properties = Map::new();
            properties.insert(TILEGRAM_VALUE.to_string(), json!(metric_per_tile));
            properties
        });
        geometries.push(GeometryObject {
            kind: Some("Polygon".to_string()),
            id: tile.owner.as_ref().map(|id| Value::String(id.to_string())),
            arcs: Some(json!([[index]])),
            geometries: Vec::new(),
            properties,
        });
    }

    let collection = GeometryObject {
        kind: Some("GeometryCollection".to_string()),
        id: None,
        arcs: None,
        geometries,
        properties: None,
    };

    let origin = geometry.origin();
    let topology = Topology {
        kind: "Topology".to_string(),
        transform: None,
        properties: Some(TilegramProperties {
            tilegram_metric_per_tile: Some(metric_per_tile),
            tilegram_tile_size: Some(TileSize { width: geometry.tile_width(), height: geometry.tile_height() }),
            tilegram_scheme: Some(geometry.scheme().as_str().to_string()),
            tilegram_origin: Some([origin.x, origin.y]),
            tilegram_geography: dataset.map(|d| d.geography().to_string()),
            tilegram_metric: dataset.map(|d| d.metric_name().to_string()),
        }),
        objects: BTreeMap::from([(TILES_OBJECT.to_string(), collection)]),
        arcs,
    };

    serde_json::to_string(&topology).context("[io::topojson::write] Failed to serialize TopoJSON")
}

#[cfg(test)]
mod tests {
    use tilegeom::{GridCoord, GridGeometry, Scheme};

    use super::*;
    use crate::{io::topojson::read_topojson, region::RegionId};

    #[test]
    fn export_reimports_identically() {
        for scheme in [Scheme::Square, Scheme::Hex] {
            let geometry = GridGeometry::new(scheme, 7.5).with_origin(geo::Coord { x: -3.0, y: 11.0 });
            let mut grid = TileGrid::rectangular(geometry, 4, 3);
            grid.claim(GridCoord::new(1, 1), &RegionId::new("A")).unwrap();
            grid.claim(GridCoord::new(2, 1), &RegionId::new("A")).unwrap();
            grid.claim(GridCoord::new(3, 2), &RegionId::new("B")).unwrap();

            let json = write_topojson(&grid, 250.0, None).unwrap();
            let imported = read_topojson(json.as_bytes(), None).unwrap();

            assert_eq!(imported.metric_per_tile, 250.0);
            assert_eq!(imported.geometry.scheme(), scheme);
            assert_eq!(imported.geometry.origin(), geometry.origin());
            assert!((imported.geometry.tile_size() - 7.5).abs() < 1e-9);
            assert_eq!(imported.tiles, grid.ownership().into_iter().collect::<Vec<_>>());
        }
    }

    #[test]
    fn empty_grid_reimports_empty() {
        let geometry = GridGeometry::new(Scheme::Square, 2.0).with_origin(geo::Coord { x: 1.0, y: 1.0 });
        let grid = TileGrid::new(geometry, std::iter::empty()).unwrap();

        let imported = read_topojson(write_topojson(&grid, 40.0, None).unwrap().as_bytes(), None).unwrap();
        assert!(imported.tiles.is_empty());
        assert_eq!(imported.metric_per_tile, 40.0);
        assert_eq!(imported.geometry, geometry);
    }

    #[test]
    fn unowned_cells_have_no_tag() {
        let mut grid = TileGrid::rectangular(GridGeometry::new(Scheme::Hex, 1.0), 2, 1);
        grid.claim(GridCoord::new(0, 0), &RegionId::new("A")).unwrap();

        let value: Value = serde_json::from_str(&write_topojson(&grid, 1.0, None).unwrap()).unwrap();
        let cells = value["objects"]["tiles"]["geometries"].as_array().unwrap();
        assert_eq!(cells[0]["id"], "A");
        assert_eq!(cells[0]["properties"]["tilegramValue"], 1.0);
        assert!(cells[1].get("id").is_none());
        assert_eq!(value["properties"]["tilegramScheme"], "hex");
    }
}
