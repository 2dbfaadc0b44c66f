use std::fs;

use tilegram::{
    Dataset, EngineConfig, Geography, Mode, RegionId, Scheme, Status, Tilegram, TilegramError, read_metrics_csv,
    read_topojson,
};

/// Four 2x2 squares in a row, west to east.
const STATES: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        { "type": "Feature", "properties": { "id": "01", "name": "One" },
          "geometry": { "type": "Polygon", "coordinates": [[[0,0],[2,0],[2,2],[0,2],[0,0]]] } },
        { "type": "Feature", "properties": { "id": "02", "name": "Two" },
          "geometry": { "type": "Polygon", "coordinates": [[[2,0],[4,0],[4,2],[2,2],[2,0]]] } },
        { "type": "Feature", "properties": { "id": "03", "name": "Three" },
          "geometry": { "type": "Polygon", "coordinates": [[[4,0],[6,0],[6,2],[4,2],[4,0]]] } },
        { "type": "Feature", "properties": { "id": "04", "name": "Four" },
          "geometry": { "type": "Polygon", "coordinates": [[[6,0],[8,0],[8,2],[6,2],[6,0]]] } }
    ]
}"#;

const POPULATION: &str = "id,population\n01,400\n02,100\n03,200\n04,300\n";

fn session(scheme: Scheme) -> Tilegram {
    let geography = Geography::from_geojson("states", STATES.as_bytes(), "id", Some("name")).unwrap();
    let (metric, records) = read_metrics_csv(POPULATION.as_bytes()).unwrap();
    let dataset = geography.dataset(&metric, records).unwrap();
    Tilegram::from_geography(&geography, dataset, scheme, 16, 20, EngineConfig::default()).unwrap()
}

#[test]
fn generated_tilegram_survives_export_and_import() {
    for scheme in [Scheme::Hex, Scheme::Square] {
        let mut t = session(scheme);
        assert_eq!(t.run(1_000).unwrap(), Status::Converged, "{:?}", scheme);

        let json = t.export_topojson().unwrap();
        let imported = read_topojson(json.as_bytes(), Some(t.dataset())).unwrap();
        assert_eq!(imported.metric_per_tile, t.metrics().metric_per_tile());
        assert_eq!(imported.geography.as_deref(), Some("states"));
        assert_eq!(imported.metric_name.as_deref(), Some("population"));
        assert_eq!(imported.tiles, t.grid().ownership().into_iter().collect::<Vec<_>>());

        // Re-importing into a fresh session reproduces ownership and targets.
        let mut other = session(scheme);
        other.import_topojson(json.as_bytes()).unwrap();
        assert_eq!(other.mode(), Mode::Imported);
        assert_eq!(other.grid().ownership(), t.grid().ownership());
        assert_eq!(other.metrics().metric_per_tile(), t.metrics().metric_per_tile());
        assert_eq!(&*other.dataset().get(&RegionId::new("01")).unwrap().name, "One");
        assert!(!other.has_unsaved_edits());
    }
}

#[test]
fn regions_keep_their_west_to_east_order() {
    let mut t = session(Scheme::Square);
    t.run(1_000).unwrap();

    let mean_x = |id: &str| {
        let tiles = t.grid().tiles_owned_by(&RegionId::new(id)).map(|tile| tile.coord.x as f64).collect::<Vec<_>>();
        tiles.iter().sum::<f64>() / tiles.len() as f64
    };
    assert!(mean_x("01") < mean_x("02"));
    assert!(mean_x("02") < mean_x("03"));
    assert!(mean_x("03") < mean_x("04"));
}

#[test]
fn imported_tilegram_from_another_grid_replaces_the_layout() {
    let mut hex = session(Scheme::Hex);
    hex.run(1_000).unwrap();
    let json = hex.export_topojson().unwrap();

    let mut square = session(Scheme::Square);
    square.import_topojson(json.as_bytes()).unwrap();
    assert_eq!(square.grid().scheme(), Scheme::Hex);
    assert_eq!(square.grid().len(), hex.grid().len());

    // Resuming keeps the imported tiles converged.
    square.resume();
    assert_eq!(square.run(10).unwrap(), Status::Converged);
    assert_eq!(square.grid().ownership(), hex.grid().ownership());
}

#[test]
fn export_writes_through_the_filesystem() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("states.topo.json");

    let mut t = session(Scheme::Hex);
    t.run(1_000).unwrap();
    fs::write(&path, t.export_topojson().unwrap()).unwrap();

    let imported = read_topojson(&fs::read(&path).unwrap(), None).unwrap();
    let dataset = Dataset::from_tiles("states", imported.tagged(), &imported.geometry, imported.metric_per_tile, None).unwrap();
    assert_eq!(dataset.len(), 4);
    assert_eq!(dataset.sum_metrics(), imported.tagged().count() as f64 * imported.metric_per_tile);
}

#[test]
fn svg_reflects_the_view_size() {
    let mut t = session(Scheme::Hex);
    t.run(1_000).unwrap();
    t.resize(640.0, 480.0).unwrap();

    let svg = t.to_svg().unwrap();
    assert!(svg.contains(r#"width="640""#));
    assert_eq!(svg.matches(r#"class="outline""#).count(), 4);
}

#[test]
fn tilegram_of_another_geography_is_rejected() {
    let counties = STATES.replace(r#""id": "0"#, r#""id": "9"#);
    let geography = Geography::from_geojson("counties", counties.as_bytes(), "id", Some("name")).unwrap();
    let (metric, records) = read_metrics_csv(POPULATION.replace("\n0", "\n9").as_bytes()).unwrap();
    let dataset = geography.dataset(&metric, records).unwrap();
    let mut counties = Tilegram::from_geography(&geography, dataset, Scheme::Hex, 16, 20, EngineConfig::default()).unwrap();
    counties.run(1_000).unwrap();
    let json = counties.export_topojson().unwrap();

    let mut states = session(Scheme::Hex);
    states.run(1_000).unwrap();
    let before = states.grid().ownership();

    let err = states.import_topojson(json.as_bytes()).unwrap_err();
    assert!(matches!(err, TilegramError::ImportFormat(_)), "{}", err);
    assert_eq!(states.grid().ownership(), before);
    assert_eq!(states.mode(), Mode::Computing);
    assert!(states.dataset().contains(&RegionId::new("01")));
}
