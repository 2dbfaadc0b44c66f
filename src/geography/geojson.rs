use anyhow::{Context, Result, anyhow, bail, ensure};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::Value;

use crate::geography::GeoFeature;

/// Parse a GeoJSON FeatureCollection of Polygon/MultiPolygon features.
///
/// `id_key` names the property holding the region id (falling back to the
/// feature's top-level `id`); `name_key` the display name. The y axis is
/// flipped so that north is up in screen coordinates.
pub(crate) fn read_features(bytes: &[u8], id_key: &str, name_key: Option<&str>) -> Result<Vec<GeoFeature>> {
    let value: Value = serde_json::from_slice(bytes).context("[geography::geojson] Failed to parse GeoJSON bytes")?;
    ensure!(value["type"].as_str() == Some("FeatureCollection"),
        "[geography::geojson] Expected a FeatureCollection, found {}", value["type"]);

    let features = value["features"].as_array()
        .ok_or_else(|| anyhow!("[geography::geojson] FeatureCollection is missing 'features'"))?;

    let mut result = Vec::with_capacity(features.len());
    for (index, feature) in features.iter().enumerate() {
        let properties = &feature["properties"];
        let id = property_string(&properties[id_key])
            .or_else(|| property_string(&feature["id"]))
            .ok_or_else(|| anyhow!("[geography::geojson] Feature {} has no '{}' property", index, id_key))?;
        let name = name_key.and_then(|key| property_string(&properties[key]));

        let shape = parse_geometry(&feature["geometry"])
            .with_context(|| format!("[geography::geojson] Invalid geometry for feature '{}'", id))?;

        result.push(GeoFeature::new(id.as_str(), name.as_deref().unwrap_or(&id), shape));
    }
    Ok(result)
}

/// Read a string or number property as a string.
fn property_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_geometry(geometry: &Value) -> Result<MultiPolygon<f64>> {
    let coords = geometry["coordinates"].as_array()
        .ok_or_else(|| anyhow!("missing coordinates"))?;

    match geometry["type"].as_str() {
        Some("Polygon") => Ok(MultiPolygon(vec![parse_polygon(coords)?])),
        Some("MultiPolygon") => coords.iter()
            .map(|polygon| polygon.as_array()
                .ok_or_else(|| anyhow!("polygon must be an array"))
                .and_then(|rings| parse_polygon(rings)))
            .collect::<Result<Vec<_>>>()
            .map(MultiPolygon),
        other => bail!("unsupported geometry type {:?}", other),
    }
}

/// Parse `[exterior, hole, hole, ...]`.
fn parse_polygon(rings: &[Value]) -> Result<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| {
        ring.as_array()
            .ok_or_else(|| anyhow!("ring must be an array"))
            .and_then(|points| parse_ring(points))
    });

    let exterior = rings.next().ok_or_else(|| anyhow!("polygon is missing its exterior ring"))??;
    let interiors = rings.collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

/// Parse `[[x, y], ...]`, flipping y and closing the ring.
fn parse_ring(points: &[Value]) -> Result<LineString<f64>> {
    let mut coords = points.iter()
        .map(|point| {
            let x = point[0].as_f64().ok_or_else(|| anyhow!("x must be a number"))?;
            let y = point[1].as_f64().ok_or_else(|| anyhow!("y must be a number"))?;
            Ok(Coord { x, y: -y })
        })
        .collect::<Result<Vec<_>>>()?;

    if let (Some(&first), Some(&last)) = (coords.first(), coords.last()) {
        if first != last { coords.push(first) }
    }
    Ok(LineString(coords))
}
