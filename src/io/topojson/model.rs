use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(super) struct Topology {
    #[serde(rename = "type")]
    pub(super) kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) transform: Option<Transform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) properties: Option<TilegramProperties>,
    pub(super) objects: BTreeMap<String, GeometryObject>,
    #[serde(default)]
    pub(super) arcs: Vec<Vec<Vec<f64>>>,
}

/// Quantization transform; positions in quantized arcs are delta-encoded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub(super) struct Transform {
    pub(super) scale: [f64; 2],
    pub(super) translate: [f64; 2],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(super) struct GeometryObject {
    #[serde(rename = "type")]
    pub(super) kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) arcs: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(super) geometries: Vec<GeometryObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) properties: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub(super) struct TileSize {
    pub(super) width: f64,
    pub(super) height: f64,
}

/// Grid layout recorded at the top level of an exported tilegram.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct TilegramProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) tilegram_metric_per_tile: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) tilegram_tile_size: Option<TileSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) tilegram_scheme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) tilegram_origin: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) tilegram_geography: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) tilegram_metric: Option<String>,
}

/// Per-cell property holding the metric per tile.
pub(super) const TILEGRAM_VALUE: &str = "tilegramValue";
