use wasm_bindgen::{JsValue, prelude::wasm_bindgen};

use tilegram::{Coord, EngineConfig, Geography, GridCoord, RegionId, Tilegram};

use crate::common::*;

#[wasm_bindgen]
pub struct WasmTilegram {
    inner: Tilegram,
    geography: Geography, // kept for dataset switches
}

#[wasm_bindgen]
impl WasmTilegram {
    /// Build a session from GeoJSON text and `id,metric` CSV text.
    #[wasm_bindgen(constructor)]
    pub fn new(geojson: String, csv: String, id_key: Option<String>, scheme: Option<String>) -> Result<WasmTilegram, JsValue> {
        let scheme = parse_scheme(scheme).map_err(js_err)?;
        let id_key = id_key.as_deref().unwrap_or("id");
        let geography = Geography::from_geojson("geography", geojson.as_bytes(), id_key, Some("name")).map_err(js_err)?;

        let (metric_name, records) = tilegram::read_metrics_csv(csv.as_bytes()).map_err(js_err)?;
        let dataset = geography.dataset(&metric_name, records).map_err(js_err)?;
        let inner = Tilegram::from_geography(&geography, dataset, scheme, tilegram::DEFAULT_COLUMNS,
            tilegram::DEFAULT_TILE_BUDGET, EngineConfig::default()).map_err(js_err)?;

        Ok(WasmTilegram { inner, geography })
    }

    /// Advance one step. Returns the status object.
    pub fn iterate(&mut self) -> Result<JsValue, JsValue> {
        self.inner.iterate().map_err(js_err)?;
        self.status()
    }

    /// Status object: `{ state, unsatisfiable, steps, unsaved_edits }`.
    pub fn status(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&JsStatus::new(&self.inner)).map_err(|e| e.into())
    }

    /// Switch to another metric CSV over the same geography.
    pub fn select_dataset_csv(&mut self, csv: String) -> Result<(), JsValue> {
        let (metric_name, records) = tilegram::read_metrics_csv(csv.as_bytes()).map_err(js_err)?;
        let dataset = self.geography.dataset(&metric_name, records).map_err(js_err)?;
        self.inner.select_dataset(dataset).map_err(js_err)
    }

    pub fn metric_per_tile(&self) -> f64 {
        self.inner.metrics().metric_per_tile()
    }

    /// Returns false when ignored (an imported tilegram is displayed).
    pub fn set_resolution(&mut self, metric_per_tile: f64) -> Result<bool, JsValue> {
        self.inner.set_resolution(metric_per_tile).map_err(js_err)
    }

    pub fn resume(&mut self) {
        self.inner.resume()
    }

    pub fn claim(&mut self, x: i32, y: i32, region: String) -> Result<(), JsValue> {
        self.inner.claim(GridCoord::new(x, y), &RegionId::new(region)).map_err(js_err)
    }

    /// Release a tile; returns its previous owner.
    pub fn release(&mut self, x: i32, y: i32) -> Result<String, JsValue> {
        self.inner.release(GridCoord::new(x, y)).map(|id| id.to_string()).map_err(js_err)
    }

    pub fn has_unsaved_edits(&self) -> bool {
        self.inner.has_unsaved_edits()
    }

    pub fn reset_edits(&mut self) {
        self.inner.reset_edits()
    }

    /// Grid coordinate under a view-space point, as `[x, y]`, if the grid has it.
    pub fn tile_at(&self, px: f64, py: f64) -> Option<Vec<i32>> {
        let coord = self.inner.view().nearest(Coord { x: px, y: py });
        self.inner.grid().contains(coord).then(|| vec![coord.x, coord.y])
    }

    /// Every tile with its view-space center and owner.
    pub fn tiles(&self) -> Result<JsValue, JsValue> {
        let view = self.inner.view();
        let tiles = self.inner.grid().tiles()
            .map(|t| {
                let c = view.position(t.coord);
                JsTile { x: t.coord.x, y: t.coord.y, cx: c.x, cy: c.y, region: t.owner.as_ref().map(|id| id.to_string()) }
            })
            .collect::<Vec<_>>();
        serde_wasm_bindgen::to_value(&tiles).map_err(|e| e.into())
    }

    /// Import a tilegram. Region tags must be features of this session's geography.
    pub fn import_topojson(&mut self, text: String) -> Result<(), JsValue> {
        self.inner.import_topojson(text.as_bytes()).map_err(js_err)
    }

    pub fn export_topojson(&self) -> Result<String, JsValue> {
        self.inner.export_topojson().map_err(js_err)
    }

    pub fn resize(&mut self, width: f64, height: f64) -> Result<(), JsValue> {
        self.inner.resize(width, height).map_err(js_err)
    }

    pub fn to_svg(&self) -> Result<String, JsValue> {
        self.inner.to_svg().map_err(js_err)
    }
}
