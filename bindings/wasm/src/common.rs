use anyhow::{Result, anyhow};
use serde::Serialize;
use wasm_bindgen::JsValue;

pub(crate) fn js_err(e: impl ToString) -> JsValue {
    JsValue::from_str(&e.to_string())
}

pub(crate) fn parse_scheme(scheme: Option<String>) -> Result<tilegram::Scheme> {
    let scheme = scheme.as_deref().unwrap_or("hex");
    tilegram::Scheme::from_str(scheme)
        .ok_or_else(|| anyhow!("Unknown scheme {:?}. Expected one of: hex, square", scheme))
}

/// Status as handed to JavaScript.
#[derive(Serialize)]
pub(crate) struct JsStatus {
    pub(crate) state: &'static str,
    pub(crate) unsatisfiable: Vec<String>,
    pub(crate) steps: u64,
    pub(crate) unsaved_edits: bool,
}

impl JsStatus {
    pub(crate) fn new(inner: &tilegram::Tilegram) -> Self {
        let (state, unsatisfiable) = match inner.status() {
            tilegram::Status::Active => ("active", Vec::new()),
            tilegram::Status::Converged => ("converged", Vec::new()),
            tilegram::Status::Unsatisfiable(ids) => ("unsatisfiable", ids.iter().map(|id| id.to_string()).collect()),
        };
        Self { state, unsatisfiable, steps: inner.engine().steps(), unsaved_edits: inner.has_unsaved_edits() }
    }
}

/// One tile in view coordinates, for canvas drawing and hit testing.
#[derive(Serialize)]
pub(crate) struct JsTile {
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) cx: f64,
    pub(crate) cy: f64,
    pub(crate) region: Option<String>,
}
