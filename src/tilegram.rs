use anyhow::ensure;
use log::info;
use tilegeom::{GridCoord, GridGeometry, Scheme, Viewport};

use crate::{
    cartogram::{Cartogram, EngineConfig, Status},
    error::{Result, TilegramError},
    geography::Geography,
    grid::TileGrid,
    io::{svg::render_svg, topojson::{ImportedTilegram, read_topojson, write_topojson}},
    metrics::MetricsBinding,
    region::{Dataset, RegionId},
};

/// Viewport used until the first `resize`.
pub const DEFAULT_VIEWPORT: Viewport = Viewport::new(960.0, 720.0);

/// Tiles across the longer side of a geography's bounding box.
pub const DEFAULT_COLUMNS: u32 = 40;

/// Tiles the default resolution spreads the total metric over.
pub const DEFAULT_TILE_BUDGET: usize = 500;

/// Whether the session is computing a cartogram or displaying an imported one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Computing,
    /// Resolution changes are ignored until `resume`.
    Imported,
}

/// An interactive tilegram: one dataset on one grid, driven step by step.
///
/// The grid keeps its own geometry as the model frame (used for distances
/// and export). Drawing goes through a separate view geometry refit by
/// [`Tilegram::resize`].
#[derive(Debug, Clone)]
pub struct Tilegram {
    dataset: Dataset,
    source: Dataset, // Regions imports may tag. Survives imports, replaced by select_dataset.
    grid: TileGrid,
    metrics: MetricsBinding,
    engine: Cartogram,
    view: GridGeometry,
    viewport: Viewport,
    mode: Mode,
    status: Status,
}

impl Tilegram {
    pub fn new(dataset: Dataset, grid: TileGrid, metrics: MetricsBinding, config: EngineConfig) -> Self {
        let mut tilegram = Self {
            source: dataset.clone(),
            dataset,
            view: *grid.geometry(),
            grid,
            metrics,
            engine: Cartogram::new(config),
            viewport: DEFAULT_VIEWPORT,
            mode: Mode::Computing,
            status: Status::Active,
        };
        tilegram.refit();
        tilegram
    }

    /// Session over a dense grid covering `geography`, spreading the dataset's
    /// total metric over roughly `tile_budget` tiles.
    pub fn from_geography(geography: &Geography, dataset: Dataset, scheme: Scheme, columns: u32, tile_budget: usize, config: EngineConfig) -> Result<Self> {
        let tile_size = geography.tile_size_for_columns(scheme, columns);
        let grid = geography.grid(scheme, tile_size, 1);
        let metrics = MetricsBinding::for_dataset(&dataset, tile_budget)?;
        info!("[tilegram] {} grid of {} tiles, {} per tile", scheme.as_str(), grid.len(), metrics.metric_per_tile());
        Ok(Self::new(dataset, grid, metrics, config))
    }

    #[inline] pub fn dataset(&self) -> &Dataset { &self.dataset }

    #[inline] pub fn grid(&self) -> &TileGrid { &self.grid }

    #[inline] pub fn metrics(&self) -> &MetricsBinding { &self.metrics }

    #[inline] pub fn engine(&self) -> &Cartogram { &self.engine }

    #[inline] pub fn mode(&self) -> Mode { self.mode }

    /// Status returned by the last step (or set by the last import).
    #[inline] pub fn status(&self) -> &Status { &self.status }

    #[inline] pub fn view(&self) -> &GridGeometry { &self.view }

    #[inline] pub fn viewport(&self) -> Viewport { self.viewport }

    /// Switch to a new dataset, keeping the tile budget. Ownership is cleared
    /// and computation restarts.
    pub fn select_dataset(&mut self, dataset: Dataset) -> Result<()> {
        let metrics = MetricsBinding::for_dataset(&dataset, self.metrics.tile_budget())?;

        self.grid.clear_ownership();
        self.grid.reset_edits();
        self.engine.reset();
        self.metrics = metrics;
        self.source = dataset.clone();
        self.dataset = dataset;
        self.mode = Mode::Computing;
        self.status = Status::Active;
        info!("[tilegram] selected dataset '{}' ({} regions)", self.dataset.metric_name(), self.dataset.len());
        Ok(())
    }

    /// Change the metric per tile. Ignored (returns false) while an imported
    /// tilegram is displayed.
    pub fn set_resolution(&mut self, metric_per_tile: f64) -> Result<bool> {
        if self.mode == Mode::Imported {
            info!("[tilegram] resolution change ignored for an imported tilegram");
            return Ok(false);
        }
        self.metrics.set_metric_per_tile(metric_per_tile)?;
        self.status = Status::Active;
        Ok(true)
    }

    /// Leave imported mode and continue computing from the current ownership.
    pub fn resume(&mut self) {
        self.mode = Mode::Computing;
        self.status = Status::Active;
    }

    /// Advance the computation by one step. Ownership is snapshotted whenever
    /// the step ends in a terminal status.
    pub fn iterate(&mut self) -> Result<Status> {
        if self.mode == Mode::Imported { return Ok(self.status.clone()) }

        let status = self.engine.iterate(&mut self.grid, &self.dataset, &mut self.metrics)?;
        if status.is_done() { self.grid.reset_edits() }
        self.status = status.clone();
        Ok(status)
    }

    /// Iterate until a terminal status or `max_steps` steps.
    pub fn run(&mut self, max_steps: usize) -> Result<Status> {
        for _ in 0..max_steps {
            let status = self.iterate()?;
            if status.is_done() { return Ok(status) }
        }
        Ok(self.status.clone())
    }

    /// Hand an unowned tile to a region of the current dataset.
    pub fn claim(&mut self, coord: GridCoord, id: &RegionId) -> Result<()> {
        if !self.dataset.contains(id) {
            return Err(TilegramError::InvalidDataset(format!("unknown region '{}'", id)));
        }
        self.grid.claim(coord, id)?;
        self.status = Status::Active;
        Ok(())
    }

    /// Release an owned tile, returning its previous owner.
    pub fn release(&mut self, coord: GridCoord) -> Result<RegionId> {
        let owner = self.grid.release(coord)?;
        self.status = Status::Active;
        Ok(owner)
    }

    #[inline] pub fn has_unsaved_edits(&self) -> bool { self.grid.has_unsaved_edits() }

    #[inline] pub fn reset_edits(&mut self) { self.grid.reset_edits() }

    /// Replace the session with a TopoJSON tilegram.
    ///
    /// Every region tag must name a region of the dataset the session was
    /// built over (or last switched to). The dataset is rebuilt from the tiles
    /// with names kept from that dataset, and the grid is reused when the
    /// layout matches. On error the session is unchanged.
    pub fn import_topojson(&mut self, bytes: &[u8]) -> Result<()> {
        let imported = read_topojson(bytes, Some(&self.source))?;

        let mut grid = match self.matches_layout(&imported) {
            true => self.grid.clone(),
            false => TileGrid::new(imported.geometry, imported.coords())
                .map_err(|e| TilegramError::ImportFormat(e.to_string()))?,
        };
        grid.replace_ownership(imported.tiles.iter().cloned())?;
        grid.reset_edits();

        let geography = imported.geography.clone().unwrap_or_else(|| self.source.geography().to_string());
        let dataset = Dataset::from_tiles(geography, imported.tagged(), &imported.geometry, imported.metric_per_tile, Some(&self.source))?;
        let metrics = MetricsBinding::new(imported.metric_per_tile, dataset.sum_metrics())?;

        info!("[tilegram] imported {} tiles for {} regions", grid.len(), dataset.len());
        self.grid = grid;
        self.dataset = dataset;
        self.metrics = metrics;
        self.engine.reset();
        self.mode = Mode::Imported;
        self.status = Status::Converged;
        self.refit();
        Ok(())
    }

    /// Export the current ownership as a TopoJSON tilegram.
    pub fn export_topojson(&self) -> anyhow::Result<String> {
        write_topojson(&self.grid, self.metrics.metric_per_tile(), Some(&self.dataset))
    }

    /// Refit the view geometry so the whole grid fits `width` × `height`.
    pub fn resize(&mut self, width: f64, height: f64) -> anyhow::Result<()> {
        ensure!(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0,
            "[tilegram::resize] viewport must be positive, got {}x{}", width, height);
        self.viewport = Viewport::new(width, height);
        self.refit();
        Ok(())
    }

    /// Render the grid with the view geometry.
    pub fn to_svg(&self) -> anyhow::Result<String> {
        render_svg(&self.grid, &self.view, self.viewport, Some(&self.dataset))
    }

    fn refit(&mut self) {
        self.view = *self.grid.geometry();
        if let Some(span) = self.grid.span() {
            self.view.fit(&span, self.viewport);
        }
    }

    /// Check if `imported` lays out exactly the tiles of the current grid.
    fn matches_layout(&self, imported: &ImportedTilegram) -> bool {
        let (a, b) = (self.grid.geometry(), &imported.geometry);
        let close = |x: f64, y: f64| (x - y).abs() <= 1e-9 * x.abs().max(y.abs()).max(1.0);

        a.scheme() == b.scheme()
            && close(a.tile_size(), b.tile_size())
            && close(a.origin().x, b.origin().x)
            && close(a.origin().y, b.origin().y)
            && self.grid.len() == imported.tiles.len()
            && self.grid.coords().eq(imported.coords())
    }
}
