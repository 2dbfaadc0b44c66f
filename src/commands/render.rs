use anyhow::{Context, Result, ensure};
use log::info;

use crate::{
    GridGeometry, TileGrid, Viewport,
    cli::{Cli, RenderArgs},
    io::{fs::{assert_not_stdout, write_atomic}, svg::render_svg, topojson::read_topojson},
};

pub fn run(_cli: &Cli, args: &RenderArgs) -> Result<()> {
    assert_not_stdout(&args.output)?;

    let bytes = std::fs::read(&args.tilegram)
        .with_context(|| format!("[render] Failed to read {}", args.tilegram.display()))?;
    let imported = read_topojson(&bytes, None)?;

    let mut grid = TileGrid::new(imported.geometry, imported.coords())?;
    grid.replace_ownership(imported.tiles.iter().cloned())?;

    ensure!(args.width > 0.0 && args.height > 0.0, "[render] width and height must be positive");
    let viewport = Viewport::new(args.width, args.height);
    let mut view: GridGeometry = *grid.geometry();
    if let Some(span) = grid.span() { view.fit(&span, viewport) }

    info!("[render] {} tiles -> {}", grid.len(), args.output.display());
    write_atomic(&args.output, render_svg(&grid, &view, viewport, None)?.as_bytes(), args.force)?;
    println!("Wrote SVG -> {}", args.output.display());
    Ok(())
}
