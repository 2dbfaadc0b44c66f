//! Tilegram rendering.

use ahash::AHashMap;
use anyhow::Result;
use tilegeom::{GridGeometry, Viewport};

use crate::{
    grid::TileGrid,
    io::svg::{SvgStringWriter, UNOWNED_FILL, escape_attr, golden_angle_color, outline_rings},
    region::{Dataset, RegionId},
};

/// Render the grid into an SVG document of `viewport` size.
///
/// Tiles are drawn with `view` (not the grid's own geometry) so a session can
/// resize the drawing without touching the model. Regions are colored by
/// their rank in `dataset` (or among the grid's owners) and outlined.
pub(crate) fn render_svg(grid: &TileGrid, view: &GridGeometry, viewport: Viewport, dataset: Option<&Dataset>) -> Result<String> {
    let order: Vec<RegionId> = match dataset {
        Some(d) => d.iter_by_id().map(|r| r.id.clone()).collect(),
        None => grid.owner_ids(),
    };
    let rank = order.iter().enumerate().map(|(i, id)| (id, i)).collect::<AHashMap<_, _>>();

    let mut writer = SvgStringWriter::new();
    writer.write_header(viewport.width, viewport.height, view.tile_size())?;
    writer.write_styles()?;

    open_group(&mut writer, "tiles")?;
    for tile in grid.tiles() {
        let ring = view.polygon(tile.coord).exterior().0.clone();
        let ring = &ring[..ring.len() - 1];
        let attrs = match &tile.owner {
            Some(id) => {
                let fill = rank.get(id).map_or_else(|| golden_angle_color(order.len()), |&i| golden_angle_color(i));
                format!(r#"class="tile" fill="{}" data-region="{}""#, fill, escape_attr(id.as_str()))
            }
            None => format!(r#"class="tile" fill="{}""#, UNOWNED_FILL),
        };
        writer.write_path(ring, &attrs)?;
    }
    close_group(&mut writer)?;

    open_group(&mut writer, "outlines")?;
    for id in grid.owner_ids() {
        let polygons = grid.tiles_owned_by(&id).map(|t| view.polygon(t.coord)).collect::<Vec<_>>();
        for ring in outline_rings(&polygons)? {
            let attrs = format!(r#"class="outline" data-region="{}""#, escape_attr(id.as_str()));
            writer.write_path(&ring, &attrs)?;
        }
    }
    close_group(&mut writer)?;

    writer.write_footer()?;
    writer.into_string()
}

fn open_group(writer: &mut SvgStringWriter, id: &str) -> Result<()> {
    use std::io::Write;
    writeln!(writer, r#"<g id="{}">"#, id)?;
    Ok(())
}

fn close_group(writer: &mut SvgStringWriter) -> Result<()> {
    use std::io::Write;
    writeln!(writer, "</g>")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use tilegeom::{GridCoord, Scheme};

    use super::*;

    #[test]
    fn renders_tiles_and_outlines() {
        let geometry = GridGeometry::new(Scheme::Hex, 1.0);
        let mut grid = TileGrid::rectangular(geometry, 3, 2);
        let a = RegionId::new("A&B");
        grid.claim(GridCoord::new(0, 0), &a).unwrap();
        grid.claim(GridCoord::new(1, 0), &a).unwrap();

        let mut view = geometry;
        let viewport = Viewport::new(300.0, 200.0);
        view.fit(&grid.span().unwrap(), viewport);

        let svg = render_svg(&grid, &view, viewport, None).unwrap();
        assert!(svg.starts_with("<?xml"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches(r#"class="tile""#).count(), 6);
        assert_eq!(svg.matches(r#"class="outline""#).count(), 1);
        assert_eq!(svg.matches(UNOWNED_FILL).count(), 4);
        assert!(svg.contains(r#"data-region="A&amp;B""#));
    }

    #[test]
    fn rendering_is_reproducible() {
        let geometry = GridGeometry::new(Scheme::Square, 1.0);
        let mut grid = TileGrid::rectangular(geometry, 4, 4);
        // A ring around B, plus a diagonal pinch.
        for c in [(0, 0), (1, 0), (2, 0), (0, 1), (2, 1), (0, 2), (1, 2), (2, 2), (3, 3)] {
            grid.claim(GridCoord::new(c.0, c.1), &RegionId::new("A")).unwrap();
        }
        grid.claim(GridCoord::new(1, 1), &RegionId::new("B")).unwrap();

        let first = render_svg(&grid, &geometry, Viewport::new(100.0, 100.0), None).unwrap();
        for _ in 0..10 {
            assert_eq!(render_svg(&grid, &geometry, Viewport::new(100.0, 100.0), None).unwrap(), first);
        }
    }
}
