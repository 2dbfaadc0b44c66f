// Integration tests for GridGeometry: position/nearest inverse, viewport fitting, covering.

use geo::{Contains, Coord, Rect};
use tilegeom::{GridCoord, GridGeometry, GridSpan, Scheme, Viewport};

fn sample_coords() -> Vec<GridCoord> {
    (-4..5).flat_map(|x| (-4..5).map(move |y| GridCoord::new(x, y))).collect()
}

#[test]
fn nearest_inverts_position() {
    for scheme in [Scheme::Square, Scheme::Hex] {
        let geom = GridGeometry::new(scheme, 7.5).with_origin(Coord { x: -12.0, y: 40.0 });
        for c in sample_coords() {
            assert_eq!(geom.nearest(geom.position(c)), c, "{scheme:?} {c}");
        }
    }
}

#[test]
fn nearest_tolerates_offsets_inside_the_tile() {
    for scheme in [Scheme::Square, Scheme::Hex] {
        let geom = GridGeometry::new(scheme, 10.0);
        for c in sample_coords() {
            let p = geom.position(c);
            for (dx, dy) in [(3.0, 0.0), (-3.0, 2.0), (0.0, -4.0), (2.5, 2.5)] {
                assert_eq!(geom.nearest(Coord { x: p.x + dx, y: p.y + dy }), c);
            }
        }
    }
}

#[test]
fn polygon_contains_its_center() {
    for scheme in [Scheme::Square, Scheme::Hex] {
        let geom = GridGeometry::new(scheme, 3.0);
        for c in sample_coords() {
            let center = geo::Point::from(geom.position(c));
            assert!(geom.polygon(c).contains(&center));
        }
    }
}

#[test]
fn adjacent_centers_are_one_pitch_apart() {
    let geom = GridGeometry::new(Scheme::Hex, 4.0);
    let pitch = geom.tile_width();
    for c in sample_coords() {
        for n in Scheme::Hex.neighbors(c) {
            let d = geom.distance(n, geom.position(c));
            assert!((d - pitch).abs() < 1e-9, "{c} -> {n}: {d}");
        }
    }
}

#[test]
fn fit_places_every_tile_inside_the_viewport() {
    let span = GridSpan { min: GridCoord::new(-3, 1), max: GridCoord::new(12, 9) };
    let viewport = Viewport::new(800.0, 500.0);

    for scheme in [Scheme::Square, Scheme::Hex] {
        let mut geom = GridGeometry::new(scheme, 1.0);
        let ratio = geom.tile_width() / geom.tile_height();
        geom.fit(&span, viewport);

        assert!((geom.tile_width() / geom.tile_height() - ratio).abs() < 1e-12);

        for c in span.iter() {
            for p in geom.polygon(c).exterior().0.iter() {
                assert!(p.x >= -1e-9 && p.x <= viewport.width + 1e-9, "{scheme:?} {c} x={}", p.x);
                assert!(p.y >= -1e-9 && p.y <= viewport.height + 1e-9, "{scheme:?} {c} y={}", p.y);
            }
        }

        // One axis is fully used.
        let bounds = geom.bounds(&span);
        let used_w = (bounds.width() - viewport.width).abs() < 1e-6;
        let used_h = (bounds.height() - viewport.height).abs() < 1e-6;
        assert!(used_w || used_h);
    }
}

#[test]
fn covering_selects_centers_inside_rect() {
    let geom = GridGeometry::new(Scheme::Square, 1.0);
    let rect = Rect::new(Coord { x: -0.2, y: -0.2 }, Coord { x: 2.2, y: 1.2 });
    let mut coords = geom.covering(&rect);
    coords.sort();
    let expected = vec![
        GridCoord::new(0, 0), GridCoord::new(0, 1),
        GridCoord::new(1, 0), GridCoord::new(1, 1),
        GridCoord::new(2, 0), GridCoord::new(2, 1),
    ];
    assert_eq!(coords, expected);
}
