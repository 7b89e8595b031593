//! # Tile Build Tests

use super::*;
use crate::cell::Direction;
use crate::tile_info::Centering;

const NAN: f64 = f64::NAN;

fn padded(rows: Vec<Vec<f64>>) -> Raster {
    Raster::from_rows(rows).unwrap().pad_edge()
}

fn info_for(raster: &Raster, format: OutputFormat) -> TileInfo {
    let rows = (raster.rows() - 2) as f64;
    let cols = (raster.cols() - 2) as f64;
    TileInfo::new(1.0, 1000.0, 0.0, 100.0, cols, rows, format)
}

fn triangles(top: Raster, bottom: Bottom, tweak: impl FnOnce(&mut TileInfo)) -> u64 {
    let mut info = info_for(&top, OutputFormat::BinaryStl);
    tweak(&mut info);
    build_tile(top, bottom, &mut info).unwrap();
    info.stats.triangle_count
}

// =============================================================================
// TRIANGLE COUNT TESTS
// =============================================================================

#[test]
fn test_two_by_two_with_flat_bottom() {
    let top = padded(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    // 4 tops, 8 fringe walls, 2 bottom triangles
    assert_eq!(triangles(top, Bottom::Flat, |_| {}), 8 + 16 + 2);
}

#[test]
fn test_two_by_two_without_bottom() {
    let top = padded(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    assert_eq!(triangles(top, Bottom::Flat, |i| i.no_bottom = true), 24);
}

#[test]
fn test_two_by_two_with_cell_bottoms() {
    let top = padded(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    assert_eq!(triangles(top, Bottom::Flat, |i| i.flat_bottom = false), 32);
}

#[test]
fn test_single_hole_adds_four_walls() {
    let full = padded(vec![vec![5.0; 3]; 3]);
    let holed = padded(vec![
        vec![5.0, 5.0, 5.0],
        vec![5.0, NAN, 5.0],
        vec![5.0, 5.0, 5.0],
    ]);
    let no_gap = triangles(full, Bottom::Flat, |i| i.flat_bottom = false);
    let gap = triangles(holed, Bottom::Flat, |i| i.smooth_borders = false);
    assert_eq!(no_gap, 60);
    // the hole's own top and bottom go, four walls of two triangles come
    assert_eq!(gap, no_gap - 4 + 8);
}

#[test]
fn test_dirty_triangles_keep_dilated_cells() {
    let holed = padded(vec![
        vec![5.0, 5.0, 5.0],
        vec![5.0, NAN, 5.0],
        vec![5.0, 5.0, 5.0],
    ]);
    let dirty = triangles(holed, Bottom::Flat, |i| {
        i.smooth_borders = false;
        i.dirty_triangles = true;
    });
    // hole filled by dilation: every cell present, no inner walls
    assert_eq!(dirty, 60);
}

// =============================================================================
// EMPTY AND ERROR TESTS
// =============================================================================

#[test]
fn test_all_undefined_is_empty() {
    let top = Raster::filled(4, 4, NAN);
    let mut info = info_for(&top, OutputFormat::Obj);
    let out = build_tile(top, Bottom::Flat, &mut info).unwrap();
    assert!(out.is_empty());
    assert_eq!(info.stats.triangle_count, 0);
    assert_eq!(info.stats.byte_size, 0);
    assert!(info.stats.have_nan);
}

#[test]
fn test_empty_spill_file_is_removed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.stl");
    let top = Raster::filled(4, 4, NAN);
    let mut info = info_for(&top, OutputFormat::BinaryStl);
    info.spill_file = Some(path.clone());
    let out = build_tile(top, Bottom::Flat, &mut info).unwrap();
    assert_eq!(out, TileOutput::Empty);
    assert!(!path.exists());
}

#[test]
fn test_bottom_shape_mismatch() {
    let top = padded(vec![vec![1.0; 2]; 2]);
    let bottom = Bottom::Elevation(padded(vec![vec![0.0; 3]; 2]));
    let mut info = info_for(&top, OutputFormat::BinaryStl);
    let err = build_tile(top, bottom, &mut info).unwrap_err();
    assert!(matches!(err, MeshError::ShapeMismatch { .. }));
}

#[test]
fn test_invalid_config_is_rejected() {
    let top = padded(vec![vec![1.0; 2]; 2]);
    let mut info = info_for(&top, OutputFormat::BinaryStl);
    info.scale = -1.0;
    assert!(matches!(
        build_tile(top, Bottom::Flat, &mut info),
        Err(MeshError::Config { .. })
    ));
}

#[test]
fn test_unpadded_raster_is_rejected() {
    let top = Raster::filled(2, 2, 1.0);
    let mut info = TileInfo::new(1.0, 1000.0, 0.0, 1.0, 1.0, 1.0, OutputFormat::Obj);
    assert!(matches!(
        build_tile(top, Bottom::Flat, &mut info),
        Err(MeshError::InvalidRaster { .. })
    ));
}

#[test]
fn test_spill_directory_missing_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let top = padded(vec![vec![1.0; 2]; 2]);
    let mut info = info_for(&top, OutputFormat::BinaryStl);
    info.spill_file = Some(dir.path().join("missing").join("tile.stl"));
    assert!(matches!(
        build_tile(top, Bottom::Flat, &mut info),
        Err(MeshError::Io(_))
    ));
}

// =============================================================================
// PREPARATION TESTS
// =============================================================================

#[test]
fn test_height_stats() {
    let top = padded(vec![vec![10.0, 20.0]]);
    let mut info = info_for(&top, OutputFormat::BinaryStl);
    info.min_elev = 10.0;
    info.z_scale = 2.0;
    info.base_thickness_mm = 3.0;
    prepare_tile(top, Bottom::Flat, &mut info).unwrap();
    assert_eq!(info.stats.min_height_mm, Some(3.0));
    assert_eq!(info.stats.max_height_mm, Some(23.0));
}

#[test]
fn test_relief_ignored_with_holes() {
    let top = padded(vec![vec![1.0, NAN], vec![1.0, 1.0]]);
    let relief = Raster::filled(top.rows(), top.cols(), 0.5);
    let mut info = info_for(&top, OutputFormat::BinaryStl);
    let prepared = prepare_tile(top, Bottom::Relief(relief), &mut info).unwrap();
    let mut pool = VertexPool::disabled();
    let grid = prepared.build_grid(&mut pool);
    let cell = grid.get(0, 0).unwrap();
    assert!(cell.bottom.unwrap().vertices().iter().all(|v| v.z == 0.0));
}

#[test]
fn test_relief_sets_bottom_heights() {
    let top = padded(vec![vec![1.0; 2]; 2]);
    let relief = Raster::filled(top.rows(), top.cols(), 0.5);
    let mut info = info_for(&top, OutputFormat::BinaryStl);
    let prepared = prepare_tile(top, Bottom::Relief(relief), &mut info).unwrap();
    assert!(prepared.flat_bottom_triangles().is_none());
    let mut pool = VertexPool::disabled();
    let grid = prepared.build_grid(&mut pool);
    let bottom = grid.get(1, 1).unwrap().bottom.unwrap();
    assert!(bottom.vertices().iter().all(|v| v.z == 0.5));
}

#[test]
fn test_elevation_bottom_goes_through() {
    let top = padded(vec![vec![10.0, 10.0], vec![10.0, 10.0]]);
    let bottom = padded(vec![vec![5.0, NAN], vec![5.0, 5.0]]);
    let mut info = info_for(&top, OutputFormat::BinaryStl);
    let prepared = prepare_tile(top, Bottom::Elevation(bottom), &mut info).unwrap();
    assert!(info.stats.have_bottom_nan);
    let mut pool = VertexPool::disabled();
    let grid = prepared.build_grid(&mut pool);
    assert_eq!(grid.len(), 4);
    // bottom quad is NW, NE, SE, SW; the NE corner only touches through cells
    let ne = grid.get(0, 1).unwrap().bottom.unwrap().vertices()[1];
    assert_eq!(ne.z, 0.0);
    let top_z = grid.get(0, 1).unwrap().top.vertices()[0].z;
    assert_eq!(top_z, 11.0);
}

#[test]
fn test_coincident_surfaces_drop_cells() {
    let top = padded(vec![vec![10.0, 10.0], vec![10.0, 10.0]]);
    let bottom = padded(vec![vec![10.0, 5.0], vec![5.0, 5.0]]);
    let mut info = info_for(&top, OutputFormat::BinaryStl);
    info.min_bottom_elev = Some(5.0);
    let prepared = prepare_tile(top, Bottom::Elevation(bottom), &mut info).unwrap();
    let mut pool = VertexPool::disabled();
    let grid = prepared.build_grid(&mut pool);
    assert!(grid.get(0, 0).is_none());
    assert_eq!(grid.len(), 3);
    let east = grid.get(0, 1).unwrap();
    assert!(east.wall(Direction::West).is_some());
    // mapped against the bottom minimum
    assert_eq!(info.stats.max_height_mm, Some(6.0));
}

#[test]
fn test_clean_diags_fills_single_holes() {
    let top = padded(vec![
        vec![5.0, 5.0, 5.0],
        vec![5.0, NAN, 5.0],
        vec![5.0, 5.0, 5.0],
    ]);
    let mut info = info_for(&top, OutputFormat::BinaryStl);
    info.clean_diags = true;
    let prepared = prepare_tile(top, Bottom::Flat, &mut info).unwrap();
    assert!(info.stats.have_nan);
    // nothing left undefined, so the fast path applies again
    assert!(prepared.flat_bottom_triangles().is_some());
    assert!(!prepared.builder().options().have_nan);
}

#[test]
fn test_surfaces_keep_undilated_mask() {
    let top = padded(vec![vec![4.0, NAN, 6.0], vec![4.0, 5.0, 6.0]]);
    let mut info = info_for(&top, OutputFormat::Obj);
    let surfaces = prepare_surfaces(top, Bottom::Flat, &mut info).unwrap();
    assert!(info.stats.have_nan);
    assert!(!surfaces.top.has_undefined());
    let mask = surfaces.mask.as_ref().unwrap();
    assert!(mask.get(1, 2).is_nan());
    assert_eq!(surfaces.bottom, BottomSurface::Constant(0.0));

    let window = surfaces.window(0, 1, 4, 4).unwrap();
    assert_eq!(window.top.get(1, 1), surfaces.top.get(1, 2));
    assert!(window.mask.unwrap().get(1, 1).is_nan());
}

#[test]
fn test_window_clear_of_holes_uses_flat_bottom() {
    let top = padded(vec![vec![NAN, 2.0, 3.0, 4.0], vec![1.0, 2.0, 3.0, 4.0]]);
    let mut info = info_for(&top, OutputFormat::BinaryStl);
    let surfaces = prepare_surfaces(top, Bottom::Flat, &mut info).unwrap();

    let mut west = info_for(&Raster::filled(4, 4, 0.0), OutputFormat::BinaryStl);
    let prepared = tile_from_surfaces(surfaces.window(0, 0, 4, 4).unwrap(), &mut west).unwrap();
    assert!(west.stats.have_nan);
    assert!(prepared.flat_bottom_triangles().is_none());

    let mut east = info_for(&Raster::filled(4, 4, 0.0), OutputFormat::BinaryStl);
    let prepared = tile_from_surfaces(surfaces.window(0, 2, 4, 4).unwrap(), &mut east).unwrap();
    assert!(!east.stats.have_nan);
    assert!(prepared.flat_bottom_triangles().is_some());
    assert!(!prepared.builder().options().tri_cells);
}

#[test]
fn test_raster_bottom_never_uses_tri_cells() {
    let top = padded(vec![vec![10.0, 10.0], vec![10.0, 10.0]]);
    let bottom = padded(vec![vec![10.0, 5.0], vec![5.0, 5.0]]);
    let mut info = info_for(&top, OutputFormat::BinaryStl);
    assert!(info.smooth_borders);
    let prepared = prepare_tile(top, Bottom::Elevation(bottom), &mut info).unwrap();
    let options = prepared.builder().options();
    assert!(options.have_nan);
    assert!(!options.tri_cells);
    assert!(options.per_cell_bottom);
    assert!(prepared.flat_bottom_triangles().is_none());
}

#[test]
fn test_window_out_of_range() {
    let top = padded(vec![vec![1.0; 2]; 2]);
    let mut info = info_for(&top, OutputFormat::Obj);
    let surfaces = prepare_surfaces(top, Bottom::Flat, &mut info).unwrap();
    assert!(matches!(
        surfaces.window(1, 0, 4, 4),
        Err(MeshError::InvalidRaster { .. })
    ));
}

// =============================================================================
// FORMAT TESTS
// =============================================================================

#[test]
fn test_ascii_framing() {
    let top = padded(vec![vec![1.0]]);
    let mut info = info_for(&top, OutputFormat::AsciiStl);
    let out = build_tile(top, Bottom::Flat, &mut info).unwrap();
    let text = String::from_utf8(out.to_bytes().unwrap()).unwrap();
    assert!(text.starts_with("solid digital_elevation_model\nfacet normal "));
    assert!(text.ends_with("endfacet\nendsolid digital_elevation_model"));
    assert_eq!(text.matches("facet normal").count(), 12);
    assert_eq!(text.matches("\nvertex ").count(), 36);
    assert_eq!(info.stats.byte_size, text.len() as u64);
}

#[test]
fn test_obj_layout() {
    let top = padded(vec![vec![1.0]]);
    let mut info = info_for(&top, OutputFormat::Obj);
    let out = build_tile(top, Bottom::Flat, &mut info).unwrap();
    let text = String::from_utf8(out.to_bytes().unwrap()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "g vert");
    let v = lines.iter().filter(|l| l.starts_with("v ")).count();
    let f = lines.iter().filter(|l| l.starts_with("f ")).count();
    assert_eq!(v, 8);
    assert_eq!(f, 12);
    let tris_at = lines.iter().position(|l| *l == "g tris").unwrap();
    assert_eq!(tris_at, 1 + v);
}

#[test]
fn test_binary_normals_when_enabled() {
    let top = padded(vec![vec![1.0]]);
    let mut info = info_for(&top, OutputFormat::BinaryStl);
    info.no_normals = false;
    info.centering = Centering::Tile;
    let bytes = build_tile(top, Bottom::Flat, &mut info)
        .unwrap()
        .to_bytes()
        .unwrap();
    // first record is the top surface: normal (0, 0, 1)
    let f = |o: usize| f32::from_le_bytes(bytes[o..o + 4].try_into().unwrap());
    assert_eq!((f(84), f(88), f(92)), (0.0, 0.0, 1.0));
    assert_eq!(&bytes[..17], b"Binary STL Writer");
    assert_eq!(u32::from_le_bytes(bytes[80..84].try_into().unwrap()), 12);
}

#[test]
fn test_binary_normals_zero_when_disabled() {
    let top = padded(vec![vec![1.0]]);
    let mut info = info_for(&top, OutputFormat::BinaryStl);
    let bytes = build_tile(top, Bottom::Flat, &mut info)
        .unwrap()
        .to_bytes()
        .unwrap();
    for record in bytes[84..].chunks(50) {
        assert!(record[..12].iter().all(|b| *b == 0));
        assert_eq!(&record[48..], &[0, 0]);
    }
}
