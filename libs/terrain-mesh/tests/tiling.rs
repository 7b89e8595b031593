use std::collections::BTreeSet;

use terrain_mesh::{
    build_tile, build_tile_from_surfaces, prepare_surfaces, Bottom, Centering, OutputFormat, Raster,
    TileInfo, TileOutput,
};

const NAN: f64 = f64::NAN;

/// 3 rows by 4 columns with a hole on the eastern edge.
fn terrain() -> Raster {
    Raster::from_rows(vec![
        vec![210.0, 212.5, 215.0, 211.0],
        vec![208.0, 213.0, 214.0, NAN],
        vec![205.5, 207.0, 209.0, 212.0],
    ])
    .unwrap()
}

fn tile_info(tile_no_x: u32, format: OutputFormat) -> TileInfo {
    let mut info = TileInfo::new(2.0, 500.0, 205.5, 215.0, 4.0, 6.0, format);
    info.ntiles_x = 2;
    info.tile_no_x = tile_no_x;
    info.centering = Centering::Global;
    info.smooth_borders = false;
    info
}

/// Padded window of tile `tile_no_x` (1-based) out of the padded terrain.
fn tile_raster(padded: &Raster, tile_no_x: u32) -> Raster {
    let col = (tile_no_x as usize - 1) * 2;
    padded.window(0, col, padded.rows(), 4).unwrap()
}

fn obj_vertices(out: &TileOutput) -> Vec<[f64; 3]> {
    let text = String::from_utf8(out.to_bytes().unwrap()).unwrap();
    text.lines()
        .filter_map(|l| l.strip_prefix("v "))
        .map(|l| {
            let c: Vec<f64> = l.split(' ').map(|s| s.parse().unwrap()).collect();
            [c[0], c[1], c[2]]
        })
        .collect()
}

fn seam_tops(vertices: &[[f64; 3]], seam_x: f64) -> BTreeSet<[u64; 3]> {
    vertices
        .iter()
        .filter(|v| v[0] == seam_x && v[2] > 0.0)
        .map(|v| [v[0].to_bits(), v[1].to_bits(), v[2].to_bits()])
        .collect()
}

#[test]
fn neighbouring_tiles_share_seam_vertices() {
    let padded = terrain().pad_edge();
    let mut west_info = tile_info(1, OutputFormat::Obj);
    let mut east_info = tile_info(2, OutputFormat::Obj);
    let west = build_tile(tile_raster(&padded, 1), Bottom::Flat, &mut west_info).unwrap();
    let east = build_tile(tile_raster(&padded, 2), Bottom::Flat, &mut east_info).unwrap();

    let seam_x = 2.0 * 2.0;
    let west_seam = seam_tops(&obj_vertices(&west), seam_x);
    let east_seam = seam_tops(&obj_vertices(&east), seam_x);
    assert_eq!(west_seam.len(), 4);
    assert_eq!(west_seam, east_seam);
}

#[test]
fn global_tiles_do_not_overlap() {
    let padded = terrain().pad_edge();
    let mut west_info = tile_info(1, OutputFormat::Obj);
    let mut east_info = tile_info(2, OutputFormat::Obj);
    let west = build_tile(tile_raster(&padded, 1), Bottom::Flat, &mut west_info).unwrap();
    let east = build_tile(tile_raster(&padded, 2), Bottom::Flat, &mut east_info).unwrap();

    let west_max = obj_vertices(&west).iter().map(|v| v[0]).fold(f64::MIN, f64::max);
    let east_min = obj_vertices(&east).iter().map(|v| v[0]).fold(f64::MAX, f64::min);
    assert_eq!(west_max, 4.0);
    assert_eq!(east_min, 4.0);
    assert!(!west_info.stats.have_nan);
    assert!(east_info.stats.have_nan);
}

#[test]
fn spill_output_matches_memory_output() {
    let dir = tempfile::tempdir().unwrap();
    let padded = terrain().pad_edge();
    for format in [OutputFormat::BinaryStl, OutputFormat::AsciiStl, OutputFormat::Obj] {
        let mut memory_info = tile_info(2, format);
        memory_info.no_normals = false;
        let memory = build_tile(tile_raster(&padded, 2), Bottom::Flat, &mut memory_info).unwrap();
        assert!(matches!(memory, TileOutput::Buffer(_)));

        let path = dir.path().join(format!("tile.{}", format.extension()));
        let mut spill_info = memory_info.clone();
        spill_info.spill_file = Some(path.clone());
        spill_info.spill_chunk_triangles = 1;
        let spilled = build_tile(tile_raster(&padded, 2), Bottom::Flat, &mut spill_info).unwrap();

        assert_eq!(spilled, TileOutput::File(path.clone()));
        assert_eq!(spilled.to_bytes().unwrap(), memory.to_bytes().unwrap());
        assert_eq!(spill_info.stats, memory_info.stats);
    }
}

#[test]
fn hole_in_overlap_column_keeps_seam_closed() {
    // (1, 1) lies in the west tile and in the padding ring of the east tile
    let mut holed = terrain();
    holed.set(1, 3, 213.5);
    holed.set(1, 1, NAN);
    let mut full_info = tile_info(1, OutputFormat::Obj);
    let surfaces = prepare_surfaces(holed.pad_edge(), Bottom::Flat, &mut full_info).unwrap();
    assert!(full_info.stats.have_nan);

    let mut seams = Vec::new();
    for tile_no_x in 1..=2 {
        let col = (tile_no_x as usize - 1) * 2;
        let window = surfaces.window(0, col, 5, 4).unwrap();
        let mut info = tile_info(tile_no_x, OutputFormat::Obj);
        let out = build_tile_from_surfaces(window, &mut info).unwrap();
        assert!(info.stats.have_nan);
        seams.push(seam_tops(&obj_vertices(&out), 4.0));
    }
    assert_eq!(seams[0].len(), 4);
    assert_eq!(seams[0], seams[1]);
}

#[test]
fn elevation_bottom_maps_every_tile_alike() {
    // the through cell sits in the west tile only; both tiles must still
    // share one height mapping
    let top = Raster::filled(3, 4, 220.0);
    let mut bottom = Raster::filled(3, 4, 200.0);
    bottom.set(1, 0, NAN);
    let mut full_info = tile_info(1, OutputFormat::Obj);
    full_info.min_bottom_elev = Some(200.0);
    let surfaces = prepare_surfaces(
        top.pad_edge(),
        Bottom::Elevation(bottom.pad_edge()),
        &mut full_info,
    )
    .unwrap();
    assert!(full_info.stats.have_bottom_nan);

    let mut seams = Vec::new();
    let mut heights = Vec::new();
    for tile_no_x in 1..=2 {
        let col = (tile_no_x as usize - 1) * 2;
        let window = surfaces.window(0, col, 5, 4).unwrap();
        let mut info = tile_info(tile_no_x, OutputFormat::Obj);
        let out = build_tile_from_surfaces(window, &mut info).unwrap();
        heights.push(info.stats.max_height_mm);
        seams.push(seam_tops(&obj_vertices(&out), 4.0));
    }
    assert_eq!(heights[0], heights[1]);
    assert!(!seams[0].is_empty());
    assert_eq!(seams[0], seams[1]);
}
