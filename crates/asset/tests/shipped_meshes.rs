//! The meshes under `assets/` must load and fit inside one board cell.

use std::path::PathBuf;

use asset::load_obj_from_path;

fn asset_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../assets")
        .join(name)
}

fn assert_fits_cell(name: &str) {
    let mesh = load_obj_from_path(asset_path(name)).expect("load shipped mesh");
    assert!(mesh.is_valid(), "{name} is not a valid triangle mesh");

    let (lo, hi) = mesh.bounds().expect("non-empty mesh");
    for axis in 0..2 {
        assert!(lo[axis] >= -0.5 && hi[axis] <= 0.5, "{name} overflows its cell");
    }
}

#[test]
fn x_mesh_loads() {
    assert_fits_cell("x.obj");
    let mesh = load_obj_from_path(asset_path("x.obj")).unwrap();
    assert_eq!(mesh.triangle_count(), 4);
}

#[test]
fn o_mesh_loads() {
    assert_fits_cell("o.obj");
    let mesh = load_obj_from_path(asset_path("o.obj")).unwrap();
    assert_eq!(mesh.vertex_count(), 64);
    assert_eq!(mesh.triangle_count(), 64);
}
