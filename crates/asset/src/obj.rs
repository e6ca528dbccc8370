//! OBJ import, delegated to `tobj`.
//!
//! Faces are triangulated and vertices collapsed to a single index stream,
//! so indices point straight into the position list. Only the first model
//! in a file becomes the mesh; materials, normals and UVs are ignored.

use std::{
    io::{self, BufRead},
    path::Path,
};

use anyhow::{Context, Result, anyhow};

use crate::mesh::MeshData;

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    }
}

/// Load an OBJ mesh from a file path.
pub fn load_obj_from_path(path: impl AsRef<Path>) -> Result<MeshData> {
    let path = path.as_ref();
    let (models, _materials) = tobj::load_obj(path, &load_options())
        .with_context(|| format!("Failed to load OBJ file: {}", path.display()))?;
    let mesh = first_model_mesh(models)
        .with_context(|| format!("Failed to load OBJ file: {}", path.display()))?;
    log::info!(
        "Loaded mesh {}: {} vertices, {} triangles",
        path.display(),
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

/// Load an OBJ mesh from a [`BufRead`] implementation. `mtllib` references are not followed.
pub fn load_obj_from_reader<R: BufRead>(mut reader: R) -> Result<MeshData> {
    let (models, _materials) = tobj::load_obj_buf(&mut reader, &load_options(), |_| {
        Err(tobj::LoadError::OpenFileFailed)
    })
    .context("Failed to parse OBJ data")?;
    first_model_mesh(models)
}

/// Convenience helper to parse an OBJ string literal.
pub fn load_obj_from_str(contents: &str) -> Result<MeshData> {
    load_obj_from_reader(io::Cursor::new(contents))
}

fn first_model_mesh(models: Vec<tobj::Model>) -> Result<MeshData> {
    let extra = models.len().saturating_sub(1);
    let model = models
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("OBJ contained no meshes"))?;
    if extra > 0 {
        log::warn!("OBJ has {} extra object(s); drawing only '{}'", extra, model.name);
    }

    let positions: Vec<[f32; 3]> = model
        .mesh
        .positions
        .chunks_exact(3)
        .map(|p| [p[0], p[1], p[2]])
        .collect();
    let mesh = MeshData::new(positions, model.mesh.indices);

    if !mesh.is_valid() {
        anyhow::bail!("OBJ object '{}' contained no triangles", model.name);
    }
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_triangle() {
        let src = r#"
            v 0.0 0.0 0.0
            v 1.0 0.0 0.0
            v 0.0 1.0 0.0
            vn 0.0 0.0 1.0
            f 1//1 2//1 3//1
        "#;
        let mesh = load_obj_from_str(src).expect("parse triangle");
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert!(mesh.is_valid());
    }

    #[test]
    fn quad_is_triangulated() {
        let src = "v -1 -1 0\nv 1 -1 0\nv 1 1 0\nv -1 1 0\nf 1 2 3 4\n";
        let mesh = load_obj_from_str(src).expect("parse quad");
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.bounds(), Some(([-1.0, -1.0, 0.0], [1.0, 1.0, 0.0])));
    }

    #[test]
    fn only_the_first_object_is_kept() {
        let src = "o first\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n\
                   o second\nv 5 5 5\nv 6 5 5\nv 5 6 5\nv 6 6 5\nf 4 5 6\nf 5 7 6\n";
        let mesh = load_obj_from_str(src).expect("parse two objects");
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.bounds(), Some(([0.0, 0.0, 0.0], [1.0, 1.0, 0.0])));
    }

    #[test]
    fn vertices_without_faces_are_an_error() {
        assert!(load_obj_from_str("v 0 0 0\nv 1 0 0\n").is_err());
        assert!(load_obj_from_str("").is_err());
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_obj_from_path("definitely/not/here.obj").unwrap_err();
        assert!(err.to_string().contains("definitely/not/here.obj"));
    }
}
