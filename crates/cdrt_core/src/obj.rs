//! Wavefront OBJ loading.
//!
//! Only single-shape files are accepted: a file with several `o`/`g` groups
//! is rejected rather than silently merged.

use std::path::Path;

use cdrt_math::Vec3;
use thiserror::Error;

use crate::mesh::MeshData;

/// Errors that can occur while loading mesh geometry.
#[derive(Error, Debug)]
pub enum MeshLoadError {
    #[error("OBJ parse error: {0}")]
    Obj(#[from] tobj::LoadError),

    #[error("Expected exactly one shape, found {0}")]
    MultipleShapes(usize),

    #[error("No shapes found in mesh file")]
    NoShapes,

    #[error("Mesh has no triangles")]
    Empty,

    #[error("Index count {0} is not a multiple of 3")]
    MalformedFaces(usize),

    #[error("Vertex index {index} out of range ({vertex_count} vertices)")]
    InvalidIndex { index: u32, vertex_count: usize },
}

/// Result type for mesh loading operations.
pub type MeshLoadResult<T> = Result<T, MeshLoadError>;

/// Load a triangulated single-shape OBJ file.
///
/// Polygons are triangulated by the loader; vertex positions are then
/// deduplicated by exact equality.
pub fn load_obj<P: AsRef<Path>>(path: P) -> MeshLoadResult<MeshData> {
    let path = path.as_ref();
    log::info!("Loading OBJ {:?}", path);

    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            single_index: true,
            triangulate: true,
            ..Default::default()
        },
    )?;

    let model = match models.as_slice() {
        [] => return Err(MeshLoadError::NoShapes),
        [model] => model,
        _ => return Err(MeshLoadError::MultipleShapes(models.len())),
    };

    let raw_positions: Vec<Vec3> = model
        .mesh
        .positions
        .chunks_exact(3)
        .map(Vec3::from_slice)
        .collect();

    log::info!("[{}] # of vertices : {}", model.name, raw_positions.len());
    log::info!("[{}] # of normals  : {}", model.name, model.mesh.normals.len() / 3);
    log::info!("[{}] # of faces    : {}", model.name, model.mesh.indices.len() / 3);

    let mesh = MeshData::from_indexed(&raw_positions, &model.mesh.indices)?;
    if mesh.is_empty() {
        return Err(MeshLoadError::Empty);
    }

    log::debug!(
        "Deduplicated {} -> {} vertices",
        raw_positions.len(),
        mesh.vertex_count()
    );
    log::info!("Finished loading OBJ {:?}", path);

    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_temp_obj(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("cdrt_core_{}_{}.obj", name, std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_single_quad() {
        let path = write_temp_obj(
            "quad",
            "o quad\nv 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n",
        );

        let mesh = load_obj(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.vertex_count(), 4);
    }

    #[test]
    fn test_load_rejects_multiple_shapes() {
        let path = write_temp_obj(
            "multi",
            "o a\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\no b\nv 0 0 1\nv 1 0 1\nv 0 1 1\nf 4 5 6\n",
        );

        let err = load_obj(&path).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(matches!(err, MeshLoadError::MultipleShapes(2)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_obj("/definitely/not/here.obj").unwrap_err();
        assert!(matches!(err, MeshLoadError::Obj(_)));
    }
}
