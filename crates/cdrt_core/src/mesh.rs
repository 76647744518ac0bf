//! Indexed triangle geometry with exact vertex deduplication.

use std::collections::HashMap;

use cdrt_math::{Aabb, Vec3};

use crate::obj::{MeshLoadError, MeshLoadResult};

/// Triangle mesh as a deduplicated vertex array plus an index array.
///
/// Every 3 indices form one triangle. Vertices appear in first-seen order and
/// no two of them compare equal.
#[derive(Clone, Debug)]
pub struct MeshData {
    /// Unique vertex positions
    pub positions: Vec<Vec3>,

    /// Triangle indices into `positions`
    pub indices: Vec<u32>,

    /// Axis-aligned bounding box of all positions
    pub bounds: Aabb,
}

impl MeshData {
    /// Build a mesh from triangle corners listed three at a time.
    ///
    /// Corners with exactly equal positions collapse onto the index of the
    /// first occurrence. A trailing incomplete triangle is dropped.
    pub fn from_triangle_soup<I>(corners: I) -> Self
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut positions = Vec::new();
        let mut indices = Vec::new();
        let mut seen: HashMap<[u32; 3], u32> = HashMap::new();

        for corner in corners {
            let index = *seen.entry(vertex_key(corner)).or_insert_with(|| {
                positions.push(corner);
                (positions.len() - 1) as u32
            });
            indices.push(index);
        }

        let whole = indices.len() - indices.len() % 3;
        if whole != indices.len() {
            log::warn!(
                "Dropping {} trailing indices that do not form a triangle",
                indices.len() - whole
            );
            indices.truncate(whole);
        }

        let bounds = Aabb::from_point_cloud(&positions);
        Self {
            positions,
            indices,
            bounds,
        }
    }

    /// Build a mesh from an indexed vertex list, deduplicating positions.
    ///
    /// Fails if any index points outside `positions` or the index count is
    /// not a multiple of 3.
    pub fn from_indexed(positions: &[Vec3], indices: &[u32]) -> MeshLoadResult<Self> {
        if indices.len() % 3 != 0 {
            return Err(MeshLoadError::MalformedFaces(indices.len()));
        }

        let corners = indices
            .iter()
            .map(|&i| {
                positions
                    .get(i as usize)
                    .copied()
                    .ok_or(MeshLoadError::InvalidIndex {
                        index: i,
                        vertex_count: positions.len(),
                    })
            })
            .collect::<MeshLoadResult<Vec<Vec3>>>()?;

        Ok(Self::from_triangle_soup(corners))
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of unique vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// True if the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterate over triangles as `[v0, v1, v2]` position triplets.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|face| {
            [
                self.positions[face[0] as usize],
                self.positions[face[1] as usize],
                self.positions[face[2] as usize],
            ]
        })
    }
}

/// Hash key for exact position equality; `-0.0` and `0.0` share a key.
fn vertex_key(v: Vec3) -> [u32; 3] {
    (v + 0.0).to_array().map(f32::to_bits)
}
