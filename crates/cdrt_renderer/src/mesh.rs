//! Triangle mesh primitive backed by its own BVH.
//!
//! A mesh starts unloaded and behaves as absent geometry until geometry is
//! loaded into it. A failed load leaves it unloaded.

use std::path::Path;

use cdrt_core::{load_obj, MeshData, MeshLoadResult};
use cdrt_math::{Aabb, Interval};

use crate::bvh::BvhConfig;
use crate::{AcceleratedList, HitRecord, Hittable, HittableList, MaterialId, Ray, Triangle};

#[derive(Default)]
enum MeshState {
    #[default]
    Unloaded,
    Loaded {
        data: MeshData,
        triangles: AcceleratedList<Triangle>,
    },
}

/// Triangle mesh sharing one material.
pub struct Mesh {
    material: MaterialId,
    bbox: Aabb,
    state: MeshState,
}

impl Mesh {
    /// Create an unloaded mesh.
    pub fn new(material: MaterialId) -> Self {
        Self {
            material,
            bbox: Aabb::EMPTY,
            state: MeshState::Unloaded,
        }
    }

    /// Create a mesh directly from in-memory geometry.
    pub fn from_data(data: MeshData, material: MaterialId, bvh: &BvhConfig) -> Self {
        let mut mesh = Self::new(material);
        mesh.load_data(data, bvh);
        mesh
    }

    /// Load a single-shape OBJ file into this mesh.
    ///
    /// On error the mesh keeps its previous state.
    pub fn load<P: AsRef<Path>>(&mut self, path: P, bvh: &BvhConfig) -> MeshLoadResult<()> {
        let data = load_obj(path)?;
        self.load_data(data, bvh);
        Ok(())
    }

    /// Build the triangle list and its BVH from `data`.
    pub fn load_data(&mut self, data: MeshData, bvh: &BvhConfig) {
        if self.is_loaded() {
            log::warn!("Replacing already loaded mesh geometry");
        }

        let list: HittableList<Triangle> = data
            .triangles()
            .map(|[v0, v1, v2]| Triangle::new(v0, v1, v2, self.material))
            .collect();
        let triangles = list.build_bvh(bvh);

        // Union of the triangle boxes, which are padded against flat extents
        self.bbox = triangles.bounding_box();
        log::debug!(
            "Mesh ready: {} vertices, {} triangles",
            data.vertex_count(),
            data.triangle_count()
        );
        self.state = MeshState::Loaded { data, triangles };
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, MeshState::Loaded { .. })
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }

    /// Deduplicated vertex positions and triangle indices, once loaded.
    pub fn data(&self) -> Option<&MeshData> {
        match &self.state {
            MeshState::Loaded { data, .. } => Some(data),
            MeshState::Unloaded => None,
        }
    }

    pub fn triangle_count(&self) -> usize {
        match &self.state {
            MeshState::Loaded { triangles, .. } => triangles.len(),
            MeshState::Unloaded => 0,
        }
    }
}

impl Hittable for Mesh {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        match &self.state {
            MeshState::Loaded { triangles, .. } => triangles.hit(ray, ray_t),
            MeshState::Unloaded => None,
        }
    }

    fn hit_all(&self, ray: &Ray, ray_t: Interval, hits: &mut Vec<HitRecord>) {
        if let MeshState::Loaded { triangles, .. } = &self.state {
            triangles.hit_all(ray, ray_t, hits);
        }
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
