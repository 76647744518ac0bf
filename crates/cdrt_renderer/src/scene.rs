//! Scene assembly: geometry, materials and the light.
//!
//! A [`SceneBuilder`] collects everything single-threaded. [`SceneBuilder::build`]
//! validates material references, builds the BVH, and returns a read-only
//! [`Scene`] that render threads share.

use cdrt_math::Interval;
use thiserror::Error;

use crate::bvh::BvhConfig;
use crate::{
    AcceleratedList, HitRecord, Hittable, HittableList, Light, Material, MaterialId, Primitive,
    PrimitiveId, Ray,
};

/// Errors raised while finalizing a scene.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("Scene has no light")]
    MissingLight,

    #[error("Primitive {primitive} references unknown material {material}")]
    UnknownMaterial { primitive: usize, material: usize },
}

/// Mutable scene under construction.
#[derive(Default)]
pub struct SceneBuilder {
    materials: Vec<Box<dyn Material>>,
    geometry: HittableList<Primitive>,
    light: Option<Light>,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a material and return its id.
    pub fn add_material<M: Material + 'static>(&mut self, material: M) -> MaterialId {
        self.materials.push(Box::new(material));
        MaterialId(self.materials.len() - 1)
    }

    /// Add a primitive and return its id.
    pub fn add(&mut self, primitive: impl Into<Primitive>) -> PrimitiveId {
        self.geometry.add(primitive.into())
    }

    /// Set the scene light, replacing any previous one.
    pub fn set_light(&mut self, light: Light) {
        self.light = Some(light);
    }

    pub fn primitive_count(&self) -> usize {
        self.geometry.len()
    }

    /// Validate the scene and build its BVH.
    pub fn build(self, bvh: &BvhConfig) -> Result<Scene, SceneError> {
        let light = self.light.ok_or(SceneError::MissingLight)?;

        for (i, primitive) in self.geometry.iter().enumerate() {
            let material = primitive.material();
            if material.0 >= self.materials.len() {
                return Err(SceneError::UnknownMaterial {
                    primitive: i,
                    material: material.0,
                });
            }
        }

        let geometry = self.geometry.build_bvh(bvh);
        log::info!(
            "Scene built: {} primitives, {} materials",
            geometry.len(),
            self.materials.len()
        );

        Ok(Scene {
            materials: self.materials,
            geometry,
            light,
        })
    }
}

/// Immutable, fully built scene.
pub struct Scene {
    materials: Vec<Box<dyn Material>>,
    geometry: AcceleratedList<Primitive>,
    light: Light,
}

impl Scene {
    /// Nearest hit over the whole scene.
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        self.geometry.hit(ray, ray_t)
    }

    /// Every hit over the whole scene, unordered.
    pub fn hit_all(&self, ray: &Ray, ray_t: Interval, hits: &mut Vec<HitRecord>) {
        self.geometry.hit_all(ray, ray_t, hits);
    }

    /// Iterate over `(id, primitive)` pairs in insertion order.
    pub fn primitives(&self) -> impl Iterator<Item = (PrimitiveId, &Primitive)> {
        self.geometry.iter()
    }

    pub fn primitive(&self, id: PrimitiveId) -> Option<&Primitive> {
        self.geometry.get(id)
    }

    pub fn primitive_count(&self) -> usize {
        self.geometry.len()
    }

    /// Material by id. Ids are checked when the scene is built.
    pub fn material(&self, id: MaterialId) -> &dyn Material {
        self.materials[id.0].as_ref()
    }

    pub fn light(&self) -> &Light {
        &self.light
    }
}
