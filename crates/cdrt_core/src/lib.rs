//! CDRT Core - mesh geometry loading for the convolution-domain ray tracer.
//!
//! This crate provides:
//!
//! - **Mesh data**: deduplicated vertex positions plus triangle indices
//! - **OBJ support**: single-shape Wavefront OBJ loading via `tobj`
//!
//! # Example
//!
//! ```ignore
//! use cdrt_core::load_obj;
//!
//! let mesh = load_obj("Model/Croissant.obj")?;
//! println!("{} vertices, {} triangles", mesh.vertex_count(), mesh.triangle_count());
//! ```

pub mod mesh;
pub mod obj;

pub use mesh::MeshData;
pub use obj::{load_obj, MeshLoadError, MeshLoadResult};
