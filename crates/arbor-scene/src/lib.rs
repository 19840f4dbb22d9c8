//! arbor-scene: the host-facing scene model for the Arbor exchange pipeline.
//!
//! This crate defines the data the host application hands to format
//! backends: triangulated meshes, physically based materials, placed
//! objects with layers and identities, and nested instance definitions.
//! Everything here is plain data; format-specific conversion lives in the
//! backend crates (currently `arbor-gltf`).
//!
//! # Example
//!
//! ```ignore
//! use arbor_scene::{MeshData, ObjectId, SceneObject};
//!
//! let mesh = MeshData::from_triangles(positions, indices);
//! let object = SceneObject::new(ObjectId(1)).with_mesh(mesh);
//! ```

pub mod instance;
pub mod material;
pub mod mesh;
pub mod object;
pub mod raster;
pub mod units;

pub use instance::{explode_entries, InstanceDefinition, InstanceTable, SceneEntry};
pub use material::{
    ChannelTexture, LinearWorkflow, MaterialData, MaterialId, MaterialTextures, TextureSource,
};
pub use mesh::{MeshData, MeshFace};
pub use object::{Layer, LayerId, LayerTable, ObjectId, SceneObject};
pub use raster::{Raster, RgbaChannel};
pub use units::ModelUnits;
