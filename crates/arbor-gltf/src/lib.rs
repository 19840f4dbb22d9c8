//! arbor-gltf: glTF 2.0 export and import for Arbor scenes.
//!
//! The exporter assembles a complete glTF 2.0 asset (JSON document plus
//! binary payload) from an ordered list of placed scene objects in a
//! single deterministic pass: materials are recombined into the PBR
//! metallic-roughness model plus the transmission/clearcoat/ior/specular
//! extension blocks, meshes are packed into byte-aligned buffers (or a
//! Draco-compressed stream), and nodes mirror the host's layer
//! hierarchy on request. The importer runs the inverse path.
//!
//! # Export
//!
//! ```ignore
//! use arbor_gltf::{ExportOptions, Exporter};
//!
//! let exporter = Exporter::new(ExportOptions::default());
//! let glb = exporter.export_bytes(&objects)?;
//! ```
//!
//! # Import
//!
//! ```ignore
//! use arbor_gltf::{Importer, ImportOptions};
//!
//! let scene = Importer::new(ImportOptions::default()).import(&bytes)?;
//! println!("{} placed objects", scene.objects.len());
//! ```

pub mod buffer;
pub mod builder;
pub mod document;
pub mod draco;
pub mod error;
pub mod material;
pub mod mesh;
pub mod options;
pub mod reader;
pub mod schema;
pub mod texture;
pub mod writer;

pub use error::{GltfError, Result};
pub use options::{ExportOptions, ImportOptions, SubDMode};
pub use reader::{ImportedScene, Importer};
pub use writer::{Exporter, GltfAsset};

use arbor_scene::{LayerTable, SceneObject};

/// Export objects with the given options, returning the serialized
/// asset (GLB or JSON text per the options).
pub fn export_to_bytes(
    objects: &[SceneObject],
    layers: &LayerTable,
    options: &ExportOptions,
) -> Result<Vec<u8>> {
    Exporter::new(options.clone())
        .with_layer_table(layers.clone())
        .export_bytes(objects)
}

/// Import an asset from raw bytes with default options.
pub fn import_from_bytes(data: &[u8]) -> Result<ImportedScene> {
    Importer::new(ImportOptions::default()).import(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_scene::{MeshData, MeshFace, ObjectId};
    use glam::Vec3;

    #[test]
    fn test_export_import_through_free_functions() {
        let object = SceneObject::new(ObjectId(1)).with_mesh(MeshData {
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            faces: vec![MeshFace::Triangle([0, 1, 2])],
            closed: true,
            ..Default::default()
        });

        let bytes =
            export_to_bytes(&[object], &LayerTable::new(), &ExportOptions::default()).unwrap();
        let scene = import_from_bytes(&bytes).unwrap();
        assert_eq!(scene.objects.len(), 1);
    }
}
