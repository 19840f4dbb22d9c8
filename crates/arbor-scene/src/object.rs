//! Placed objects and the layer table they reference.

use glam::Mat4;
use serde::{Deserialize, Serialize};

use crate::material::MaterialData;
use crate::mesh::MeshData;

/// Stable identity of a host object. Placed copies of the same source
/// geometry share one id, which is what collapses them to a single
/// exported mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

/// Identity of a layer in the host's layer table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerId(pub u32);

/// One layer of the host document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    /// Parent layer; `None` for top-level layers.
    pub parent: Option<LayerId>,
}

/// The host's layer table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayerTable {
    layers: Vec<Layer>,
}

impl LayerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a layer and return its id.
    pub fn add(&mut self, name: impl Into<String>, parent: Option<LayerId>) -> LayerId {
        let id = LayerId(self.layers.len() as u32);
        self.layers.push(Layer {
            id,
            name: name.into(),
            parent,
        });
        id
    }

    /// Look up a layer by id.
    pub fn find(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

/// A placed, already-resolved object: meshed, triangulated and carrying
/// its material and transform. Immutable during assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneObject {
    /// Source identity (mesh dedup key).
    pub id: ObjectId,
    /// Optional display name.
    pub name: Option<String>,
    /// Placement transform in scene units.
    pub transform: Mat4,
    /// Resolved material, if any.
    pub material: Option<MaterialData>,
    /// Display color, used as a material fallback when enabled.
    pub display_color: [u8; 3],
    /// Layer the object lives on.
    pub layer: Option<LayerId>,
    /// Render meshes making up the object.
    pub meshes: Vec<MeshData>,
}

impl SceneObject {
    /// Create an empty object with the given identity.
    pub fn new(id: ObjectId) -> Self {
        Self {
            id,
            name: None,
            transform: Mat4::IDENTITY,
            material: None,
            display_color: [128, 128, 128],
            layer: None,
            meshes: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_mesh(mut self, mesh: MeshData) -> Self {
        self.meshes.push(mesh);
        self
    }

    pub fn with_material(mut self, material: MaterialData) -> Self {
        self.material = Some(material);
        self
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_layer(mut self, layer: LayerId) -> Self {
        self.layer = Some(layer);
        self
    }

    /// Drop meshes that fail the export validity filter.
    pub fn retain_valid_meshes(&mut self, allow_open: bool) {
        self.meshes.retain(|m| m.is_valid_for_export(allow_open));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_table_lookup() {
        let mut layers = LayerTable::new();
        let root = layers.add("Root", None);
        let child = layers.add("A", Some(root));

        assert_eq!(layers.find(child).unwrap().parent, Some(root));
        assert_eq!(layers.find(root).unwrap().name, "Root");
        assert!(layers.find(LayerId(99)).is_none());
    }

    #[test]
    fn test_retain_valid_meshes() {
        let mut object = SceneObject::new(ObjectId(1))
            .with_mesh(MeshData::new())
            .with_mesh(MeshData {
                positions: vec![glam::Vec3::ZERO, glam::Vec3::X, glam::Vec3::Y],
                faces: vec![crate::mesh::MeshFace::Triangle([0, 1, 2])],
                closed: true,
                ..Default::default()
            });

        object.retain_valid_meshes(false);
        assert_eq!(object.meshes.len(), 1);
    }
}
