//! Export orchestration and container serialization.

use arbor_scene::{LayerTable, SceneObject};

use crate::document::DocumentBuilder;
use crate::error::{GltfError, Result};
use crate::material::MaterialEncoder;
use crate::mesh::MeshEncoder;
use crate::options::ExportOptions;
use crate::builder::SceneGraphBuilder;
use crate::schema;

/// GLB magic number "glTF".
const GLB_MAGIC: u32 = 0x4654_6C67;
/// GLB version.
const GLB_VERSION: u32 = 2;
/// JSON chunk type.
const CHUNK_JSON: u32 = 0x4E4F_534A;
/// Binary chunk type.
const CHUNK_BIN: u32 = 0x004E_4942;

/// A finished document: the JSON root plus the shared binary blob
/// (empty in text mode). Read-only once returned.
#[derive(Debug)]
pub struct GltfAsset {
    pub root: schema::Gltf,
    pub binary: Vec<u8>,
}

impl GltfAsset {
    /// Serialize as a GLB container: 12-byte header, space-padded JSON
    /// chunk, zero-padded BIN chunk.
    pub fn to_glb(&self) -> Result<Vec<u8>> {
        let json_bytes = serde_json::to_vec(&self.root)?;

        let json_padding = (4 - (json_bytes.len() % 4)) % 4;
        let padded_json_len = json_bytes.len() + json_padding;

        let bin_padding = (4 - (self.binary.len() % 4)) % 4;
        let padded_bin_len = self.binary.len() + bin_padding;

        let has_bin = !self.binary.is_empty();
        let total_size = 12 + 8 + padded_json_len + if has_bin { 8 + padded_bin_len } else { 0 };

        let mut output = Vec::with_capacity(total_size);

        output.extend_from_slice(&GLB_MAGIC.to_le_bytes());
        output.extend_from_slice(&GLB_VERSION.to_le_bytes());
        output.extend_from_slice(&(total_size as u32).to_le_bytes());

        output.extend_from_slice(&(padded_json_len as u32).to_le_bytes());
        output.extend_from_slice(&CHUNK_JSON.to_le_bytes());
        output.extend_from_slice(&json_bytes);
        output.extend(std::iter::repeat(0x20u8).take(json_padding));

        if has_bin {
            output.extend_from_slice(&(padded_bin_len as u32).to_le_bytes());
            output.extend_from_slice(&CHUNK_BIN.to_le_bytes());
            output.extend_from_slice(&self.binary);
            output.extend(std::iter::repeat(0u8).take(bin_padding));
        }

        Ok(output)
    }

    /// Serialize as .gltf JSON text.
    pub fn to_json(&self, pretty: bool) -> Result<Vec<u8>> {
        let bytes = if pretty {
            serde_json::to_vec_pretty(&self.root)?
        } else {
            serde_json::to_vec(&self.root)?
        };
        Ok(bytes)
    }
}

/// Assembles a glTF document from an ordered object list in a single
/// pass. Node, buffer and material ordering mirror input iteration
/// order.
#[derive(Debug, Default)]
pub struct Exporter {
    options: ExportOptions,
    layers: LayerTable,
}

impl Exporter {
    pub fn new(options: ExportOptions) -> Self {
        Self {
            options,
            layers: LayerTable::new(),
        }
    }

    /// Supply the host layer table (needed when layer grouping is on).
    pub fn with_layer_table(mut self, layers: LayerTable) -> Self {
        self.layers = layers;
        self
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Build the document from the host-supplied object sequence.
    pub fn export(&self, objects: &[SceneObject]) -> Result<GltfAsset> {
        if self.options.use_draco_compression && !cfg!(feature = "draco") {
            return Err(GltfError::Unsupported(
                "draco compression requested but support is not compiled in".into(),
            ));
        }

        let mut doc = DocumentBuilder::new(&self.options);
        let mut materials = MaterialEncoder::new();
        let mut meshes = MeshEncoder::new();
        let mut graph = SceneGraphBuilder::new();

        for object in objects {
            let material_index = materials.resolve(&mut doc, object, &self.options)?;
            let mesh_index =
                match meshes.mesh_for_object(&mut doc, object, material_index, &self.options)? {
                    Some(index) => index,
                    None => continue,
                };
            graph.add_object_node(&mut doc, object, mesh_index, &self.options, &self.layers);
        }

        let (root, binary) = doc.finish();
        Ok(GltfAsset { root, binary })
    }

    /// Build and serialize in one step, honoring the configured output
    /// mode.
    pub fn export_bytes(&self, objects: &[SceneObject]) -> Result<Vec<u8>> {
        let asset = self.export(objects)?;
        if self.options.binary {
            asset.to_glb()
        } else {
            asset.to_json(self.options.pretty)
        }
    }
}
