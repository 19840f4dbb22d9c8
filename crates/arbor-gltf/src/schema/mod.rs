//! glTF 2.0 JSON schema types.
//!
//! Only the parts of the specification this pipeline produces are
//! modeled: buffers, buffer views, accessors, images, textures,
//! samplers, materials, meshes, nodes and scenes. Animation, skinning
//! and cameras are out of scope.

pub mod extensions;

pub use extensions::{
    DracoMeshCompression, MaterialExtensions, MaterialsClearcoat, MaterialsIor, MaterialsSpecular,
    MaterialsTransmission, PrimitiveExtensions,
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// Component type constants
pub const COMPONENT_BYTE: u32 = 5120;
pub const COMPONENT_UNSIGNED_BYTE: u32 = 5121;
pub const COMPONENT_SHORT: u32 = 5122;
pub const COMPONENT_UNSIGNED_SHORT: u32 = 5123;
pub const COMPONENT_UNSIGNED_INT: u32 = 5125;
pub const COMPONENT_FLOAT: u32 = 5126;

// Buffer view targets
pub const TARGET_ARRAY_BUFFER: u32 = 34962;
pub const TARGET_ELEMENT_ARRAY_BUFFER: u32 = 34963;

// Sampler filters and wrap modes
pub const FILTER_LINEAR: u32 = 9729;
pub const WRAP_REPEAT: u32 = 10497;

// Primitive modes
pub const MODE_TRIANGLES: u32 = 4;

// Attribute semantic names
pub const POSITION_ATTRIBUTE: &str = "POSITION";
pub const NORMAL_ATTRIBUTE: &str = "NORMAL";
pub const TEXCOORD0_ATTRIBUTE: &str = "TEXCOORD_0";
pub const COLOR0_ATTRIBUTE: &str = "COLOR_0";

/// Root glTF object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gltf {
    /// Asset information.
    pub asset: Asset,
    /// Default scene index.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scenes: Vec<Scene>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<Node>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meshes: Vec<Mesh>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accessors: Vec<Accessor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buffer_views: Vec<BufferView>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buffers: Vec<Buffer>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub materials: Vec<Material>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub textures: Vec<Texture>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<Image>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub samplers: Vec<Sampler>,
    /// Extension names used by this asset.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions_used: Vec<String>,
    /// Extension names required to load this asset.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions_required: Vec<String>,
}

/// Asset metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// glTF version.
    pub version: String,
    /// Minimum glTF version required.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_version: Option<String>,
    /// Generator name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
    /// Copyright.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
}

impl Default for Asset {
    fn default() -> Self {
        Self {
            version: "2.0".to_string(),
            min_version: None,
            generator: None,
            copyright: None,
        }
    }
}

/// A scene containing root nodes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Root node indices.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<usize>,
}

/// A node in the scene graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Child node indices.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<usize>,
    /// Mesh index.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh: Option<usize>,
    /// Local transformation matrix (column-major).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matrix: Option<[f32; 16]>,
    /// Translation (TRS).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<[f32; 3]>,
    /// Rotation quaternion `[x, y, z, w]` (TRS).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f32; 4]>,
    /// Scale (TRS).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<[f32; 3]>,
}

/// A mesh containing primitives.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mesh {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub primitives: Vec<Primitive>,
}

/// A mesh primitive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Primitive {
    /// Vertex attributes (POSITION, NORMAL, TEXCOORD_0, COLOR_0).
    pub attributes: IndexMap<String, usize>,
    /// Index accessor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indices: Option<usize>,
    /// Material index.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<usize>,
    /// Rendering mode.
    #[serde(default = "default_primitive_mode")]
    pub mode: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<PrimitiveExtensions>,
}

fn default_primitive_mode() -> u32 {
    MODE_TRIANGLES
}

/// An accessor for typed buffer data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accessor {
    /// Buffer view index. `None` for accessors whose data lives in a
    /// compressed stream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_view: Option<usize>,
    /// Byte offset within the buffer view.
    #[serde(default)]
    pub byte_offset: usize,
    /// Component type constant.
    pub component_type: u32,
    /// Number of elements.
    pub count: usize,
    /// Element type ("SCALAR", "VEC2", "VEC3", "VEC4").
    #[serde(rename = "type")]
    pub accessor_type: String,
    /// Whether integer values are normalized to `[0, 1]`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub normalized: bool,
    /// Component-wise minimum.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<Vec<f64>>,
    /// Component-wise maximum.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<Vec<f64>>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Accessor {
    /// Byte size of a single component.
    pub fn component_size(&self) -> usize {
        match self.component_type {
            COMPONENT_BYTE | COMPONENT_UNSIGNED_BYTE => 1,
            COMPONENT_SHORT | COMPONENT_UNSIGNED_SHORT => 2,
            _ => 4,
        }
    }

    /// Number of components per element.
    pub fn component_count(&self) -> usize {
        match self.accessor_type.as_str() {
            "SCALAR" => 1,
            "VEC2" => 2,
            "VEC3" => 3,
            "VEC4" => 4,
            _ => 1,
        }
    }

    /// Tightly packed byte size of one element.
    pub fn element_size(&self) -> usize {
        self.component_count() * self.component_size()
    }
}

/// A view into a buffer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferView {
    /// Buffer index.
    pub buffer: usize,
    /// Byte offset into the buffer.
    #[serde(default)]
    pub byte_offset: usize,
    /// Byte length.
    pub byte_length: usize,
    /// Byte stride for interleaved vertex data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byte_stride: Option<usize>,
    /// Buffer view target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<u32>,
}

/// A buffer containing binary data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buffer {
    /// Byte length.
    pub byte_length: usize,
    /// URI (a data URI, or absent for the GLB binary chunk).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

/// Alpha blending mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlphaMode {
    #[default]
    Opaque,
    Mask,
    Blend,
}

/// A PBR material.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pbr_metallic_roughness: Option<PbrMetallicRoughness>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normal_texture: Option<NormalTextureInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occlusion_texture: Option<OcclusionTextureInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emissive_texture: Option<TextureInfo>,
    #[serde(default, skip_serializing_if = "is_black")]
    pub emissive_factor: [f32; 3],
    #[serde(default)]
    pub alpha_mode: AlphaMode,
    #[serde(default = "default_alpha_cutoff", skip_serializing_if = "is_default_alpha_cutoff")]
    pub alpha_cutoff: f32,
    #[serde(default, skip_serializing_if = "is_false")]
    pub double_sided: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<MaterialExtensions>,
}

fn is_black(value: &[f32; 3]) -> bool {
    *value == [0.0, 0.0, 0.0]
}

fn default_alpha_cutoff() -> f32 {
    0.5
}

fn is_default_alpha_cutoff(value: &f32) -> bool {
    *value == 0.5
}

/// PBR metallic-roughness properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PbrMetallicRoughness {
    #[serde(default = "default_base_color_factor")]
    pub base_color_factor: [f32; 4],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_color_texture: Option<TextureInfo>,
    #[serde(default = "default_strength_factor")]
    pub metallic_factor: f32,
    #[serde(default = "default_strength_factor")]
    pub roughness_factor: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metallic_roughness_texture: Option<TextureInfo>,
}

impl Default for PbrMetallicRoughness {
    fn default() -> Self {
        Self {
            base_color_factor: default_base_color_factor(),
            base_color_texture: None,
            metallic_factor: default_strength_factor(),
            roughness_factor: default_strength_factor(),
            metallic_roughness_texture: None,
        }
    }
}

fn default_base_color_factor() -> [f32; 4] {
    [1.0, 1.0, 1.0, 1.0]
}

fn default_strength_factor() -> f32 {
    1.0
}

/// Texture reference.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureInfo {
    /// Texture index.
    pub index: usize,
    /// Texture coordinate set.
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub tex_coord: u32,
}

fn is_zero_u32(value: &u32) -> bool {
    *value == 0
}

impl TextureInfo {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            tex_coord: 0,
        }
    }
}

/// Normal texture reference.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalTextureInfo {
    pub index: usize,
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub tex_coord: u32,
    /// Normal scale.
    #[serde(default = "default_strength_factor")]
    pub scale: f32,
}

/// Occlusion texture reference.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcclusionTextureInfo {
    pub index: usize,
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub tex_coord: u32,
    /// Occlusion strength.
    #[serde(default = "default_strength_factor")]
    pub strength: f32,
}

/// A texture.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Texture {
    /// Sampler index.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampler: Option<usize>,
    /// Image source index.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// An image.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// URI (data URI or external file).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// MIME type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Buffer view index (embedded image bytes).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_view: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A texture sampler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sampler {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mag_filter: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_filter: Option<u32>,
    #[serde(default = "default_wrap_mode")]
    pub wrap_s: u32,
    #[serde(default = "default_wrap_mode")]
    pub wrap_t: u32,
}

fn default_wrap_mode() -> u32 {
    WRAP_REPEAT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_root_serialization() {
        let root = Gltf {
            asset: Asset {
                generator: Some("arbor-gltf".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        let json = serde_json::to_string(&root).unwrap();
        assert!(json.contains("\"version\":\"2.0\""));
        // Empty lists are omitted entirely
        assert!(!json.contains("\"nodes\""));
        assert!(!json.contains("\"buffers\""));
    }

    #[test]
    fn test_alpha_mode_spelling() {
        assert_eq!(serde_json::to_string(&AlphaMode::Opaque).unwrap(), "\"OPAQUE\"");
        assert_eq!(serde_json::to_string(&AlphaMode::Blend).unwrap(), "\"BLEND\"");
        let parsed: AlphaMode = serde_json::from_str("\"MASK\"").unwrap();
        assert_eq!(parsed, AlphaMode::Mask);
    }

    #[test]
    fn test_material_defaults_omitted() {
        let material = Material {
            name: Some("plain".to_string()),
            pbr_metallic_roughness: Some(PbrMetallicRoughness::default()),
            double_sided: true,
            ..Default::default()
        };

        let json = serde_json::to_string(&material).unwrap();
        assert!(!json.contains("emissiveFactor"));
        assert!(!json.contains("alphaCutoff"));
        assert!(json.contains("\"doubleSided\":true"));
    }

    #[test]
    fn test_accessor_roundtrip() {
        let json = r#"{
            "bufferView": 0,
            "componentType": 5126,
            "count": 8,
            "type": "VEC3",
            "min": [0.0, 0.0, 0.0],
            "max": [1.0, 1.0, 1.0]
        }"#;
        let accessor: Accessor = serde_json::from_str(json).unwrap();
        assert_eq!(accessor.component_type, COMPONENT_FLOAT);
        assert_eq!(accessor.component_count(), 3);
        assert_eq!(accessor.element_size(), 12);
        assert_eq!(accessor.byte_offset, 0);
        assert!(!accessor.normalized);
    }
}
