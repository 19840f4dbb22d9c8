//! Typed KHR extension blocks.
//!
//! Each extension this pipeline emits is a closed struct with its own
//! serialization rules; factors sitting at their specification defaults
//! are omitted from the output.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{NormalTextureInfo, TextureInfo};

/// The extension set attached to a material.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterialExtensions {
    #[serde(
        rename = "KHR_materials_transmission",
        skip_serializing_if = "Option::is_none"
    )]
    pub transmission: Option<MaterialsTransmission>,
    #[serde(
        rename = "KHR_materials_clearcoat",
        skip_serializing_if = "Option::is_none"
    )]
    pub clearcoat: Option<MaterialsClearcoat>,
    #[serde(rename = "KHR_materials_ior", skip_serializing_if = "Option::is_none")]
    pub ior: Option<MaterialsIor>,
    #[serde(
        rename = "KHR_materials_specular",
        skip_serializing_if = "Option::is_none"
    )]
    pub specular: Option<MaterialsSpecular>,
}

/// The extension set attached to a mesh primitive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrimitiveExtensions {
    #[serde(
        rename = "KHR_draco_mesh_compression",
        skip_serializing_if = "Option::is_none"
    )]
    pub draco: Option<DracoMeshCompression>,
}

/// `KHR_materials_transmission`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialsTransmission {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub transmission_factor: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transmission_texture: Option<TextureInfo>,
}

impl MaterialsTransmission {
    pub const TAG: &'static str = "KHR_materials_transmission";
}

/// `KHR_materials_clearcoat`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialsClearcoat {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub clearcoat_factor: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clearcoat_texture: Option<TextureInfo>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub clearcoat_roughness_factor: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clearcoat_roughness_texture: Option<TextureInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clearcoat_normal_texture: Option<NormalTextureInfo>,
}

impl MaterialsClearcoat {
    pub const TAG: &'static str = "KHR_materials_clearcoat";
}

/// `KHR_materials_ior`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialsIor {
    #[serde(default = "default_ior")]
    pub ior: f32,
}

impl MaterialsIor {
    pub const TAG: &'static str = "KHR_materials_ior";
}

impl Default for MaterialsIor {
    fn default() -> Self {
        Self { ior: default_ior() }
    }
}

fn default_ior() -> f32 {
    1.5
}

/// `KHR_materials_specular`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialsSpecular {
    #[serde(default = "default_one", skip_serializing_if = "is_one")]
    pub specular_factor: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specular_texture: Option<TextureInfo>,
    #[serde(default = "default_white", skip_serializing_if = "is_white")]
    pub specular_color_factor: [f32; 3],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specular_color_texture: Option<TextureInfo>,
}

impl MaterialsSpecular {
    pub const TAG: &'static str = "KHR_materials_specular";
}

impl Default for MaterialsSpecular {
    fn default() -> Self {
        Self {
            specular_factor: default_one(),
            specular_texture: None,
            specular_color_factor: default_white(),
            specular_color_texture: None,
        }
    }
}

/// `KHR_draco_mesh_compression`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DracoMeshCompression {
    /// Buffer view holding the compressed stream.
    pub buffer_view: usize,
    /// Attribute name to compressed-attribute id.
    pub attributes: IndexMap<String, usize>,
}

impl DracoMeshCompression {
    pub const TAG: &'static str = "KHR_draco_mesh_compression";
}

fn is_zero(value: &f32) -> bool {
    *value == 0.0
}

fn default_one() -> f32 {
    1.0
}

fn is_one(value: &f32) -> bool {
    *value == 1.0
}

fn default_white() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn is_white(value: &[f32; 3]) -> bool {
    *value == [1.0, 1.0, 1.0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_factors_omitted() {
        let transmission = MaterialsTransmission {
            transmission_factor: 0.0,
            transmission_texture: None,
        };
        assert_eq!(serde_json::to_string(&transmission).unwrap(), "{}");

        let transmission = MaterialsTransmission {
            transmission_factor: 0.25,
            transmission_texture: None,
        };
        assert_eq!(
            serde_json::to_string(&transmission).unwrap(),
            "{\"transmissionFactor\":0.25}"
        );
    }

    #[test]
    fn test_extension_block_tags() {
        let extensions = MaterialExtensions {
            ior: Some(MaterialsIor { ior: 1.52 }),
            ..Default::default()
        };
        let json = serde_json::to_string(&extensions).unwrap();
        assert!(json.contains("KHR_materials_ior"));
        assert!(!json.contains("KHR_materials_clearcoat"));
    }

    #[test]
    fn test_draco_attribute_order_is_stable() {
        let mut draco = DracoMeshCompression {
            buffer_view: 3,
            attributes: IndexMap::new(),
        };
        draco.attributes.insert("POSITION".to_string(), 0);
        draco.attributes.insert("NORMAL".to_string(), 1);

        let json = serde_json::to_string(&draco).unwrap();
        let position = json.find("POSITION").unwrap();
        let normal = json.find("NORMAL").unwrap();
        assert!(position < normal);
    }

    #[test]
    fn test_specular_roundtrip() {
        let json = r#"{"specularFactor":0.5,"specularTexture":{"index":2}}"#;
        let specular: MaterialsSpecular = serde_json::from_str(json).unwrap();
        assert_eq!(specular.specular_factor, 0.5);
        assert_eq!(specular.specular_texture.unwrap().index, 2);
        assert_eq!(specular.specular_color_factor, [1.0, 1.0, 1.0]);
    }
}
