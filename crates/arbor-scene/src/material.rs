//! Physically based material data resolved by the host.

use std::path::PathBuf;

use glam::Vec4;
use serde::{Deserialize, Serialize};

use crate::raster::Raster;

/// Stable identity of a host material, used for deduplication across
/// placed objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialId(pub u64);

/// Where a texture channel's pixels come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TextureSource {
    /// An image file on disk.
    File(PathBuf),
    /// An in-memory raster (produced by the importer).
    Memory(Raster),
}

/// One texture channel of a material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelTexture {
    /// Pixel source.
    pub source: TextureSource,
    /// Blend amount, the scalar weight the channel contributes.
    pub amount: f32,
    /// Whether the channel participates in export.
    pub enabled: bool,
    /// Whether the pixels are in linear color space. Resolved by the
    /// host at the collaborator boundary; linear base colors get gamma
    /// pre-processing on export.
    pub linear: bool,
}

impl ChannelTexture {
    /// A fully weighted, enabled channel backed by a file.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            source: TextureSource::File(path.into()),
            amount: 1.0,
            enabled: true,
            linear: false,
        }
    }

    /// A fully weighted, enabled channel backed by an in-memory raster.
    pub fn memory(raster: Raster) -> Self {
        Self {
            source: TextureSource::Memory(raster),
            amount: 1.0,
            enabled: true,
            linear: false,
        }
    }
}

/// The set of texture channels a material may carry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialTextures {
    pub base_color: Option<ChannelTexture>,
    pub alpha: Option<ChannelTexture>,
    pub metallic: Option<ChannelTexture>,
    pub roughness: Option<ChannelTexture>,
    pub normal: Option<ChannelTexture>,
    pub occlusion: Option<ChannelTexture>,
    pub emission: Option<ChannelTexture>,
    pub opacity: Option<ChannelTexture>,
    pub clearcoat: Option<ChannelTexture>,
    pub clearcoat_roughness: Option<ChannelTexture>,
    pub clearcoat_normal: Option<ChannelTexture>,
    pub specular: Option<ChannelTexture>,
}

/// Color pre-processing settings from the host's rendering pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearWorkflow {
    /// Whether colors must be gamma-corrected before export.
    pub pre_process_colors: bool,
    /// Gamma exponent applied when pre-processing is on.
    pub gamma: f32,
}

impl Default for LinearWorkflow {
    fn default() -> Self {
        Self {
            pre_process_colors: false,
            gamma: 2.2,
        }
    }
}

/// A host material in physically based form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialData {
    /// Identity used for material deduplication.
    pub id: MaterialId,
    /// Display name.
    pub name: String,
    /// Base color RGBA factor.
    pub base_color: Vec4,
    /// Base color alpha multiplier.
    pub alpha: f32,
    /// Whether the base color texture's alpha drives transparency.
    pub use_base_color_alpha: bool,
    pub metallic: f32,
    pub roughness: f32,
    /// Emission color.
    pub emission: [f32; 3],
    /// Emission multiplier applied when an emission texture is present.
    pub emission_multiplier: f32,
    /// Opacity in `[0, 1]`; transmission is its inverse.
    pub opacity: f32,
    /// Index of refraction.
    pub ior: f32,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
    pub specular: f32,
    /// Texture channels.
    pub textures: MaterialTextures,
    /// Linear-workflow settings active for this material.
    pub workflow: LinearWorkflow,
}

impl Default for MaterialData {
    fn default() -> Self {
        Self {
            id: MaterialId(0),
            name: String::new(),
            base_color: Vec4::ONE,
            alpha: 1.0,
            use_base_color_alpha: false,
            metallic: 0.0,
            roughness: 1.0,
            emission: [0.0, 0.0, 0.0],
            emission_multiplier: 1.0,
            opacity: 1.0,
            ior: 1.52,
            clearcoat: 0.0,
            clearcoat_roughness: 0.0,
            specular: 0.5,
            textures: MaterialTextures::default(),
            workflow: LinearWorkflow::default(),
        }
    }
}

impl MaterialData {
    /// Create a material with the given identity and name.
    pub fn new(id: MaterialId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Default::default()
        }
    }

    /// Create a plain colored material.
    pub fn colored(id: MaterialId, name: impl Into<String>, color: Vec4) -> Self {
        Self {
            id,
            name: name.into(),
            base_color: color,
            ..Default::default()
        }
    }
}
