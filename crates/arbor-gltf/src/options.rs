//! Export and import option surfaces.

use arbor_scene::ModelUnits;
use serde::{Deserialize, Serialize};

/// How subdivision objects were meshed upstream. Carried as provenance;
/// meshing itself happens in the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SubDMode {
    /// Mesh built from the control net.
    ControlNet,
    /// Mesh built from the limit surface.
    #[default]
    Surface,
}

/// Options for writing a glTF asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Emit a single shared binary buffer (GLB) instead of base64 data
    /// URIs embedded in the JSON.
    pub binary: bool,
    /// Pretty-print JSON output (text mode only).
    pub pretty: bool,

    /// Remap the host's Z-up axes to glTF's Y-up convention.
    pub map_z_to_y: bool,
    /// Unit system of the incoming scene; positions and translations are
    /// scaled to meters.
    pub units: ModelUnits,

    pub export_materials: bool,
    /// Synthesize a flat-color material from the display color when an
    /// object has no material.
    pub use_display_color_for_unset_materials: bool,
    /// Disable all texture synthesis, forcing scalar-factor materials.
    pub export_textures: bool,

    /// Upstream subdivision meshing strategy (provenance only).
    pub sub_d_mode: SubDMode,
    /// Upstream subdivision level (provenance only).
    pub sub_d_level: u32,

    pub export_texture_coordinates: bool,
    pub export_vertex_normals: bool,
    pub export_vertex_colors: bool,
    /// Keep meshes that are not closed.
    pub export_open_meshes: bool,
    /// Group nodes under their layer hierarchy.
    pub export_layers: bool,

    pub use_draco_compression: bool,
    /// Draco compression level, 0 (fastest) to 10 (densest).
    pub draco_compression_level: u32,
    pub draco_quantization_bits_position: u32,
    pub draco_quantization_bits_normal: u32,
    pub draco_quantization_bits_texture: u32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            binary: true,
            pretty: false,
            map_z_to_y: true,
            units: ModelUnits::default(),
            export_materials: true,
            use_display_color_for_unset_materials: true,
            export_textures: true,
            sub_d_mode: SubDMode::default(),
            sub_d_level: 4,
            export_texture_coordinates: true,
            export_vertex_normals: true,
            export_vertex_colors: false,
            export_open_meshes: true,
            export_layers: false,
            use_draco_compression: false,
            draco_compression_level: 10,
            draco_quantization_bits_position: 11,
            draco_quantization_bits_normal: 8,
            draco_quantization_bits_texture: 10,
        }
    }
}

impl ExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text (.gltf) output with embedded base64 buffers.
    pub fn text(mut self) -> Self {
        self.binary = false;
        self
    }

    pub fn with_units(mut self, units: ModelUnits) -> Self {
        self.units = units;
        self
    }

    pub fn with_layers(mut self) -> Self {
        self.export_layers = true;
        self
    }

    pub fn with_draco(mut self) -> Self {
        self.use_draco_compression = true;
        self
    }
}

/// Options for reading a glTF asset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Compute vertex normals for primitives that carry none.
    pub compute_normals: bool,
}

impl ImportOptions {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_dialog() {
        let options = ExportOptions::default();
        assert!(options.binary);
        assert!(options.map_z_to_y);
        assert!(options.export_materials);
        assert!(!options.export_vertex_colors);
        assert!(!options.use_draco_compression);
        assert_eq!(options.draco_compression_level, 10);
        assert_eq!(options.draco_quantization_bits_position, 11);
        assert_eq!(options.draco_quantization_bits_normal, 8);
        assert_eq!(options.draco_quantization_bits_texture, 10);
    }
}
