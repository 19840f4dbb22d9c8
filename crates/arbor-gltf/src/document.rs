//! The single owned document accumulator.
//!
//! One `DocumentBuilder` is created per export call and passed by
//! exclusive reference through the encoder stages. Every list in the
//! underlying document is append-only; indices handed out never change.

use arbor_scene::Raster;

use crate::buffer::{BufferSink, BufferSlot};
use crate::error::Result;
use crate::options::ExportOptions;
use crate::schema::{
    self, Buffer, BufferView, DracoMeshCompression, MaterialsClearcoat, MaterialsIor,
    MaterialsSpecular, MaterialsTransmission,
};
use crate::texture;

/// Accumulates the glTF document and its binary payload during export.
#[derive(Debug)]
pub struct DocumentBuilder {
    pub gltf: schema::Gltf,
    pub sink: BufferSink,
}

impl DocumentBuilder {
    /// Create a builder with the fixed document preamble: asset record,
    /// scene 0, the shared sampler, and the extension tag sets.
    pub fn new(options: &ExportOptions) -> Self {
        let mut gltf = schema::Gltf {
            asset: schema::Asset {
                generator: Some("arbor-gltf".to_string()),
                ..Default::default()
            },
            scene: Some(0),
            scenes: vec![schema::Scene::default()],
            ..Default::default()
        };

        gltf.samplers.push(schema::Sampler {
            min_filter: Some(schema::FILTER_LINEAR),
            mag_filter: Some(schema::FILTER_LINEAR),
            wrap_s: schema::WRAP_REPEAT,
            wrap_t: schema::WRAP_REPEAT,
        });

        if options.use_draco_compression {
            gltf.extensions_used
                .push(DracoMeshCompression::TAG.to_string());
            gltf.extensions_required
                .push(DracoMeshCompression::TAG.to_string());
        }

        gltf.extensions_used
            .push(MaterialsTransmission::TAG.to_string());
        gltf.extensions_used
            .push(MaterialsClearcoat::TAG.to_string());
        gltf.extensions_used.push(MaterialsIor::TAG.to_string());
        gltf.extensions_used
            .push(MaterialsSpecular::TAG.to_string());

        Self {
            gltf,
            sink: BufferSink::new(options.binary),
        }
    }

    /// Append a node and return its index.
    pub fn push_node(&mut self, node: schema::Node) -> usize {
        self.gltf.nodes.push(node);
        self.gltf.nodes.len() - 1
    }

    /// Append a mesh and return its index.
    pub fn push_mesh(&mut self, mesh: schema::Mesh) -> usize {
        self.gltf.meshes.push(mesh);
        self.gltf.meshes.len() - 1
    }

    /// Append a material and return its index.
    pub fn push_material(&mut self, material: schema::Material) -> usize {
        self.gltf.materials.push(material);
        self.gltf.materials.len() - 1
    }

    /// Append an accessor and return its index.
    pub fn push_accessor(&mut self, accessor: schema::Accessor) -> usize {
        self.gltf.accessors.push(accessor);
        self.gltf.accessors.len() - 1
    }

    /// Add a node index to the scene's root list.
    pub fn push_scene_root(&mut self, node_index: usize) {
        self.gltf.scenes[0].nodes.push(node_index);
    }

    /// Store a naturally aligned numeric stream and register a buffer
    /// view over it.
    pub fn add_stream_view(&mut self, bytes: &[u8], target: u32) -> usize {
        let slot = self.sink.append(bytes);
        self.push_view(slot, Some(target))
    }

    /// Store an opaque block (4-byte padded) and register a buffer view
    /// over it.
    pub fn add_opaque_view(&mut self, bytes: &[u8]) -> usize {
        let slot = self.sink.append_opaque(bytes);
        self.push_view(slot, None)
    }

    fn push_view(&mut self, slot: BufferSlot, target: Option<u32>) -> usize {
        self.gltf.buffer_views.push(BufferView {
            buffer: slot.buffer,
            byte_offset: slot.offset,
            byte_length: slot.length,
            byte_stride: None,
            target,
        });
        self.gltf.buffer_views.len() - 1
    }

    /// PNG-encode a raster, store it, and register image + texture
    /// records. Returns the texture index.
    pub fn add_raster_texture(&mut self, raster: &Raster) -> Result<usize> {
        let png = texture::encode_png(raster)?;
        let view = self.add_opaque_view(&png);

        self.gltf.images.push(schema::Image {
            uri: None,
            mime_type: Some("image/png".to_string()),
            buffer_view: Some(view),
            name: None,
        });
        let image_index = self.gltf.images.len() - 1;

        self.gltf.textures.push(schema::Texture {
            sampler: Some(0),
            source: Some(image_index),
            name: None,
        });
        Ok(self.gltf.textures.len() - 1)
    }

    /// Finish the document. Binary mode appends the single trailing
    /// buffer record describing the shared blob; nothing is mutated
    /// afterwards.
    pub fn finish(mut self) -> (schema::Gltf, Vec<u8>) {
        let binary = self.sink.is_binary();
        let (buffers, blob) = self.sink.into_parts();
        self.gltf.buffers = buffers;

        if binary && !blob.is_empty() {
            self.gltf.buffers.push(Buffer {
                byte_length: blob.len(),
                uri: None,
            });
        }

        (self.gltf, blob)
    }
}
