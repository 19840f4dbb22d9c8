//! Import: reconstructing scene objects from a glTF asset.

use std::collections::HashSet;

use arbor_scene::{
    ChannelTexture, MaterialData, MaterialId, MeshData, ObjectId, Raster, RgbaChannel, SceneObject,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

use crate::error::{GltfError, Result};
use crate::options::ImportOptions;
use crate::schema::{self, Gltf};
use crate::texture;

/// GLB magic number "glTF".
const GLB_MAGIC: u32 = 0x4654_6C67;
/// GLB version.
const GLB_VERSION: u32 = 2;
/// JSON chunk type.
const CHUNK_JSON: u32 = 0x4E4F_534A;
/// Binary chunk type.
const CHUNK_BIN: u32 = 0x004E_4942;

/// The reconstructed scene: one object per placed primitive, each an
/// independent copy under its accumulated transform.
#[derive(Debug, Default)]
pub struct ImportedScene {
    pub objects: Vec<SceneObject>,
    pub materials: Vec<MaterialData>,
    pub generator: Option<String>,
}

/// Reads GLB and JSON glTF assets back into scene objects.
#[derive(Debug, Default)]
pub struct Importer {
    options: ImportOptions,
}

impl Importer {
    pub fn new(options: ImportOptions) -> Self {
        Self { options }
    }

    /// Quick magic-byte/shape check without parsing the whole asset.
    pub fn can_read(data: &[u8]) -> bool {
        if data.len() >= 4 {
            let magic = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
            if magic == GLB_MAGIC {
                return true;
            }
        }
        if let Ok(text) = std::str::from_utf8(data) {
            let trimmed = text.trim_start();
            return trimmed.starts_with('{') && trimmed.contains("\"asset\"");
        }
        false
    }

    /// Import an asset from raw bytes.
    pub fn import(&self, data: &[u8]) -> Result<ImportedScene> {
        let (gltf, bin_chunk) = parse_container(data)?;
        let buffers = load_buffers(&gltf, bin_chunk)?;

        let images = decode_images(&gltf, &buffers);
        let materials: Vec<MaterialData> = gltf
            .materials
            .iter()
            .enumerate()
            .map(|(index, material)| import_material(index, material, &gltf, &images))
            .collect();

        let meshes = import_meshes(&gltf, &buffers, &self.options);

        let mut scene = ImportedScene {
            objects: Vec::new(),
            materials,
            generator: gltf.asset.generator.clone(),
        };
        self.walk_hierarchy(&gltf, &meshes, &mut scene);
        Ok(scene)
    }

    /// Depth-first walk from the true roots (nodes never listed as a
    /// child), composing transforms with an explicit stack. Every
    /// mesh-bearing node contributes one placed copy per primitive.
    fn walk_hierarchy(
        &self,
        gltf: &Gltf,
        meshes: &[Vec<(MeshData, Option<usize>)>],
        scene: &mut ImportedScene,
    ) {
        let mut children = HashSet::new();
        for node in &gltf.nodes {
            for &child in &node.children {
                children.insert(child);
            }
        }

        let mut namer = UniqueNamer::default();
        let mut stack: Vec<(usize, Mat4)> = (0..gltf.nodes.len())
            .rev()
            .filter(|index| !children.contains(index))
            .map(|index| (index, Mat4::IDENTITY))
            .collect();

        while let Some((index, parent)) = stack.pop() {
            let node = match gltf.nodes.get(index) {
                Some(node) => node,
                None => continue,
            };

            let transform = parent * node_local_transform(node);

            if let Some(mesh_index) = node.mesh {
                if let Some(primitives) = meshes.get(mesh_index) {
                    for (primitive_index, (mesh, material_index)) in primitives.iter().enumerate() {
                        let name = namer.unique(node.name.as_deref());
                        scene.objects.push(SceneObject {
                            id: ObjectId(((mesh_index as u64) << 16) | primitive_index as u64),
                            name: Some(name),
                            transform,
                            material: material_index
                                .and_then(|i| scene.materials.get(i))
                                .cloned(),
                            display_color: [128, 128, 128],
                            layer: None,
                            meshes: vec![mesh.clone()],
                        });
                    }
                }
            }

            for &child in node.children.iter().rev() {
                stack.push((child, transform));
            }
        }
    }
}

/// A node's local transform: the explicit matrix when it is not the
/// identity, otherwise the TRS triple composed as T * R * S.
fn node_local_transform(node: &schema::Node) -> Mat4 {
    if let Some(matrix) = &node.matrix {
        let matrix = Mat4::from_cols_array(matrix);
        if matrix != Mat4::IDENTITY {
            return matrix;
        }
    }

    let translation = node.translation.map(Vec3::from).unwrap_or(Vec3::ZERO);
    let rotation = node
        .rotation
        .map(|r| Quat::from_xyzw(r[0], r[1], r[2], r[3]))
        .unwrap_or(Quat::IDENTITY);
    let scale = node.scale.map(Vec3::from).unwrap_or(Vec3::ONE);
    Mat4::from_scale_rotation_translation(scale, rotation, translation)
}

/// Split the container: returns the parsed JSON root and the BIN chunk
/// when present.
fn parse_container(data: &[u8]) -> Result<(Gltf, Option<Vec<u8>>)> {
    if data.len() >= 4 {
        let magic = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
        if magic == GLB_MAGIC {
            return parse_glb(data);
        }
    }
    let gltf: Gltf = serde_json::from_slice(data)?;
    Ok((gltf, None))
}

fn parse_glb(data: &[u8]) -> Result<(Gltf, Option<Vec<u8>>)> {
    if data.len() < 12 {
        return Err(GltfError::InvalidData("GLB file too short".into()));
    }

    let version = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
    if version != GLB_VERSION {
        return Err(GltfError::Unsupported(format!(
            "GLB version {} not supported",
            version
        )));
    }

    let mut offset = 12;
    let mut json_chunk: Option<&[u8]> = None;
    let mut bin_chunk: Option<&[u8]> = None;

    while offset + 8 <= data.len() {
        let chunk_length = u32::from_le_bytes([
            data[offset],
            data[offset + 1],
            data[offset + 2],
            data[offset + 3],
        ]) as usize;
        let chunk_type = u32::from_le_bytes([
            data[offset + 4],
            data[offset + 5],
            data[offset + 6],
            data[offset + 7],
        ]);
        offset += 8;

        if offset + chunk_length > data.len() {
            return Err(GltfError::InvalidData(
                "GLB chunk extends past end of file".into(),
            ));
        }

        match chunk_type {
            CHUNK_JSON => json_chunk = Some(&data[offset..offset + chunk_length]),
            CHUNK_BIN => bin_chunk = Some(&data[offset..offset + chunk_length]),
            _ => {}
        }

        offset += chunk_length;
        offset = (offset + 3) & !3;
    }

    let json_chunk =
        json_chunk.ok_or_else(|| GltfError::MissingRequired("GLB JSON chunk".into()))?;
    let gltf: Gltf = serde_json::from_slice(json_chunk)?;
    Ok((gltf, bin_chunk.map(|b| b.to_vec())))
}

/// Materialize every buffer's raw bytes.
fn load_buffers(gltf: &Gltf, bin_chunk: Option<Vec<u8>>) -> Result<Vec<Vec<u8>>> {
    let mut buffers = Vec::with_capacity(gltf.buffers.len());
    let mut bin_chunk = bin_chunk;

    for (index, buffer) in gltf.buffers.iter().enumerate() {
        match &buffer.uri {
            Some(uri) => buffers.push(decode_data_uri(uri)?),
            None if index == 0 => {
                let mut bin = bin_chunk.take().ok_or_else(|| {
                    GltfError::MissingRequired("GLB binary chunk for buffer 0".into())
                })?;
                bin.truncate(buffer.byte_length.min(bin.len()));
                buffers.push(bin);
            }
            None => {
                return Err(GltfError::InvalidData(format!(
                    "buffer {} has no data source",
                    index
                )));
            }
        }
    }

    Ok(buffers)
}

/// Decode a `data:` URI. External file URIs are not resolved here.
fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    if !uri.starts_with("data:") {
        return Err(GltfError::Unsupported(format!(
            "external buffer URI not supported: {}",
            uri
        )));
    }
    let mut parts = uri.splitn(2, ',');
    let header = parts.next().unwrap_or_default();
    let payload = parts
        .next()
        .ok_or_else(|| GltfError::InvalidData("malformed data URI".into()))?;
    if !header.contains(";base64") {
        return Err(GltfError::Unsupported(
            "URL-encoded data URIs not supported".into(),
        ));
    }
    Ok(STANDARD.decode(payload)?)
}

/// Decode every image into a raster. A broken image becomes `None`
/// rather than aborting the import.
fn decode_images(gltf: &Gltf, buffers: &[Vec<u8>]) -> Vec<Option<Raster>> {
    gltf.images
        .iter()
        .map(|image| {
            let bytes = if let Some(uri) = &image.uri {
                decode_data_uri(uri).ok()
            } else {
                image
                    .buffer_view
                    .and_then(|view| buffer_view_bytes(gltf, buffers, view).map(<[u8]>::to_vec))
            };
            bytes.and_then(|b| match texture::decode_image(&b) {
                Ok(raster) => Some(raster),
                Err(e) => {
                    log::warn!("undecodable image skipped: {e}");
                    None
                }
            })
        })
        .collect()
}

/// The raster behind a texture index, if everything resolves.
fn texture_raster(gltf: &Gltf, images: &[Option<Raster>], texture_index: usize) -> Option<Raster> {
    let texture = gltf.textures.get(texture_index)?;
    images.get(texture.source?)?.clone()
}

/// Map one glTF material back onto `MaterialData`, splitting the
/// combined metallic-roughness texture into its two grayscale sources.
fn import_material(
    index: usize,
    material: &schema::Material,
    gltf: &Gltf,
    images: &[Option<Raster>],
) -> MaterialData {
    let mut out = MaterialData::new(
        MaterialId(index as u64),
        material.name.clone().unwrap_or_default(),
    );

    if let Some(pbr) = &material.pbr_metallic_roughness {
        out.base_color = Vec4::from(pbr.base_color_factor);
        out.alpha = pbr.base_color_factor[3];
        out.metallic = pbr.metallic_factor;
        out.roughness = pbr.roughness_factor;

        if let Some(info) = &pbr.base_color_texture {
            if let Some(raster) = texture_raster(gltf, images, info.index) {
                out.textures.base_color = Some(ChannelTexture::memory(raster));
            }
        }

        if let Some(info) = &pbr.metallic_roughness_texture {
            if let Some(raster) = texture_raster(gltf, images, info.index) {
                // roughness rides green, metalness rides blue
                out.textures.roughness =
                    Some(ChannelTexture::memory(raster.extract_channel(RgbaChannel::Green, false)));
                out.textures.metallic =
                    Some(ChannelTexture::memory(raster.extract_channel(RgbaChannel::Blue, false)));
            }
        }
    }

    if let Some(info) = &material.normal_texture {
        if let Some(raster) = texture_raster(gltf, images, info.index) {
            let mut channel = ChannelTexture::memory(raster);
            channel.amount = info.scale;
            out.textures.normal = Some(channel);
        }
    }

    if let Some(info) = &material.occlusion_texture {
        if let Some(raster) = texture_raster(gltf, images, info.index) {
            let mut channel = ChannelTexture::memory(raster);
            channel.amount = info.strength;
            out.textures.occlusion = Some(channel);
        }
    }

    if let Some(info) = &material.emissive_texture {
        if let Some(raster) = texture_raster(gltf, images, info.index) {
            out.textures.emission = Some(ChannelTexture::memory(raster));
        }
    }
    out.emission = material.emissive_factor;

    if let Some(extensions) = &material.extensions {
        if let Some(transmission) = &extensions.transmission {
            out.opacity = 1.0 - transmission.transmission_factor;
            if let Some(info) = &transmission.transmission_texture {
                if let Some(raster) = texture_raster(gltf, images, info.index) {
                    let mut channel = ChannelTexture::memory(
                        raster.extract_channel(RgbaChannel::Red, true),
                    );
                    channel.amount = transmission.transmission_factor;
                    out.textures.opacity = Some(channel);
                }
            }
        }

        if let Some(clearcoat) = &extensions.clearcoat {
            out.clearcoat = clearcoat.clearcoat_factor;
            out.clearcoat_roughness = clearcoat.clearcoat_roughness_factor;
            if let Some(info) = &clearcoat.clearcoat_texture {
                if let Some(raster) = texture_raster(gltf, images, info.index) {
                    out.textures.clearcoat = Some(ChannelTexture::memory(raster));
                }
            }
            if let Some(info) = &clearcoat.clearcoat_roughness_texture {
                if let Some(raster) = texture_raster(gltf, images, info.index) {
                    out.textures.clearcoat_roughness = Some(ChannelTexture::memory(raster));
                }
            }
            if let Some(info) = &clearcoat.clearcoat_normal_texture {
                if let Some(raster) = texture_raster(gltf, images, info.index) {
                    let mut channel = ChannelTexture::memory(raster);
                    channel.amount = info.scale;
                    out.textures.clearcoat_normal = Some(channel);
                }
            }
        }

        if let Some(ior) = &extensions.ior {
            out.ior = ior.ior;
        }

        if let Some(specular) = &extensions.specular {
            out.specular = specular.specular_factor;
            if let Some(info) = &specular.specular_texture {
                if let Some(raster) = texture_raster(gltf, images, info.index) {
                    let mut channel = ChannelTexture::memory(
                        raster.extract_channel(RgbaChannel::Red, false),
                    );
                    channel.amount = specular.specular_factor;
                    out.textures.specular = Some(channel);
                }
            }
        }
    }

    out
}

/// Decode every mesh into per-primitive `MeshData` plus its material
/// index. Unsupported or unresolvable primitives are skipped.
fn import_meshes(
    gltf: &Gltf,
    buffers: &[Vec<u8>],
    options: &ImportOptions,
) -> Vec<Vec<(MeshData, Option<usize>)>> {
    gltf.meshes
        .iter()
        .map(|mesh| {
            let mut primitives = Vec::new();
            for primitive in &mesh.primitives {
                if primitive.mode != schema::MODE_TRIANGLES {
                    continue;
                }

                let positions = match primitive
                    .attributes
                    .get(schema::POSITION_ATTRIBUTE)
                    .and_then(|&a| read_vec3(gltf, buffers, a))
                {
                    Some(positions) => positions,
                    None => continue,
                };

                let indices = match primitive.indices {
                    Some(accessor) => match read_indices(gltf, buffers, accessor) {
                        Some(indices) => indices,
                        None => continue,
                    },
                    None => (0..positions.len() as u32).collect(),
                };

                let mut mesh_data = MeshData::from_triangles(positions, &indices);

                if let Some(&accessor) = primitive.attributes.get(schema::NORMAL_ATTRIBUTE) {
                    if let Some(normals) = read_vec3(gltf, buffers, accessor) {
                        mesh_data.normals = normals;
                    }
                }
                if let Some(&accessor) = primitive.attributes.get(schema::TEXCOORD0_ATTRIBUTE) {
                    if let Some(texcoords) = read_vec2(gltf, buffers, accessor) {
                        mesh_data.texcoords = texcoords;
                    }
                }
                if let Some(&accessor) = primitive.attributes.get(schema::COLOR0_ATTRIBUTE) {
                    if let Some(colors) = read_vec4(gltf, buffers, accessor) {
                        mesh_data.colors = colors;
                    }
                }

                if mesh_data.normals.is_empty() && options.compute_normals {
                    mesh_data.compute_normals();
                }

                primitives.push((mesh_data, primitive.material));
            }
            primitives
        })
        .collect()
}

/// Raw bytes behind a buffer view, bounds-checked.
fn buffer_view_bytes<'a>(
    gltf: &Gltf,
    buffers: &'a [Vec<u8>],
    view_index: usize,
) -> Option<&'a [u8]> {
    let view = gltf.buffer_views.get(view_index)?;
    let buffer = buffers.get(view.buffer)?;
    let end = view.byte_offset.checked_add(view.byte_length)?;
    buffer.get(view.byte_offset..end)
}

/// Resolve an accessor to its backing bytes, start offset and stride.
fn accessor_region<'a>(
    gltf: &'a Gltf,
    buffers: &'a [Vec<u8>],
    accessor_index: usize,
) -> Option<(&'a schema::Accessor, &'a [u8], usize)> {
    let accessor = gltf.accessors.get(accessor_index)?;
    let view_index = accessor.buffer_view?;
    let view = gltf.buffer_views.get(view_index)?;
    let buffer = buffers.get(view.buffer)?;

    let start = view.byte_offset.checked_add(accessor.byte_offset)?;
    let stride = view.byte_stride.unwrap_or_else(|| accessor.element_size());
    let needed = match accessor.count {
        0 => 0,
        count => (count - 1).checked_mul(stride)?.checked_add(accessor.element_size())?,
    };
    let end = start.checked_add(needed)?;
    Some((accessor, buffer.get(start..end)?, stride))
}

fn read_f32(bytes: &[u8], offset: usize) -> Option<f32> {
    let slice = bytes.get(offset..offset + 4)?;
    Some(f32::from_le_bytes([slice[0], slice[1], slice[2], slice[3]]))
}

fn read_vec3(gltf: &Gltf, buffers: &[Vec<u8>], accessor_index: usize) -> Option<Vec<Vec3>> {
    let (accessor, bytes, stride) = accessor_region(gltf, buffers, accessor_index)?;
    if accessor.accessor_type != "VEC3" || accessor.component_type != schema::COMPONENT_FLOAT {
        return None;
    }

    let mut values = Vec::with_capacity(accessor.count);
    for i in 0..accessor.count {
        let offset = i * stride;
        values.push(Vec3::new(
            read_f32(bytes, offset)?,
            read_f32(bytes, offset + 4)?,
            read_f32(bytes, offset + 8)?,
        ));
    }
    Some(values)
}

fn read_vec2(gltf: &Gltf, buffers: &[Vec<u8>], accessor_index: usize) -> Option<Vec<Vec2>> {
    let (accessor, bytes, stride) = accessor_region(gltf, buffers, accessor_index)?;
    if accessor.accessor_type != "VEC2" || accessor.component_type != schema::COMPONENT_FLOAT {
        return None;
    }

    let mut values = Vec::with_capacity(accessor.count);
    for i in 0..accessor.count {
        let offset = i * stride;
        values.push(Vec2::new(
            read_f32(bytes, offset)?,
            read_f32(bytes, offset + 4)?,
        ));
    }
    Some(values)
}

fn read_vec4(gltf: &Gltf, buffers: &[Vec<u8>], accessor_index: usize) -> Option<Vec<Vec4>> {
    let (accessor, bytes, stride) = accessor_region(gltf, buffers, accessor_index)?;
    if accessor.accessor_type != "VEC4" {
        return None;
    }

    let mut values = Vec::with_capacity(accessor.count);
    for i in 0..accessor.count {
        let offset = i * stride;
        let value = match accessor.component_type {
            schema::COMPONENT_FLOAT => Vec4::new(
                read_f32(bytes, offset)?,
                read_f32(bytes, offset + 4)?,
                read_f32(bytes, offset + 8)?,
                read_f32(bytes, offset + 12)?,
            ),
            schema::COMPONENT_UNSIGNED_BYTE => {
                let slice = bytes.get(offset..offset + 4)?;
                let scale = if accessor.normalized { 255.0 } else { 1.0 };
                Vec4::new(
                    slice[0] as f32 / scale,
                    slice[1] as f32 / scale,
                    slice[2] as f32 / scale,
                    slice[3] as f32 / scale,
                )
            }
            schema::COMPONENT_UNSIGNED_SHORT => {
                let slice = bytes.get(offset..offset + 8)?;
                let scale = if accessor.normalized { 65535.0 } else { 1.0 };
                Vec4::new(
                    u16::from_le_bytes([slice[0], slice[1]]) as f32 / scale,
                    u16::from_le_bytes([slice[2], slice[3]]) as f32 / scale,
                    u16::from_le_bytes([slice[4], slice[5]]) as f32 / scale,
                    u16::from_le_bytes([slice[6], slice[7]]) as f32 / scale,
                )
            }
            _ => return None,
        };
        values.push(value);
    }
    Some(values)
}

fn read_indices(gltf: &Gltf, buffers: &[Vec<u8>], accessor_index: usize) -> Option<Vec<u32>> {
    let (accessor, bytes, stride) = accessor_region(gltf, buffers, accessor_index)?;
    if accessor.accessor_type != "SCALAR" {
        return None;
    }

    let mut values = Vec::with_capacity(accessor.count);
    for i in 0..accessor.count {
        let offset = i * stride;
        let value = match accessor.component_type {
            schema::COMPONENT_UNSIGNED_BYTE => *bytes.get(offset)? as u32,
            schema::COMPONENT_UNSIGNED_SHORT => {
                let slice = bytes.get(offset..offset + 2)?;
                u16::from_le_bytes([slice[0], slice[1]]) as u32
            }
            schema::COMPONENT_UNSIGNED_INT => {
                let slice = bytes.get(offset..offset + 4)?;
                u32::from_le_bytes([slice[0], slice[1], slice[2], slice[3]])
            }
            _ => return None,
        };
        values.push(value);
    }
    Some(values)
}

/// Hands out names that are unique for the life of one import.
#[derive(Debug, Default)]
struct UniqueNamer {
    used: HashSet<String>,
    counter: usize,
}

impl UniqueNamer {
    fn unique(&mut self, name: Option<&str>) -> String {
        let mut name = match name {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => "Unnamed".to_string(),
        };
        while self.used.contains(&name) {
            name = format!("{}-{}", name, self.counter);
            self.counter += 1;
        }
        self.used.insert(name.clone());
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ExportOptions;
    use crate::writer::Exporter;
    use arbor_scene::{MeshFace, ModelUnits};

    fn triangle_object(id: u64) -> SceneObject {
        SceneObject::new(ObjectId(id))
            .with_name("Triangle")
            .with_mesh(MeshData {
                positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
                faces: vec![MeshFace::Triangle([0, 1, 2])],
                closed: true,
                ..Default::default()
            })
    }

    #[test]
    fn test_can_read() {
        assert!(Importer::can_read(b"glTF\x02\x00\x00\x00"));
        assert!(Importer::can_read(br#"{"asset": {"version": "2.0"}}"#));
        assert!(!Importer::can_read(b"random bytes"));
    }

    #[test]
    fn test_decode_data_uri() {
        let decoded =
            decode_data_uri("data:application/octet-stream;base64,SGVsbG8=").unwrap();
        assert_eq!(decoded, b"Hello");

        assert!(decode_data_uri("file://buffer.bin").is_err());
    }

    #[test]
    fn test_minimal_json_asset() {
        let json = br#"{
            "asset": {"version": "2.0", "generator": "test"},
            "scenes": [{"nodes": [0]}],
            "nodes": [{"name": "Empty"}]
        }"#;

        let scene = Importer::default().import(json).unwrap();
        assert_eq!(scene.generator.as_deref(), Some("test"));
        assert!(scene.objects.is_empty());
    }

    #[test]
    fn test_glb_roundtrip_counts() {
        let exporter = Exporter::new(ExportOptions::default());
        let glb = exporter.export_bytes(&[triangle_object(1)]).unwrap();

        let scene = Importer::default().import(&glb).unwrap();
        assert_eq!(scene.objects.len(), 1);

        let mesh = &scene.objects[0].meshes[0];
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangulated_indices(), vec![0, 1, 2]);
    }

    #[test]
    fn test_two_nodes_one_mesh_yield_two_copies() {
        let exporter = Exporter::new(ExportOptions {
            units: ModelUnits::Meters,
            ..Default::default()
        });
        let first = triangle_object(7);
        let mut second = triangle_object(7);
        second.transform = Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0));

        let glb = exporter.export_bytes(&[first, second]).unwrap();
        let scene = Importer::default().import(&glb).unwrap();

        assert_eq!(scene.objects.len(), 2);
        assert_ne!(scene.objects[0].transform, scene.objects[1].transform);
        // same source identity, independent geometry copies
        assert_eq!(scene.objects[0].id, scene.objects[1].id);
        assert_eq!(
            scene.objects[0].meshes[0].positions,
            scene.objects[1].meshes[0].positions
        );
    }

    #[test]
    fn test_matrix_preferred_over_trs_when_not_identity() {
        let node = schema::Node {
            matrix: Some(Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)).to_cols_array()),
            translation: Some([5.0, 5.0, 5.0]),
            ..Default::default()
        };
        let transform = node_local_transform(&node);
        assert_eq!(transform.w_axis, Vec4::new(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_identity_matrix_falls_back_to_trs() {
        let node = schema::Node {
            matrix: Some(Mat4::IDENTITY.to_cols_array()),
            translation: Some([5.0, 0.0, 0.0]),
            ..Default::default()
        };
        let transform = node_local_transform(&node);
        assert_eq!(transform.w_axis, Vec4::new(5.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_trs_composition_order() {
        let node = schema::Node {
            translation: Some([1.0, 0.0, 0.0]),
            scale: Some([2.0, 2.0, 2.0]),
            ..Default::default()
        };
        let transform = node_local_transform(&node);
        // T * S: point at origin lands at the translation
        let origin = transform.transform_point3(Vec3::ZERO);
        assert_eq!(origin, Vec3::new(1.0, 0.0, 0.0));
        // unit X is scaled then translated
        let unit_x = transform.transform_point3(Vec3::X);
        assert_eq!(unit_x, Vec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn test_out_of_range_accessor_is_skipped() {
        let json = br#"{
            "asset": {"version": "2.0"},
            "scenes": [{"nodes": [0]}],
            "nodes": [{"mesh": 0}],
            "meshes": [{
                "primitives": [{"attributes": {"POSITION": 99}}]
            }]
        }"#;

        let scene = Importer::default().import(json).unwrap();
        assert!(scene.objects.is_empty());
    }

    #[test]
    fn test_out_of_range_material_is_dropped() {
        let exporter = Exporter::new(ExportOptions::default());
        let glb = exporter.export_bytes(&[triangle_object(1)]).unwrap();
        let (mut gltf, bin) = parse_container(&glb).unwrap();
        for mesh in &mut gltf.meshes {
            for primitive in &mut mesh.primitives {
                primitive.material = Some(99);
            }
        }

        let buffers = load_buffers(&gltf, bin).unwrap();
        let meshes = import_meshes(&gltf, &buffers, &ImportOptions::default());
        assert!(meshes[0][0].1.is_some());

        // a dangling material index must not panic and yields no
        // material on the placed object
        let mut scene = ImportedScene::default();
        Importer::default().walk_hierarchy(&gltf, &meshes, &mut scene);
        assert_eq!(scene.objects.len(), 1);
        assert!(scene.objects[0].material.is_none());
    }

    #[test]
    fn test_u16_indices_widened() {
        let positions: Vec<u8> = [0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.5, 1.0, 0.0]
            .iter()
            .flat_map(|f| f.to_le_bytes())
            .collect();
        let indices: Vec<u8> = [0u16, 1, 2].iter().flat_map(|i| i.to_le_bytes()).collect();
        let mut payload = positions.clone();
        payload.extend(&indices);

        let json = format!(
            r#"{{
                "asset": {{"version": "2.0"}},
                "scenes": [{{"nodes": [0]}}],
                "nodes": [{{"mesh": 0, "name": "Tri"}}],
                "meshes": [{{"primitives": [{{"attributes": {{"POSITION": 0}}, "indices": 1}}]}}],
                "accessors": [
                    {{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3"}},
                    {{"bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR"}}
                ],
                "bufferViews": [
                    {{"buffer": 0, "byteOffset": 0, "byteLength": 36}},
                    {{"buffer": 0, "byteOffset": 36, "byteLength": 6}}
                ],
                "buffers": [{{"byteLength": 42, "uri": "data:application/octet-stream;base64,{}"}}]
            }}"#,
            STANDARD.encode(&payload)
        );

        let scene = Importer::default().import(json.as_bytes()).unwrap();
        assert_eq!(scene.objects.len(), 1);
        assert_eq!(
            scene.objects[0].meshes[0].triangulated_indices(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn test_metallic_roughness_split() {
        // gray so the metal channel's luminance is exactly 0.25
        let mut combined = Raster::new(2, 2);
        for y in 0..2 {
            for x in 0..2 {
                combined.set(x, y, [0.25, 0.25, 0.25, 1.0]);
            }
        }

        // export a material carrying the combined texture, then re-import
        let mut material = MaterialData::new(MaterialId(1), "combined");
        material.textures.metallic = Some(ChannelTexture::memory(combined));
        let object = triangle_object(1).with_material(material);

        let exporter = Exporter::new(ExportOptions::default());
        let glb = exporter.export_bytes(&[object]).unwrap();
        let scene = Importer::default().import(&glb).unwrap();

        let imported = &scene.materials[0];
        let metal = imported.textures.metallic.as_ref().unwrap();
        let rough = imported.textures.roughness.as_ref().unwrap();

        let metal_raster = match &metal.source {
            arbor_scene::TextureSource::Memory(raster) => raster,
            _ => panic!("expected in-memory raster"),
        };
        let rough_raster = match &rough.source {
            arbor_scene::TextureSource::Memory(raster) => raster,
            _ => panic!("expected in-memory raster"),
        };

        // blue (metal luminance 0.25) and green (roughness default 1.0)
        assert!((metal_raster.get(0, 0)[0] - 0.25).abs() < 0.02);
        assert!((rough_raster.get(0, 0)[0] - 1.0).abs() < 0.02);
    }

    #[test]
    fn test_extension_factors_roundtrip() {
        let mut material = MaterialData::new(MaterialId(3), "glass");
        material.opacity = 0.25;
        material.ior = 1.45;
        material.clearcoat = 0.8;
        material.specular = 0.3;
        let object = triangle_object(1).with_material(material);

        let exporter = Exporter::new(ExportOptions::default());
        let glb = exporter.export_bytes(&[object]).unwrap();
        let scene = Importer::default().import(&glb).unwrap();

        let imported = &scene.materials[0];
        assert!((imported.opacity - 0.25).abs() < 1e-6);
        assert!((imported.ior - 1.45).abs() < 1e-6);
        assert!((imported.clearcoat - 0.8).abs() < 1e-6);
        assert!((imported.specular - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_unique_namer() {
        let mut namer = UniqueNamer::default();
        assert_eq!(namer.unique(Some("Box")), "Box");
        assert_eq!(namer.unique(Some("Box")), "Box-0");
        assert_eq!(namer.unique(None), "Unnamed");
        assert_eq!(namer.unique(Some("")), "Unnamed-1");
    }

    #[test]
    fn test_compute_normals_option() {
        let exporter = Exporter::new(ExportOptions::default());
        let glb = exporter.export_bytes(&[triangle_object(1)]).unwrap();

        let without = Importer::default().import(&glb).unwrap();
        assert!(without.objects[0].meshes[0].normals.is_empty());

        let with = Importer::new(ImportOptions {
            compute_normals: true,
        })
        .import(&glb)
        .unwrap();
        assert_eq!(with.objects[0].meshes[0].normals.len(), 3);
    }
}
