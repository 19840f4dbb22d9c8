//! Mesh encoding: attribute packing, accessor bookkeeping and the
//! compressed-geometry branch.

use std::collections::HashMap;

use arbor_scene::{MeshData, ObjectId, SceneObject};
use indexmap::IndexMap;

use crate::document::DocumentBuilder;
use crate::draco::{self, DracoGeometry, DracoInput, DracoSettings};
use crate::error::Result;
use crate::options::ExportOptions;
use crate::schema::{
    self, Accessor, DracoMeshCompression, Primitive, PrimitiveExtensions,
};

/// Encodes one glTF mesh per distinct object identity.
#[derive(Debug, Default)]
pub struct MeshEncoder {
    by_object: HashMap<ObjectId, usize>,
}

impl MeshEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the mesh index for an object, encoding it on first sight.
    /// Returns `None` when no primitive survives filtering; the caller
    /// skips the object.
    pub fn mesh_for_object(
        &mut self,
        doc: &mut DocumentBuilder,
        object: &SceneObject,
        material_index: Option<usize>,
        options: &ExportOptions,
    ) -> Result<Option<usize>> {
        if let Some(&index) = self.by_object.get(&object.id) {
            return Ok(Some(index));
        }

        let mut primitives = Vec::new();
        for mesh in &object.meshes {
            if !mesh.is_valid_for_export(options.export_open_meshes) {
                continue;
            }
            if let Some(primitive) = encode_primitive(doc, mesh, material_index, options)? {
                primitives.push(primitive);
            }
        }

        if primitives.is_empty() {
            log::debug!("object {:?} produced no primitives, skipped", object.id);
            return Ok(None);
        }

        let index = doc.push_mesh(schema::Mesh {
            name: None,
            primitives,
        });
        self.by_object.insert(object.id, index);
        Ok(Some(index))
    }
}

/// Encode one `MeshData` as a primitive, or `None` when the compressed
/// branch fails (a policy-level skip).
fn encode_primitive(
    doc: &mut DocumentBuilder,
    mesh: &MeshData,
    material_index: Option<usize>,
    options: &ExportOptions,
) -> Result<Option<Primitive>> {
    let export_normals = !mesh.normals.is_empty() && options.export_vertex_normals;
    let export_texcoords = !mesh.texcoords.is_empty() && options.export_texture_coordinates;
    let export_colors = !mesh.colors.is_empty() && options.export_vertex_colors;

    let scale = options.units.meters_per_unit() as f32;
    let positions = transformed_positions(mesh, scale, options.map_z_to_y);
    let normals = if export_normals {
        transformed_normals(mesh, options.map_z_to_y)
    } else {
        Vec::new()
    };
    let texcoords = if export_texcoords {
        flipped_texcoords(mesh)
    } else {
        Vec::new()
    };
    let colors = if export_colors {
        color_components(mesh)
    } else {
        Vec::new()
    };
    let indices = mesh.triangulated_indices();

    if options.use_draco_compression {
        let input = DracoInput {
            positions: &positions,
            normals: &normals,
            texcoords: &texcoords,
            colors: &colors,
            indices: &indices,
        };
        let settings = DracoSettings {
            compression_level: options.draco_compression_level,
            position_bits: options.draco_quantization_bits_position,
            normal_bits: options.draco_quantization_bits_normal,
            texture_bits: options.draco_quantization_bits_texture,
        };
        return match draco::compress(&input, &settings) {
            Ok(geometry) => Ok(Some(draco_primitive(doc, &geometry, material_index))),
            Err(e) => {
                log::warn!("draco compression failed, mesh skipped: {e}");
                Ok(None)
            }
        };
    }

    let mut attributes = IndexMap::new();

    let (min, max) = component_bounds(&positions);
    let view = doc.add_stream_view(&le_bytes(&positions), schema::TARGET_ARRAY_BUFFER);
    let position_accessor = doc.push_accessor(vec_accessor(
        Some(view),
        schema::COMPONENT_FLOAT,
        positions.len(),
        "VEC3",
        Some(min),
        Some(max),
    ));
    attributes.insert(schema::POSITION_ATTRIBUTE.to_string(), position_accessor);

    let index_view = doc.add_stream_view(
        &indices.iter().flat_map(|i| i.to_le_bytes()).collect::<Vec<_>>(),
        schema::TARGET_ELEMENT_ARRAY_BUFFER,
    );
    let index_accessor = doc.push_accessor(Accessor {
        buffer_view: Some(index_view),
        byte_offset: 0,
        component_type: schema::COMPONENT_UNSIGNED_INT,
        count: indices.len(),
        accessor_type: "SCALAR".to_string(),
        normalized: false,
        min: Some(vec![0.0]),
        max: Some(vec![positions.len().saturating_sub(1) as f64]),
    });

    if export_normals {
        let (min, max) = component_bounds(&normals);
        let view = doc.add_stream_view(&le_bytes(&normals), schema::TARGET_ARRAY_BUFFER);
        let accessor = doc.push_accessor(vec_accessor(
            Some(view),
            schema::COMPONENT_FLOAT,
            normals.len(),
            "VEC3",
            Some(min),
            Some(max),
        ));
        attributes.insert(schema::NORMAL_ATTRIBUTE.to_string(), accessor);
    }

    if export_texcoords {
        let (min, max) = component_bounds(&texcoords);
        let view = doc.add_stream_view(&le_bytes(&texcoords), schema::TARGET_ARRAY_BUFFER);
        let accessor = doc.push_accessor(vec_accessor(
            Some(view),
            schema::COMPONENT_FLOAT,
            texcoords.len(),
            "VEC2",
            Some(min),
            Some(max),
        ));
        attributes.insert(schema::TEXCOORD0_ATTRIBUTE.to_string(), accessor);
    }

    if export_colors {
        let (min, max) = component_bounds(&colors);
        let view = doc.add_stream_view(&le_bytes(&colors), schema::TARGET_ARRAY_BUFFER);
        let accessor = doc.push_accessor(vec_accessor(
            Some(view),
            schema::COMPONENT_FLOAT,
            colors.len(),
            "VEC4",
            Some(min),
            Some(max),
        ));
        attributes.insert(schema::COLOR0_ATTRIBUTE.to_string(), accessor);
    }

    Ok(Some(Primitive {
        attributes,
        indices: Some(index_accessor),
        material: material_index,
        mode: schema::MODE_TRIANGLES,
        extensions: None,
    }))
}

/// Build the primitive for a compressed stream: the bytes land in one
/// opaque buffer view, and the accessors carry the recovered statistics
/// with no buffer view of their own.
fn draco_primitive(
    doc: &mut DocumentBuilder,
    geometry: &DracoGeometry,
    material_index: Option<usize>,
) -> Primitive {
    let view = doc.add_opaque_view(&geometry.bytes);

    let mut attributes = IndexMap::new();
    let mut draco_attributes = IndexMap::new();

    let position_accessor = doc.push_accessor(vec_accessor(
        None,
        schema::COMPONENT_FLOAT,
        geometry.vertex_count,
        "VEC3",
        Some(geometry.vertex_min.iter().map(|&v| v as f64).collect()),
        Some(geometry.vertex_max.iter().map(|&v| v as f64).collect()),
    ));
    attributes.insert(schema::POSITION_ATTRIBUTE.to_string(), position_accessor);
    draco_attributes.insert(
        schema::POSITION_ATTRIBUTE.to_string(),
        geometry.position_attribute,
    );

    let index_accessor = doc.push_accessor(Accessor {
        buffer_view: None,
        byte_offset: 0,
        component_type: schema::COMPONENT_UNSIGNED_INT,
        count: geometry.index_count,
        accessor_type: "SCALAR".to_string(),
        normalized: false,
        min: Some(vec![0.0]),
        max: Some(vec![geometry.vertex_count.saturating_sub(1) as f64]),
    });

    if let Some(attribute) = geometry.normal_attribute {
        let accessor = doc.push_accessor(vec_accessor(
            None,
            schema::COMPONENT_FLOAT,
            geometry.normal_count,
            "VEC3",
            Some(geometry.normal_min.iter().map(|&v| v as f64).collect()),
            Some(geometry.normal_max.iter().map(|&v| v as f64).collect()),
        ));
        attributes.insert(schema::NORMAL_ATTRIBUTE.to_string(), accessor);
        draco_attributes.insert(schema::NORMAL_ATTRIBUTE.to_string(), attribute);
    }

    if let Some(attribute) = geometry.texcoord_attribute {
        let accessor = doc.push_accessor(vec_accessor(
            None,
            schema::COMPONENT_FLOAT,
            geometry.texcoord_count,
            "VEC2",
            Some(geometry.texcoord_min.iter().map(|&v| v as f64).collect()),
            Some(geometry.texcoord_max.iter().map(|&v| v as f64).collect()),
        ));
        attributes.insert(schema::TEXCOORD0_ATTRIBUTE.to_string(), accessor);
        draco_attributes.insert(schema::TEXCOORD0_ATTRIBUTE.to_string(), attribute);
    }

    if let Some(attribute) = geometry.color_attribute {
        let accessor = doc.push_accessor(Accessor {
            buffer_view: None,
            byte_offset: 0,
            component_type: schema::COMPONENT_UNSIGNED_BYTE,
            count: geometry.color_count,
            accessor_type: "VEC4".to_string(),
            normalized: true,
            min: Some(vec![0.0; 4]),
            max: Some(vec![1.0; 4]),
        });
        attributes.insert(schema::COLOR0_ATTRIBUTE.to_string(), accessor);
        draco_attributes.insert(schema::COLOR0_ATTRIBUTE.to_string(), attribute);
    }

    Primitive {
        attributes,
        indices: Some(index_accessor),
        material: material_index,
        mode: schema::MODE_TRIANGLES,
        extensions: Some(PrimitiveExtensions {
            draco: Some(DracoMeshCompression {
                buffer_view: view,
                attributes: draco_attributes,
            }),
        }),
    }
}

/// Positions after the change of basis (Y up, meters): `new = (x·s,
/// z·s, −y·s)`; without the axis remap only the unit scale applies.
fn transformed_positions(mesh: &MeshData, scale: f32, map_z_to_y: bool) -> Vec<[f32; 3]> {
    mesh.positions
        .iter()
        .map(|p| {
            if map_z_to_y {
                [p.x * scale, p.z * scale, -p.y * scale]
            } else {
                [p.x * scale, p.y * scale, p.z * scale]
            }
        })
        .collect()
}

/// Normals get the axis remap but no unit scale.
fn transformed_normals(mesh: &MeshData, map_z_to_y: bool) -> Vec<[f32; 3]> {
    mesh.normals
        .iter()
        .map(|n| {
            if map_z_to_y {
                [n.x, n.z, -n.y]
            } else {
                [n.x, n.y, n.z]
            }
        })
        .collect()
}

/// The V axis is reversed once to fix the texture origin convention.
fn flipped_texcoords(mesh: &MeshData) -> Vec<[f32; 2]> {
    mesh.texcoords.iter().map(|t| [t.x, 1.0 - t.y]).collect()
}

fn color_components(mesh: &MeshData) -> Vec<[f32; 4]> {
    mesh.colors.iter().map(|c| [c.x, c.y, c.z, c.w]).collect()
}

fn le_bytes<const N: usize>(values: &[[f32; N]]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(values.len() * N * 4);
    for value in values {
        for component in value {
            bytes.extend_from_slice(&component.to_le_bytes());
        }
    }
    bytes
}

fn component_bounds<const N: usize>(values: &[[f32; N]]) -> (Vec<f64>, Vec<f64>) {
    let mut min = [f32::MAX; N];
    let mut max = [f32::MIN; N];
    for value in values {
        for i in 0..N {
            min[i] = min[i].min(value[i]);
            max[i] = max[i].max(value[i]);
        }
    }
    (
        min.iter().map(|&v| v as f64).collect(),
        max.iter().map(|&v| v as f64).collect(),
    )
}

fn vec_accessor(
    buffer_view: Option<usize>,
    component_type: u32,
    count: usize,
    accessor_type: &str,
    min: Option<Vec<f64>>,
    max: Option<Vec<f64>>,
) -> Accessor {
    Accessor {
        buffer_view,
        byte_offset: 0,
        component_type,
        count,
        accessor_type: accessor_type.to_string(),
        normalized: false,
        min,
        max,
    }
}
