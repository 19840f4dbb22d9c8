//! Bridge to the Draco geometry codec.
//!
//! Compresses one preprocessed mesh into an opaque byte stream and
//! decompresses it once to recover the counts and bounds that the
//! standard accessors must still carry (compressed streams expose no
//! statistics of their own).

use crate::error::{GltfError, Result};

/// Vertex colors always quantize at 8 bits; the option surface only
/// exposes position/normal/texture depths.
pub const COLOR_QUANTIZATION_BITS: u32 = 8;

/// Codec configuration taken from the export options.
#[derive(Debug, Clone, Copy)]
pub struct DracoSettings {
    /// 0 (fastest) to 10 (densest).
    pub compression_level: u32,
    pub position_bits: u32,
    pub normal_bits: u32,
    pub texture_bits: u32,
}

/// One mesh's attribute streams, already preprocessed (basis change,
/// unit scaling, texcoord flip).
#[derive(Debug, Clone, Copy, Default)]
pub struct DracoInput<'a> {
    pub positions: &'a [[f32; 3]],
    pub normals: &'a [[f32; 3]],
    pub texcoords: &'a [[f32; 2]],
    pub colors: &'a [[f32; 4]],
    pub indices: &'a [u32],
}

/// The compressed stream plus the statistics recovered by decoding it.
#[derive(Debug, Clone)]
pub struct DracoGeometry {
    pub bytes: Vec<u8>,
    /// Compressed-attribute ids, in the order the codec stored them.
    pub position_attribute: usize,
    pub normal_attribute: Option<usize>,
    pub texcoord_attribute: Option<usize>,
    pub color_attribute: Option<usize>,

    pub vertex_count: usize,
    pub vertex_min: [f32; 3],
    pub vertex_max: [f32; 3],
    pub index_count: usize,
    pub normal_count: usize,
    pub normal_min: [f32; 3],
    pub normal_max: [f32; 3],
    pub texcoord_count: usize,
    pub texcoord_min: [f32; 2],
    pub texcoord_max: [f32; 2],
    pub color_count: usize,
}

fn bounds<const N: usize>(values: &[[f32; N]]) -> ([f32; N], [f32; N]) {
    let mut min = [f32::MAX; N];
    let mut max = [f32::MIN; N];
    for value in values {
        for i in 0..N {
            min[i] = min[i].min(value[i]);
            max[i] = max[i].max(value[i]);
        }
    }
    (min, max)
}

#[cfg(feature = "draco")]
mod codec {
    use super::*;

    use draco_core::decoder_buffer::DecoderBuffer;
    use draco_core::draco_types::DataType;
    use draco_core::encoder_buffer::EncoderBuffer;
    use draco_core::encoder_options::EncoderOptions;
    use draco_core::geometry_attribute::{GeometryAttributeType, PointAttribute};
    use draco_core::geometry_indices::{FaceIndex, PointIndex};
    use draco_core::mesh::Mesh;
    use draco_core::mesh_decoder::MeshDecoder;
    use draco_core::mesh_encoder::MeshEncoder;

    fn float_attribute<const N: usize>(
        kind: GeometryAttributeType,
        values: &[[f32; N]],
    ) -> PointAttribute {
        let mut attribute = PointAttribute::new();
        attribute.init(kind, N as u8, DataType::Float32, false, values.len());

        let mut bytes = Vec::with_capacity(values.len() * N * 4);
        for value in values {
            for component in value {
                bytes.extend_from_slice(&component.to_le_bytes());
            }
        }
        attribute.buffer_mut().write(0, &bytes);
        attribute
    }

    fn color_point_attribute(values: &[[f32; 4]]) -> PointAttribute {
        let mut attribute = PointAttribute::new();
        attribute.init(GeometryAttributeType::Color, 4, DataType::Uint8, true, values.len());

        let mut bytes = Vec::with_capacity(values.len() * 4);
        for value in values {
            for component in value {
                bytes.push((component.clamp(0.0, 1.0) * 255.0).round() as u8);
            }
        }
        attribute.buffer_mut().write(0, &bytes);
        attribute
    }

    /// Read tightly packed f32 data back out of a decoded attribute.
    fn attribute_values<const N: usize>(attribute: &PointAttribute) -> Vec<[f32; N]> {
        let data = attribute.buffer().data();
        let count = attribute.size();
        let mut values = Vec::with_capacity(count);
        for i in 0..count {
            let mut value = [0.0f32; N];
            for c in 0..N {
                let offset = (i * N + c) * 4;
                if offset + 4 > data.len() {
                    return values;
                }
                value[c] = f32::from_le_bytes([
                    data[offset],
                    data[offset + 1],
                    data[offset + 2],
                    data[offset + 3],
                ]);
            }
            values.push(value);
        }
        values
    }

    pub fn compress(input: &DracoInput<'_>, settings: &DracoSettings) -> Result<DracoGeometry> {
        if input.positions.is_empty() || input.indices.len() < 3 {
            return Err(GltfError::Draco("empty mesh".into()));
        }

        let mut mesh = Mesh::new();
        mesh.set_num_points(input.positions.len());

        let mut next_attribute = 0usize;
        let position_attribute = next_attribute;
        mesh.add_attribute(float_attribute(
            GeometryAttributeType::Position,
            input.positions,
        ));
        next_attribute += 1;

        let normal_attribute = if input.normals.is_empty() {
            None
        } else {
            mesh.add_attribute(float_attribute(GeometryAttributeType::Normal, input.normals));
            next_attribute += 1;
            Some(next_attribute - 1)
        };

        let texcoord_attribute = if input.texcoords.is_empty() {
            None
        } else {
            mesh.add_attribute(float_attribute(
                GeometryAttributeType::TexCoord,
                input.texcoords,
            ));
            next_attribute += 1;
            Some(next_attribute - 1)
        };

        let color_attribute = if input.colors.is_empty() {
            None
        } else {
            mesh.add_attribute(color_point_attribute(input.colors));
            next_attribute += 1;
            Some(next_attribute - 1)
        };

        let face_count = input.indices.len() / 3;
        mesh.set_num_faces(face_count);
        for face in 0..face_count {
            mesh.set_face(
                FaceIndex(face as u32),
                [
                    PointIndex(input.indices[face * 3]),
                    PointIndex(input.indices[face * 3 + 1]),
                    PointIndex(input.indices[face * 3 + 2]),
                ],
            );
        }

        let mut options = EncoderOptions::new();
        options.set_global_int("encoding_method", 1); // Edgebreaker
        options.set_global_int(
            "encoding_speed",
            (10 - settings.compression_level.min(10)) as i32,
        );

        for i in 0..mesh.num_attributes() {
            let attribute = mesh.attribute(i as i32);
            let bits = match attribute.attribute_type() {
                GeometryAttributeType::Position => settings.position_bits,
                GeometryAttributeType::Normal => settings.normal_bits,
                GeometryAttributeType::TexCoord => settings.texture_bits,
                _ => COLOR_QUANTIZATION_BITS,
            };
            options.set_attribute_int(i as i32, "quantization_bits", bits.clamp(1, 31) as i32);
        }

        let mut encoder = MeshEncoder::new();
        encoder.set_mesh(mesh);

        let mut buffer = EncoderBuffer::new();
        encoder
            .encode(&options, &mut buffer)
            .map_err(|e| GltfError::Draco(format!("{:?}", e)))?;
        let bytes = buffer.data().to_vec();

        // Decode once to recover the statistics the accessors need.
        let mut decoder_buffer = DecoderBuffer::new(&bytes);
        let mut decoded = Mesh::new();
        let mut decoder = MeshDecoder::new();
        decoder
            .decode(&mut decoder_buffer, &mut decoded)
            .map_err(|e| GltfError::Draco(format!("{:?}", e)))?;

        let mut geometry = DracoGeometry {
            bytes,
            position_attribute,
            normal_attribute,
            texcoord_attribute,
            color_attribute,
            vertex_count: decoded.num_points(),
            vertex_min: [0.0; 3],
            vertex_max: [0.0; 3],
            index_count: decoded.num_faces() * 3,
            normal_count: 0,
            normal_min: [0.0; 3],
            normal_max: [0.0; 3],
            texcoord_count: 0,
            texcoord_min: [0.0; 2],
            texcoord_max: [0.0; 2],
            color_count: 0,
        };

        for i in 0..decoded.num_attributes() {
            let attribute = decoded.attribute(i as i32);
            match attribute.attribute_type() {
                GeometryAttributeType::Position => {
                    let values = attribute_values::<3>(attribute);
                    let (min, max) = bounds(&values);
                    geometry.vertex_min = min;
                    geometry.vertex_max = max;
                }
                GeometryAttributeType::Normal => {
                    let values = attribute_values::<3>(attribute);
                    geometry.normal_count = values.len();
                    let (min, max) = bounds(&values);
                    geometry.normal_min = min;
                    geometry.normal_max = max;
                }
                GeometryAttributeType::TexCoord => {
                    let values = attribute_values::<2>(attribute);
                    geometry.texcoord_count = values.len();
                    let (min, max) = bounds(&values);
                    geometry.texcoord_min = min;
                    geometry.texcoord_max = max;
                }
                GeometryAttributeType::Color => {
                    geometry.color_count = attribute.size();
                }
                _ => {}
            }
        }

        Ok(geometry)
    }
}

#[cfg(feature = "draco")]
pub use codec::compress;

/// Stub used when the `draco` feature is disabled; requesting
/// compression is rejected up front by the exporter.
#[cfg(not(feature = "draco"))]
pub fn compress(_input: &DracoInput<'_>, _settings: &DracoSettings) -> Result<DracoGeometry> {
    Err(GltfError::Unsupported(
        "draco support not compiled in".into(),
    ))
}
