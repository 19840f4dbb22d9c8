//! Material encoding: PBR channel recombination, texture synthesis and
//! extension packing.

use std::collections::HashMap;

use arbor_scene::{
    ChannelTexture, MaterialData, MaterialId, Raster, RgbaChannel, SceneObject,
};
use glam::Vec4;

use crate::document::DocumentBuilder;
use crate::error::Result;
use crate::options::ExportOptions;
use crate::schema::{
    self, AlphaMode, MaterialExtensions, MaterialsClearcoat, MaterialsIor, MaterialsSpecular,
    MaterialsTransmission, NormalTextureInfo, OcclusionTextureInfo, PbrMetallicRoughness,
    TextureInfo,
};
use crate::texture::load_channel;

/// Raster size used when no source texture reports its dimensions.
const FALLBACK_TEXTURE_SIZE: usize = 1024;

/// Encodes materials with two dedup caches: one keyed by source
/// material identity, one keyed by exact display RGB for the synthetic
/// flat-color fallback.
#[derive(Debug, Default)]
pub struct MaterialEncoder {
    by_id: HashMap<MaterialId, usize>,
    by_display_color: HashMap<(u8, u8, u8), usize>,
}

impl MaterialEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve an object's material to a document index, encoding it on
    /// first sight. Returns `None` when material export is disabled.
    pub fn resolve(
        &mut self,
        doc: &mut DocumentBuilder,
        object: &SceneObject,
        options: &ExportOptions,
    ) -> Result<Option<usize>> {
        if !options.export_materials {
            return Ok(None);
        }

        if object.material.is_none() && options.use_display_color_for_unset_materials {
            let [r, g, b] = object.display_color;
            // pure black falls through to the default material
            if (r, g, b) != (0, 0, 0) {
                if let Some(&index) = self.by_display_color.get(&(r, g, b)) {
                    return Ok(Some(index));
                }
                let index = solid_color_material(doc, [r, g, b]);
                self.by_display_color.insert((r, g, b), index);
                return Ok(Some(index));
            }
        }

        let default_material;
        let material = match &object.material {
            Some(material) => material,
            None => {
                default_material = MaterialData::default();
                &default_material
            }
        };

        if let Some(&index) = self.by_id.get(&material.id) {
            return Ok(Some(index));
        }

        let index = encode_material(doc, material, options.export_textures)?;
        self.by_id.insert(material.id, index);
        Ok(Some(index))
    }
}

/// Synthetic flat-color material for an object rendered by display
/// color alone.
fn solid_color_material(doc: &mut DocumentBuilder, rgb: [u8; 3]) -> usize {
    doc.push_material(schema::Material {
        pbr_metallic_roughness: Some(PbrMetallicRoughness {
            base_color_factor: [
                rgb[0] as f32 / 255.0,
                rgb[1] as f32 / 255.0,
                rgb[2] as f32 / 255.0,
                1.0,
            ],
            ..Default::default()
        }),
        double_sided: true,
        ..Default::default()
    })
}

fn enabled(channel: &Option<ChannelTexture>, export_textures: bool) -> Option<&ChannelTexture> {
    if !export_textures {
        return None;
    }
    channel.as_ref().filter(|c| c.enabled)
}

fn encode_material(
    doc: &mut DocumentBuilder,
    material: &MaterialData,
    export_textures: bool,
) -> Result<usize> {
    let textures = &material.textures;

    let mut out = schema::Material {
        name: if material.name.is_empty() {
            None
        } else {
            Some(material.name.clone())
        },
        double_sided: true,
        ..Default::default()
    };

    // Base color and alpha, merged into one texture when either channel
    // carries one.
    let (base_color_factor, base_color_texture, alpha_mode) =
        base_color_channels(doc, material, export_textures)?;
    out.alpha_mode = alpha_mode;

    let mut pbr = PbrMetallicRoughness {
        base_color_factor,
        base_color_texture,
        ..Default::default()
    };

    let metallic_channel = enabled(&textures.metallic, export_textures);
    let roughness_channel = enabled(&textures.roughness, export_textures);
    if metallic_channel.is_some() || roughness_channel.is_some() {
        pbr.metallic_roughness_texture = Some(combine_metallic_roughness(
            doc,
            metallic_channel,
            roughness_channel,
        )?);
        pbr.metallic_factor = metallic_channel.map_or(material.metallic, |c| c.amount);
        pbr.roughness_factor = roughness_channel.map_or(material.roughness, |c| c.amount);
    } else {
        pbr.metallic_factor = material.metallic;
        pbr.roughness_factor = material.roughness;
    }
    out.pbr_metallic_roughness = Some(pbr);

    if let Some(channel) = enabled(&textures.normal, export_textures) {
        out.normal_texture = Some(add_normal_texture(doc, channel)?);
    }

    if let Some(channel) = enabled(&textures.occlusion, export_textures) {
        let index = add_plain_texture(doc, channel)?;
        out.occlusion_texture = Some(OcclusionTextureInfo {
            index,
            tex_coord: 0,
            strength: channel.amount,
        });
    }

    if let Some(channel) = enabled(&textures.emission, export_textures) {
        out.emissive_texture = Some(TextureInfo::new(add_plain_texture(doc, channel)?));
        let multiplier = material.emission_multiplier;
        out.emissive_factor = [multiplier, multiplier, multiplier];
    } else {
        out.emissive_factor = material.emission;
    }

    let mut extensions = MaterialExtensions::default();

    // Opacity inverts into transmission; the value rides the R channel.
    let mut transmission = MaterialsTransmission::default();
    if let Some(channel) = enabled(&textures.opacity, export_textures) {
        transmission.transmission_texture =
            Some(single_channel_texture(doc, channel, RgbaChannel::Red, true)?);
        transmission.transmission_factor = channel.amount;
    } else {
        transmission.transmission_factor = 1.0 - material.opacity;
    }
    extensions.transmission = Some(transmission);

    let mut clearcoat = MaterialsClearcoat::default();
    if let Some(channel) = enabled(&textures.clearcoat, export_textures) {
        clearcoat.clearcoat_texture = Some(TextureInfo::new(add_plain_texture(doc, channel)?));
        clearcoat.clearcoat_factor = channel.amount;
    } else {
        clearcoat.clearcoat_factor = material.clearcoat;
    }
    if let Some(channel) = enabled(&textures.clearcoat_roughness, export_textures) {
        clearcoat.clearcoat_roughness_texture =
            Some(TextureInfo::new(add_plain_texture(doc, channel)?));
        clearcoat.clearcoat_roughness_factor = channel.amount;
    } else {
        clearcoat.clearcoat_roughness_factor = material.clearcoat_roughness;
    }
    if let Some(channel) = enabled(&textures.clearcoat_normal, export_textures) {
        clearcoat.clearcoat_normal_texture = Some(add_normal_texture(doc, channel)?);
    }
    extensions.clearcoat = Some(clearcoat);

    extensions.ior = Some(MaterialsIor { ior: material.ior });

    // Specular value travels in the source's alpha channel.
    let mut specular = MaterialsSpecular::default();
    if let Some(channel) = enabled(&textures.specular, export_textures) {
        specular.specular_texture =
            Some(single_channel_texture(doc, channel, RgbaChannel::Alpha, false)?);
        specular.specular_factor = channel.amount;
    } else {
        specular.specular_factor = material.specular;
    }
    extensions.specular = Some(specular);

    out.extensions = Some(extensions);
    Ok(doc.push_material(out))
}

/// Decide the base color factor, synthesized texture and alpha mode.
fn base_color_channels(
    doc: &mut DocumentBuilder,
    material: &MaterialData,
    export_textures: bool,
) -> Result<([f32; 4], Option<TextureInfo>, AlphaMode)> {
    let base_channel = enabled(&material.textures.base_color, export_textures);
    let alpha_channel = enabled(&material.textures.alpha, export_textures);

    let mut base_color = material.base_color;
    if material.workflow.pre_process_colors {
        base_color = gamma_color(base_color, material.workflow.gamma);
    }

    if base_channel.is_none() && alpha_channel.is_none() {
        let factor = [base_color.x, base_color.y, base_color.z, material.alpha];
        let mode = if material.alpha == 1.0 {
            AlphaMode::Opaque
        } else {
            AlphaMode::Blend
        };
        return Ok((factor, None, mode));
    }

    let (info, has_alpha) =
        combine_base_color_alpha(doc, material, base_channel, alpha_channel, base_color)?;
    let mode = if has_alpha {
        AlphaMode::Blend
    } else {
        AlphaMode::Opaque
    };
    // factor stays at the glTF default; the texture carries the color
    Ok(([1.0, 1.0, 1.0, 1.0], Some(info), mode))
}

/// Merge base color and an independent alpha source into one RGBA
/// raster. Returns the registered texture and whether any pixel ended
/// up non-opaque.
fn combine_base_color_alpha(
    doc: &mut DocumentBuilder,
    material: &MaterialData,
    base_channel: Option<&ChannelTexture>,
    alpha_channel: Option<&ChannelTexture>,
    base_color: Vec4,
) -> Result<(TextureInfo, bool)> {
    let base_raster = base_channel.map(load_channel).transpose()?;
    let alpha_raster = alpha_channel.map(load_channel).transpose()?;

    let base_linear = base_channel.is_some_and(|c| c.linear);
    let gamma = material.workflow.gamma;

    let width = raster_extent(base_raster.as_ref().map(Raster::width), alpha_raster.as_ref().map(Raster::width));
    let height = raster_extent(base_raster.as_ref().map(Raster::height), alpha_raster.as_ref().map(Raster::height));

    let mut combined = Raster::new(width, height);
    let mut has_alpha = false;

    for y in 0..height {
        for x in 0..width {
            let u = x as f32 / (width - 1).max(1) as f32;
            let v = 1.0 - y as f32 / (height - 1).max(1) as f32;

            let mut base = [base_color.x, base_color.y, base_color.z, base_color.w];
            if let Some(raster) = &base_raster {
                base = raster.sample(u, v);
                if base_linear {
                    base[0] = base[0].max(0.0).powf(gamma);
                    base[1] = base[1].max(0.0).powf(gamma);
                    base[2] = base[2].max(0.0).powf(gamma);
                }
            }

            let texture_alpha = if material.use_base_color_alpha {
                base[3]
            } else {
                1.0
            };

            let evaluated_alpha = match &alpha_raster {
                Some(raster) => Raster::luminance(raster.sample(u, v)),
                None => material.alpha,
            };

            let alpha_final = base_color.w * evaluated_alpha * texture_alpha;
            has_alpha = has_alpha || alpha_final != 1.0;
            combined.set(x, y, [base[0], base[1], base[2], alpha_final]);
        }
    }

    let index = doc.add_raster_texture(&combined)?;
    Ok((TextureInfo::new(index), has_alpha))
}

/// Synthesize the combined metallic-roughness texture: roughness
/// luminance in green, metalness luminance in blue, channels without a
/// source defaulting to 1.0.
fn combine_metallic_roughness(
    doc: &mut DocumentBuilder,
    metallic_channel: Option<&ChannelTexture>,
    roughness_channel: Option<&ChannelTexture>,
) -> Result<TextureInfo> {
    let metallic_raster = metallic_channel.map(load_channel).transpose()?;
    let roughness_raster = roughness_channel.map(load_channel).transpose()?;

    let width = raster_extent(
        metallic_raster.as_ref().map(Raster::width),
        roughness_raster.as_ref().map(Raster::width),
    );
    let height = raster_extent(
        metallic_raster.as_ref().map(Raster::height),
        roughness_raster.as_ref().map(Raster::height),
    );

    let mut combined = Raster::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let u = x as f32 / (width - 1).max(1) as f32;
            let v = 1.0 - y as f32 / (height - 1).max(1) as f32;

            // grayscale maps, so luminance carries the value
            let g = match &roughness_raster {
                Some(raster) => Raster::luminance(raster.sample(u, v)),
                None => 1.0,
            };
            let b = match &metallic_raster {
                Some(raster) => Raster::luminance(raster.sample(u, v)),
                None => 1.0,
            };

            combined.set(x, y, [0.0, g, b, 1.0]);
        }
    }

    let index = doc.add_raster_texture(&combined)?;
    Ok(TextureInfo::new(index))
}

/// The larger of two optional extents, falling back to the fixed
/// synthesis size when neither source reports one.
fn raster_extent(a: Option<usize>, b: Option<usize>) -> usize {
    let extent = a.unwrap_or(0).max(b.unwrap_or(0));
    if extent == 0 {
        FALLBACK_TEXTURE_SIZE
    } else {
        extent
    }
}

/// Extract one channel of a source raster into a standalone grayscale
/// texture, optionally inverting the value.
fn single_channel_texture(
    doc: &mut DocumentBuilder,
    channel: &ChannelTexture,
    source_channel: RgbaChannel,
    invert: bool,
) -> Result<TextureInfo> {
    let raster = load_channel(channel)?;
    let extracted = raster.extract_channel(source_channel, invert);
    let index = doc.add_raster_texture(&extracted)?;
    Ok(TextureInfo::new(index))
}

/// Register a normal map, converting height-map content to
/// tangent-space form first.
fn add_normal_texture(
    doc: &mut DocumentBuilder,
    channel: &ChannelTexture,
) -> Result<NormalTextureInfo> {
    let raster = load_channel(channel)?;
    let raster = if raster.is_normal_map() {
        raster
    } else {
        raster.to_normal_map()
    };
    let index = doc.add_raster_texture(&raster)?;
    Ok(NormalTextureInfo {
        index,
        tex_coord: 0,
        scale: channel.amount,
    })
}

/// Register a texture channel's pixels unchanged.
fn add_plain_texture(doc: &mut DocumentBuilder, channel: &ChannelTexture) -> Result<usize> {
    let raster = load_channel(channel)?;
    doc.add_raster_texture(&raster)
}

fn gamma_color(color: Vec4, gamma: f32) -> Vec4 {
    if gamma <= 0.0 {
        return color;
    }
    Vec4::new(
        color.x.max(0.0).powf(gamma),
        color.y.max(0.0).powf(gamma),
        color.z.max(0.0).powf(gamma),
        color.w,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::decode_image;
    use arbor_scene::{MaterialTextures, ObjectId, TextureSource};

    fn object_with_material(material: MaterialData) -> SceneObject {
        SceneObject::new(ObjectId(1)).with_material(material)
    }

    fn gray_raster(size: usize, value: f32) -> Raster {
        let mut raster = Raster::new(size, size);
        for y in 0..size {
            for x in 0..size {
                raster.set(x, y, [value, value, value, 1.0]);
            }
        }
        raster
    }

    /// Decode the PNG bytes a texture index points to.
    fn synthesized_raster(doc: &DocumentBuilder, texture: usize) -> Raster {
        let source = doc.gltf.textures[texture].source.unwrap();
        let view_index = doc.gltf.images[source].buffer_view.unwrap();
        let view = &doc.gltf.buffer_views[view_index];
        let blob = match &doc.sink {
            crate::buffer::BufferSink::Binary { blob } => blob,
            _ => panic!("expected binary sink"),
        };
        decode_image(&blob[view.byte_offset..view.byte_offset + view.byte_length]).unwrap()
    }

    #[test]
    fn test_identity_dedup() {
        let options = ExportOptions::default();
        let mut doc = DocumentBuilder::new(&options);
        let mut encoder = MaterialEncoder::new();

        let material = MaterialData::new(MaterialId(7), "steel");
        let a = encoder
            .resolve(&mut doc, &object_with_material(material.clone()), &options)
            .unwrap();
        let b = encoder
            .resolve(&mut doc, &object_with_material(material), &options)
            .unwrap();

        assert_eq!(a, b);
        assert_eq!(doc.gltf.materials.len(), 1);
    }

    #[test]
    fn test_display_color_dedup_is_separate() {
        let options = ExportOptions::default();
        let mut doc = DocumentBuilder::new(&options);
        let mut encoder = MaterialEncoder::new();

        let mut red_a = SceneObject::new(ObjectId(1));
        red_a.display_color = [200, 10, 10];
        let mut red_b = SceneObject::new(ObjectId(2));
        red_b.display_color = [200, 10, 10];

        let a = encoder.resolve(&mut doc, &red_a, &options).unwrap();
        let b = encoder.resolve(&mut doc, &red_b, &options).unwrap();
        assert_eq!(a, b);
        assert_eq!(doc.gltf.materials.len(), 1);

        // a real material does not collide with the color cache
        let c = encoder
            .resolve(
                &mut doc,
                &object_with_material(MaterialData::new(MaterialId(9), "x")),
                &options,
            )
            .unwrap();
        assert_ne!(a, c);
        assert_eq!(doc.gltf.materials.len(), 2);
    }

    #[test]
    fn test_black_display_color_uses_default_material() {
        let options = ExportOptions::default();
        let mut doc = DocumentBuilder::new(&options);
        let mut encoder = MaterialEncoder::new();

        let mut object = SceneObject::new(ObjectId(1));
        object.display_color = [0, 0, 0];

        let index = encoder.resolve(&mut doc, &object, &options).unwrap();
        assert!(index.is_some());
        // default material is named, flat-color fallbacks are not
        assert!(doc.gltf.materials[index.unwrap()].extensions.is_some());
    }

    #[test]
    fn test_materials_disabled() {
        let options = ExportOptions {
            export_materials: false,
            ..Default::default()
        };
        let mut doc = DocumentBuilder::new(&options);
        let mut encoder = MaterialEncoder::new();

        let index = encoder
            .resolve(
                &mut doc,
                &object_with_material(MaterialData::new(MaterialId(1), "x")),
                &options,
            )
            .unwrap();
        assert!(index.is_none());
        assert!(doc.gltf.materials.is_empty());
    }

    #[test]
    fn test_scalar_alpha_modes() {
        let options = ExportOptions::default();
        let mut doc = DocumentBuilder::new(&options);
        let mut encoder = MaterialEncoder::new();

        let opaque = MaterialData::new(MaterialId(1), "opaque");
        let index = encoder
            .resolve(&mut doc, &object_with_material(opaque), &options)
            .unwrap()
            .unwrap();
        assert_eq!(doc.gltf.materials[index].alpha_mode, AlphaMode::Opaque);

        let mut translucent = MaterialData::new(MaterialId(2), "glassy");
        translucent.alpha = 0.5;
        let index = encoder
            .resolve(&mut doc, &object_with_material(translucent), &options)
            .unwrap()
            .unwrap();
        assert_eq!(doc.gltf.materials[index].alpha_mode, AlphaMode::Blend);
        let pbr = doc.gltf.materials[index].pbr_metallic_roughness.as_ref().unwrap();
        assert_eq!(pbr.base_color_factor[3], 0.5);
    }

    #[test]
    fn test_metallic_roughness_combination() {
        let options = ExportOptions::default();
        let mut doc = DocumentBuilder::new(&options);
        let mut encoder = MaterialEncoder::new();

        let mut material = MaterialData::new(MaterialId(3), "brushed");
        material.metallic = 0.9;
        material.textures = MaterialTextures {
            metallic: Some(ChannelTexture {
                source: TextureSource::Memory(gray_raster(4, 0.5)),
                amount: 0.8,
                enabled: true,
                linear: false,
            }),
            ..Default::default()
        };

        let index = encoder
            .resolve(&mut doc, &object_with_material(material), &options)
            .unwrap()
            .unwrap();
        let pbr = doc.gltf.materials[index]
            .pbr_metallic_roughness
            .as_ref()
            .unwrap();

        // texture weight replaces the scalar factor
        assert_eq!(pbr.metallic_factor, 0.8);
        // roughness had no texture, so its scalar remains
        assert_eq!(pbr.roughness_factor, 1.0);

        let combined = synthesized_raster(&doc, pbr.metallic_roughness_texture.unwrap().index);
        let px = combined.get(1, 1);
        assert_eq!(px[0], 0.0); // red left at default
        assert!((px[1] - 1.0).abs() < 0.01); // no roughness source -> 1.0
        assert!((px[2] - 0.5).abs() < 0.01); // metal luminance in blue
    }

    #[test]
    fn test_alpha_texture_forces_blend() {
        let options = ExportOptions::default();
        let mut doc = DocumentBuilder::new(&options);
        let mut encoder = MaterialEncoder::new();

        let mut material = MaterialData::new(MaterialId(4), "faded");
        material.textures.alpha = Some(ChannelTexture {
            source: TextureSource::Memory(gray_raster(2, 0.25)),
            amount: 1.0,
            enabled: true,
            linear: false,
        });

        let index = encoder
            .resolve(&mut doc, &object_with_material(material), &options)
            .unwrap()
            .unwrap();
        let material = &doc.gltf.materials[index];
        assert_eq!(material.alpha_mode, AlphaMode::Blend);

        let pbr = material.pbr_metallic_roughness.as_ref().unwrap();
        let raster = synthesized_raster(&doc, pbr.base_color_texture.unwrap().index);
        assert!((raster.get(0, 0)[3] - 0.25).abs() < 0.01);
    }

    #[test]
    fn test_fully_opaque_alpha_texture_stays_opaque() {
        let options = ExportOptions::default();
        let mut doc = DocumentBuilder::new(&options);
        let mut encoder = MaterialEncoder::new();

        let mut material = MaterialData::new(MaterialId(5), "solid");
        material.textures.alpha = Some(ChannelTexture {
            source: TextureSource::Memory(gray_raster(2, 1.0)),
            amount: 1.0,
            enabled: true,
            linear: false,
        });

        let index = encoder
            .resolve(&mut doc, &object_with_material(material), &options)
            .unwrap()
            .unwrap();
        assert_eq!(doc.gltf.materials[index].alpha_mode, AlphaMode::Opaque);
    }

    #[test]
    fn test_transmission_inverts_opacity() {
        let options = ExportOptions::default();
        let mut doc = DocumentBuilder::new(&options);
        let mut encoder = MaterialEncoder::new();

        let mut material = MaterialData::new(MaterialId(6), "glass");
        material.opacity = 0.3;
        material.ior = 1.45;

        let index = encoder
            .resolve(&mut doc, &object_with_material(material), &options)
            .unwrap()
            .unwrap();
        let extensions = doc.gltf.materials[index].extensions.as_ref().unwrap();
        let transmission = extensions.transmission.as_ref().unwrap();
        assert!((transmission.transmission_factor - 0.7).abs() < 1e-6);
        assert_eq!(extensions.ior.as_ref().unwrap().ior, 1.45);
    }

    #[test]
    fn test_specular_reads_alpha_channel() {
        let options = ExportOptions::default();
        let mut doc = DocumentBuilder::new(&options);
        let mut encoder = MaterialEncoder::new();

        let mut source = Raster::new(2, 2);
        for y in 0..2 {
            for x in 0..2 {
                source.set(x, y, [0.9, 0.9, 0.9, 0.25]);
            }
        }

        let mut material = MaterialData::new(MaterialId(8), "coated");
        material.textures.specular = Some(ChannelTexture {
            source: TextureSource::Memory(source),
            amount: 0.6,
            enabled: true,
            linear: false,
        });

        let index = encoder
            .resolve(&mut doc, &object_with_material(material), &options)
            .unwrap()
            .unwrap();
        let extensions = doc.gltf.materials[index].extensions.as_ref().unwrap();
        let specular = extensions.specular.as_ref().unwrap();
        assert_eq!(specular.specular_factor, 0.6);

        let raster = synthesized_raster(&doc, specular.specular_texture.unwrap().index);
        let px = raster.get(0, 0);
        assert!((px[0] - 0.25).abs() < 0.01);
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
    }

    #[test]
    fn test_export_textures_disabled_forces_scalars() {
        let options = ExportOptions {
            export_textures: false,
            ..Default::default()
        };
        let mut doc = DocumentBuilder::new(&options);
        let mut encoder = MaterialEncoder::new();

        let mut material = MaterialData::new(MaterialId(10), "textured");
        material.metallic = 0.4;
        material.textures.metallic = Some(ChannelTexture {
            source: TextureSource::Memory(gray_raster(2, 0.5)),
            amount: 1.0,
            enabled: true,
            linear: false,
        });

        let index = encoder
            .resolve(&mut doc, &object_with_material(material), &options)
            .unwrap()
            .unwrap();
        let pbr = doc.gltf.materials[index]
            .pbr_metallic_roughness
            .as_ref()
            .unwrap();
        assert_eq!(pbr.metallic_factor, 0.4);
        assert!(pbr.metallic_roughness_texture.is_none());
        assert!(doc.gltf.textures.is_empty());
    }

    #[test]
    fn test_linear_base_texture_gamma_corrected() {
        let options = ExportOptions::default();
        let mut doc = DocumentBuilder::new(&options);
        let mut encoder = MaterialEncoder::new();

        let mut material = MaterialData::new(MaterialId(11), "linear");
        material.workflow.gamma = 2.0;
        material.textures.base_color = Some(ChannelTexture {
            source: TextureSource::Memory(gray_raster(2, 0.5)),
            amount: 1.0,
            enabled: true,
            linear: true,
        });

        let index = encoder
            .resolve(&mut doc, &object_with_material(material), &options)
            .unwrap()
            .unwrap();
        let pbr = doc.gltf.materials[index]
            .pbr_metallic_roughness
            .as_ref()
            .unwrap();
        let raster = synthesized_raster(&doc, pbr.base_color_texture.unwrap().index);
        assert!((raster.get(0, 0)[0] - 0.25).abs() < 0.01);
    }
}
