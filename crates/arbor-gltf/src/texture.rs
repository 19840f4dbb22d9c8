//! Raster loading and PNG encoding for texture payloads.

use std::io::Cursor;

use arbor_scene::{ChannelTexture, Raster, TextureSource};
use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::error::{GltfError, Result};

/// Encode a raster as PNG bytes.
pub fn encode_png(raster: &Raster) -> Result<Vec<u8>> {
    let width = raster.width() as u32;
    let height = raster.height() as u32;
    let mut pixels = Vec::with_capacity(raster.width() * raster.height() * 4);
    for component in raster.components() {
        pixels.push((component.clamp(0.0, 1.0) * 255.0).round() as u8);
    }
    let image = RgbaImage::from_raw(width, height, pixels)
        .ok_or_else(|| GltfError::InvalidData("raster dimensions mismatch".into()))?;

    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Decode encoded image bytes (PNG or JPEG) into a raster.
pub fn decode_image(bytes: &[u8]) -> Result<Raster> {
    let image = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = image.dimensions();
    let components = image
        .into_raw()
        .into_iter()
        .map(|byte| byte as f32 / 255.0)
        .collect();
    Raster::from_components(width as usize, height as usize, components)
        .ok_or_else(|| GltfError::InvalidData("decoded image has inconsistent size".into()))
}

/// Resolve a texture channel's pixels. File sources are read and decoded
/// here; a missing or unreadable file aborts the export.
pub fn load_channel(channel: &ChannelTexture) -> Result<Raster> {
    match &channel.source {
        TextureSource::File(path) => {
            let bytes = std::fs::read(path)?;
            decode_image(&bytes)
        }
        TextureSource::Memory(raster) => Ok(raster.clone()),
    }
}
