//! Contiguous RGBA pixel buffers used for texture channel synthesis.

use serde::{Deserialize, Serialize};

/// One channel of an RGBA pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RgbaChannel {
    Red = 0,
    Green = 1,
    Blue = 2,
    Alpha = 3,
}

/// An RGBA raster with `f32` components stored row-major in one
/// contiguous buffer. All channel-combination algorithms operate on this
/// type directly rather than through per-pixel accessor calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Raster {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl Raster {
    /// Create a raster filled with transparent black.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height * 4],
        }
    }

    /// Create a raster from an existing component buffer.
    ///
    /// Returns `None` when the buffer length is not `width * height * 4`.
    pub fn from_components(width: usize, height: usize, data: Vec<f32>) -> Option<Self> {
        if data.len() != width * height * 4 {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw component buffer, RGBA interleaved.
    pub fn components(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    fn offset(&self, x: usize, y: usize) -> usize {
        (y * self.width + x) * 4
    }

    /// Pixel at `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> [f32; 4] {
        let o = self.offset(x, y);
        [self.data[o], self.data[o + 1], self.data[o + 2], self.data[o + 3]]
    }

    /// Store a pixel at `(x, y)`.
    pub fn set(&mut self, x: usize, y: usize, rgba: [f32; 4]) {
        let o = self.offset(x, y);
        self.data[o..o + 4].copy_from_slice(&rgba);
    }

    /// Nearest-pixel sample at normalized coordinates, clamped to the
    /// raster edge.
    pub fn sample(&self, u: f32, v: f32) -> [f32; 4] {
        if self.width == 0 || self.height == 0 {
            return [0.0, 0.0, 0.0, 1.0];
        }
        let x = (u.clamp(0.0, 1.0) * (self.width - 1) as f32).round() as usize;
        let y = (v.clamp(0.0, 1.0) * (self.height - 1) as f32).round() as usize;
        self.get(x, y)
    }

    /// Rec. 601 luminance of an RGBA pixel.
    pub fn luminance(rgba: [f32; 4]) -> f32 {
        0.299 * rgba[0] + 0.587 * rgba[1] + 0.114 * rgba[2]
    }

    /// Extract one channel into a grayscale raster: the channel value
    /// (optionally inverted as `1 - v`) is replicated across R, G and B,
    /// with alpha forced to 1.
    pub fn extract_channel(&self, channel: RgbaChannel, invert: bool) -> Raster {
        let mut out = Raster::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let mut v = self.get(x, y)[channel as usize];
                if invert {
                    v = 1.0 - v;
                }
                out.set(x, y, [v, v, v, 1.0]);
            }
        }
        out
    }

    /// Apply gamma to the color channels in place; alpha is untouched.
    pub fn apply_gamma(&mut self, gamma: f32) {
        if gamma <= 0.0 {
            return;
        }
        for px in self.data.chunks_exact_mut(4) {
            px[0] = px[0].max(0.0).powf(gamma);
            px[1] = px[1].max(0.0).powf(gamma);
            px[2] = px[2].max(0.0).powf(gamma);
        }
    }

    /// Heuristic check for tangent-space normal-map content: a sparse
    /// grid of pixels must decode to roughly unit vectors with a
    /// non-negative Z component.
    pub fn is_normal_map(&self) -> bool {
        if self.width == 0 || self.height == 0 {
            return false;
        }
        let step_x = (self.width / 8).max(1);
        let step_y = (self.height / 8).max(1);
        let mut samples = 0usize;
        let mut passing = 0usize;
        let mut y = 0;
        while y < self.height {
            let mut x = 0;
            while x < self.width {
                let px = self.get(x, y);
                let nx = px[0] * 2.0 - 1.0;
                let ny = px[1] * 2.0 - 1.0;
                let nz = px[2] * 2.0 - 1.0;
                let len = (nx * nx + ny * ny + nz * nz).sqrt();
                samples += 1;
                if (len - 1.0).abs() < 0.25 && nz >= 0.0 {
                    passing += 1;
                }
                x += step_x;
            }
            y += step_y;
        }
        samples > 0 && passing * 10 >= samples * 9
    }

    /// Interpret the raster as a height map and convert it to a
    /// tangent-space normal map via central differences.
    pub fn to_normal_map(&self) -> Raster {
        let mut out = Raster::new(self.width, self.height);
        if self.width == 0 || self.height == 0 {
            return out;
        }
        let h = |x: isize, y: isize| -> f32 {
            let x = x.clamp(0, self.width as isize - 1) as usize;
            let y = y.clamp(0, self.height as isize - 1) as usize;
            Self::luminance(self.get(x, y))
        };
        for y in 0..self.height as isize {
            for x in 0..self.width as isize {
                let dx = h(x + 1, y) - h(x - 1, y);
                let dy = h(x, y + 1) - h(x, y - 1);
                let mut n = glam::Vec3::new(-dx, -dy, 1.0);
                n = n.normalize_or_zero();
                out.set(
                    x as usize,
                    y as usize,
                    [n.x * 0.5 + 0.5, n.y * 0.5 + 0.5, n.z * 0.5 + 0.5, 1.0],
                );
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_roundtrip() {
        let mut raster = Raster::new(4, 2);
        raster.set(3, 1, [0.1, 0.2, 0.3, 0.4]);
        assert_eq!(raster.get(3, 1), [0.1, 0.2, 0.3, 0.4]);
        assert_eq!(raster.get(0, 0), [0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_sample_clamps() {
        let mut raster = Raster::new(2, 2);
        raster.set(1, 1, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(raster.sample(1.0, 1.0), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(raster.sample(2.0, 2.0), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(raster.sample(0.0, 0.0), [0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_extract_channel_with_invert() {
        let mut raster = Raster::new(1, 1);
        raster.set(0, 0, [0.25, 0.5, 0.75, 1.0]);

        let green = raster.extract_channel(RgbaChannel::Green, false);
        assert_eq!(green.get(0, 0), [0.5, 0.5, 0.5, 1.0]);

        let inverted = raster.extract_channel(RgbaChannel::Red, true);
        assert_eq!(inverted.get(0, 0), [0.75, 0.75, 0.75, 1.0]);
    }

    #[test]
    fn test_flat_normal_map_detected() {
        let mut raster = Raster::new(8, 8);
        for y in 0..8 {
            for x in 0..8 {
                // (0.5, 0.5, 1.0) decodes to the up normal
                raster.set(x, y, [0.5, 0.5, 1.0, 1.0]);
            }
        }
        assert!(raster.is_normal_map());
    }

    #[test]
    fn test_height_map_not_a_normal_map() {
        let mut raster = Raster::new(8, 8);
        for y in 0..8 {
            for x in 0..8 {
                let v = x as f32 / 7.0;
                raster.set(x, y, [v, v, v, 1.0]);
            }
        }
        assert!(!raster.is_normal_map());

        let converted = raster.to_normal_map();
        assert!(converted.is_normal_map());
    }

    #[test]
    fn test_gamma_leaves_alpha() {
        let mut raster = Raster::new(1, 1);
        raster.set(0, 0, [0.25, 1.0, 0.0, 0.5]);
        raster.apply_gamma(2.0);
        let px = raster.get(0, 0);
        assert!((px[0] - 0.0625).abs() < 1e-6);
        assert_eq!(px[1], 1.0);
        assert_eq!(px[3], 0.5);
    }
}
