//! Render output and render-wide settings.

use ember_math::{Vec3, DEFAULT_DEPTH};
use image::{Rgb as ImageRgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::camera::{Camera, ProgressFn, Resolution};
use crate::color::{ClampedRgb, ColorModel};
use crate::error::RenderResult;
use crate::scene::Scene;

/// Linear radiance per pixel, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Vec3>,
}

impl PixelBuffer {
    /// Create a new buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Vec3::ZERO; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Vec3] {
        &self.pixels
    }

    pub fn get(&self, x: u32, y: u32) -> Vec3 {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, color: Vec3) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Copy a finished block's row-major pixels into place.
    pub(crate) fn write_block(&mut self, block: &Block, pixels: &[Vec3]) {
        for (row, line) in pixels.chunks(block.width as usize).enumerate() {
            let start = ((block.y + row as u32) * self.width + block.x) as usize;
            self.pixels[start..start + line.len()].copy_from_slice(line);
        }
    }

    /// Gamma-correct and clamp every pixel.
    pub fn to_clamped(&self, model: &ColorModel) -> Vec<ClampedRgb> {
        self.pixels
            .iter()
            .map(|&v| model.vector_to_clamped(v))
            .collect()
    }

    /// Convert to an 8-bit image for encoding.
    pub fn to_rgb_image(&self, model: &ColorModel) -> RgbImage {
        let mut img = RgbImage::new(self.width, self.height);
        for (pixel, clamped) in img.pixels_mut().zip(self.to_clamped(model)) {
            *pixel = ImageRgb(clamped.to_array());
        }
        img
    }
}

/// Render settings that are not part of the scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Rays per pixel
    pub samples: u32,
    /// Maximum bounces per camera ray
    pub max_depth: u32,
    pub seed: u64,
    pub resolution: Resolution,
    pub color_model: ColorModel,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples: 8,
            max_depth: DEFAULT_DEPTH,
            seed: 0,
            resolution: Resolution::default(),
            color_model: ColorModel::default(),
        }
    }
}

impl RenderConfig {
    /// Apply these settings to `camera` and `scene`, then render.
    pub fn render(
        &self,
        camera: &Camera,
        scene: &mut Scene,
        progress: Option<ProgressFn<'_>>,
    ) -> RenderResult<PixelBuffer> {
        let camera = camera.with_resolution(self.resolution).with_seed(self.seed);
        scene.max_depth = self.max_depth;
        scene.color_model = self.color_model;
        camera.render(scene, self.samples, progress)
    }
}
