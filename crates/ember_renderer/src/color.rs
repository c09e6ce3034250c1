//! Conversion between linear radiance and display colors.

use ember_math::Vec3;
use serde::{Deserialize, Serialize};

/// Gamma correction plus exposure factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorModel {
    pub gamma: f32,
    /// Scale applied when reading colors in
    pub in_factor: f32,
    /// Scale applied when writing radiance out
    pub out_factor: f32,
    /// Exposure for rays that escape straight from the camera
    pub environment_background_factor: f32,
}

impl Default for ColorModel {
    fn default() -> Self {
        Self {
            gamma: 2.2,
            in_factor: 1.0,
            out_factor: 1.0,
            environment_background_factor: 1.0,
        }
    }
}

impl ColorModel {
    /// Decode a display color into linear radiance.
    pub fn rgb_to_vector(&self, rgb: Rgb) -> Vec3 {
        Vec3::new(
            rgb.r.powf(self.gamma),
            rgb.g.powf(self.gamma),
            rgb.b.powf(self.gamma),
        ) * self.in_factor
    }

    /// Encode linear radiance as a gamma-corrected display color.
    pub fn vector_to_rgb(&self, v: Vec3) -> Rgb {
        let v = v / self.in_factor * self.out_factor;
        let inv = 1.0 / self.gamma;
        Rgb::new(v.x.powf(inv), v.y.powf(inv), v.z.powf(inv))
    }

    pub fn vector_to_clamped(&self, v: Vec3) -> ClampedRgb {
        self.vector_to_rgb(v).into()
    }
}

/// Gamma-corrected color, not yet clamped.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// 8-bit display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClampedRgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ClampedRgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<Rgb> for ClampedRgb {
    fn from(rgb: Rgb) -> Self {
        // NaN clamps to zero
        let channel = |c: f32| {
            let c = if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) };
            (c * 255.0).round() as u8
        };
        ClampedRgb::new(channel(rgb.r), channel(rgb.g), channel(rgb.b))
    }
}

impl From<ClampedRgb> for Rgb {
    fn from(c: ClampedRgb) -> Self {
        Rgb::new(c.r as f32 / 255.0, c.g as f32 / 255.0, c.b as f32 / 255.0)
    }
}
