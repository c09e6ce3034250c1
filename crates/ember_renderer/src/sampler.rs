//! Procedural color samplers.
//!
//! A sampler maps a point to a color after moving the point into its own
//! local space. Samplers nest: a checker picks between two child samplers,
//! a sky mixes three, and so on.

use std::sync::Arc;

use ember_math::{Mat4, Transform, Vec3, EPSILON};

use crate::error::RenderResult;

/// Sun term is only evaluated this close to the sun direction.
const SUN_THRESHOLD: f32 = 0.9;

pub const DEFAULT_SUN_FALLOFF: f32 = 120.0;

#[derive(Debug, Clone)]
pub enum SamplerKind {
    Solid(Vec3),
    Checker {
        color1: Arc<Sampler>,
        color2: Arc<Sampler>,
    },
    Sky {
        high: Arc<Sampler>,
        low: Arc<Sampler>,
        sun: Arc<Sampler>,
        sun_direction: Vec3,
        sun_falloff: f32,
    },
    Rainbow {
        x: Arc<Sampler>,
        y: Arc<Sampler>,
        z: Arc<Sampler>,
        scale: Vec3,
    },
}

#[derive(Debug, Clone)]
pub struct Sampler {
    transform: Transform,
    pub kind: SamplerKind,
}

impl Sampler {
    pub fn new(kind: SamplerKind) -> Self {
        Self {
            transform: Transform::IDENTITY,
            kind,
        }
    }

    pub fn solid(color: Vec3) -> Self {
        Self::new(SamplerKind::Solid(color))
    }

    pub fn checker(color1: Arc<Sampler>, color2: Arc<Sampler>) -> Self {
        Self::new(SamplerKind::Checker { color1, color2 })
    }

    /// Gradient sky with a sun; the sun direction is normalized here.
    pub fn sky(
        high: Arc<Sampler>,
        low: Arc<Sampler>,
        sun: Arc<Sampler>,
        sun_direction: Vec3,
    ) -> Self {
        Self::new(SamplerKind::Sky {
            high,
            low,
            sun,
            sun_direction: sun_direction.normalize_or_zero(),
            sun_falloff: DEFAULT_SUN_FALLOFF,
        })
    }

    pub fn rainbow(x: Arc<Sampler>, y: Arc<Sampler>, z: Arc<Sampler>, scale: Vec3) -> Self {
        Self::new(SamplerKind::Rainbow { x, y, z, scale })
    }

    /// Set the sampler's local-to-parent matrix. Fails if it cannot be inverted.
    pub fn with_transform(mut self, matrix: Mat4) -> RenderResult<Self> {
        self.transform = Transform::new(matrix)?;
        Ok(self)
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn sample(&self, point: Vec3) -> Vec3 {
        let p = self.transform.point_to_object(point);
        match &self.kind {
            SamplerKind::Solid(color) => *color,

            SamplerKind::Checker { color1, color2 } => {
                let parity = |v: f32| (v * 2.0 + EPSILON).floor() as i64 & 1;
                if parity(p.x) ^ parity(p.y) ^ parity(p.z) == 1 {
                    color1.sample(p)
                } else {
                    color2.sample(p)
                }
            }

            SamplerKind::Sky {
                high,
                low,
                sun,
                sun_direction,
                sun_falloff,
            } => {
                let x = p.dot(*sun_direction);
                let sun_term = if x > SUN_THRESHOLD {
                    sun.sample(p) / (1.0 + (-sun_falloff * (x - 1.0)).exp())
                } else {
                    Vec3::ZERO
                };
                let t = (0.35 + p.y * 2.0).clamp(0.0, 1.0);
                (1.0 - t) * low.sample(p) + t * high.sample(p) + sun_term
            }

            SamplerKind::Rainbow { x, y, z, scale } => {
                let d = *scale * p;
                (d.x + 1.0) / 2.0 * x.sample(p)
                    + (d.y + 1.0) / 2.0 * y.sample(p)
                    + (d.z + 1.0) / 2.0 * z.sample(p)
            }
        }
    }
}

impl From<Vec3> for Sampler {
    fn from(color: Vec3) -> Self {
        Sampler::solid(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(c: Vec3) -> Arc<Sampler> {
        Arc::new(Sampler::solid(c))
    }

    #[test]
    fn test_solid_ignores_point() {
        let s = Sampler::solid(Vec3::new(0.1, 0.2, 0.3));
        assert_eq!(s.sample(Vec3::new(100.0, -3.0, 7.0)), Vec3::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn test_checker_alternates() {
        let s = Sampler::checker(solid(Vec3::ONE), solid(Vec3::ZERO));
        let a = s.sample(Vec3::new(0.25, 0.25, 0.25));
        let b = s.sample(Vec3::new(0.75, 0.25, 0.25));
        let c = s.sample(Vec3::new(0.75, 0.75, 0.25));
        assert_ne!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_checker_respects_transform() {
        let s = Sampler::checker(solid(Vec3::ONE), solid(Vec3::ZERO))
            .with_transform(Mat4::from_scale(Vec3::splat(2.0)))
            .unwrap();
        // Cells are twice as large, so these share a cell
        assert_eq!(s.sample(Vec3::new(0.1, 0.1, 0.1)), s.sample(Vec3::new(0.9, 0.1, 0.1)));
    }

    #[test]
    fn test_singular_sampler_transform() {
        let result = Sampler::solid(Vec3::ONE).with_transform(Mat4::from_scale(Vec3::ZERO));
        assert!(result.is_err());
    }

    #[test]
    fn test_sky_gradient_and_sun() {
        let sky = Sampler::sky(
            solid(Vec3::new(0.0, 0.0, 1.0)),
            solid(Vec3::new(1.0, 0.0, 0.0)),
            solid(Vec3::splat(10.0)),
            Vec3::new(1.0, 1.0, 0.0),
        );

        // Straight up is pure high color with no sun
        assert_eq!(sky.sample(Vec3::Y), Vec3::new(0.0, 0.0, 1.0));
        // Straight down is pure low color
        assert_eq!(sky.sample(Vec3::NEG_Y), Vec3::new(1.0, 0.0, 0.0));
        // Looking into the sun adds half the sun color at the center
        let at_sun = sky.sample(Vec3::new(1.0, 1.0, 0.0).normalize());
        assert!((at_sun.x - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_rainbow_weights() {
        let r = Sampler::rainbow(
            solid(Vec3::X),
            solid(Vec3::Y),
            solid(Vec3::Z),
            Vec3::ONE,
        );
        let c = r.sample(Vec3::new(1.0, 0.0, -1.0));
        assert!((c - Vec3::new(1.0, 0.5, 0.0)).length() < 1e-6);
    }
}
