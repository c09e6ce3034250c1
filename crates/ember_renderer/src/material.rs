//! Surface materials for the recursive Monte-Carlo integrator.
//!
//! Materials are immutable once built and shared between drawables through
//! `Arc`. Each `shade` call either terminates (emissive, fast diffuse) or
//! spawns one secondary ray back into the scene with `depth - 1`.

use std::sync::Arc;

use ember_math::{gen_f32, sphere_random, Ray, Vec3, EPSILON};
use rand::rngs::StdRng;
use rand::RngCore;

use crate::drawable::Intersection;
use crate::sampler::Sampler;
use crate::scene::Scene;

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// Random source handed through the shading recursion.
///
/// `begin_bounce` is called once per recursion level so quasi-random
/// implementations can restart their dimension cursor.
pub trait ShadeSampler: RngCore {
    fn begin_bounce(&mut self) {}
}

impl ShadeSampler for StdRng {}

#[derive(Debug, Clone)]
pub enum MaterialKind {
    Emissive {
        color: Arc<Sampler>,
    },
    /// Two fixed directional lights, no recursion. Debugging aid.
    FastDiffuse {
        color: Arc<Sampler>,
    },
    Lambertian {
        color: Arc<Sampler>,
    },
    Reflect {
        color: Arc<Sampler>,
        scatter: f32,
    },
    Refract {
        color: Arc<Sampler>,
        ior: f32,
        scatter: f32,
    },
    /// Picks `low` with the Schlick reflectance probability, else `high`.
    Schlick {
        high: Arc<Material>,
        low: Arc<Material>,
        ior: f32,
        r0: f32,
    },
}

#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    kind: MaterialKind,
}

impl Material {
    pub fn emissive(name: impl Into<String>, color: impl Into<Arc<Sampler>>) -> Self {
        Self::from_kind(name, MaterialKind::Emissive { color: color.into() })
    }

    pub fn fast_diffuse(name: impl Into<String>, color: impl Into<Arc<Sampler>>) -> Self {
        Self::from_kind(name, MaterialKind::FastDiffuse { color: color.into() })
    }

    pub fn lambertian(name: impl Into<String>, color: impl Into<Arc<Sampler>>) -> Self {
        Self::from_kind(name, MaterialKind::Lambertian { color: color.into() })
    }

    /// Mirror reflection; `scatter > 0` blurs the reflected direction.
    pub fn reflect(name: impl Into<String>, color: impl Into<Arc<Sampler>>, scatter: f32) -> Self {
        Self::from_kind(
            name,
            MaterialKind::Reflect {
                color: color.into(),
                scatter,
            },
        )
    }

    pub fn refract(
        name: impl Into<String>,
        color: impl Into<Arc<Sampler>>,
        ior: f32,
        scatter: f32,
    ) -> Self {
        Self::from_kind(
            name,
            MaterialKind::Refract {
                color: color.into(),
                ior,
                scatter,
            },
        )
    }

    /// Fresnel blend: `low` is taken with Schlick's reflectance probability,
    /// `high` otherwise.
    pub fn schlick(
        name: impl Into<String>,
        high: Arc<Material>,
        low: Arc<Material>,
        ior: f32,
    ) -> Self {
        Self::from_kind(
            name,
            MaterialKind::Schlick {
                high,
                low,
                ior,
                r0: schlick_r0(ior),
            },
        )
    }

    fn from_kind(name: impl Into<String>, kind: MaterialKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn kind(&self) -> &MaterialKind {
        &self.kind
    }

    /// Radiance leaving `hit` back along `ray`. Zero once `depth` runs out.
    ///
    /// Color samplers are evaluated at `hit.texture`, the hit point mapped
    /// through the drawable's [`Projection`](crate::drawable::Projection).
    /// With `Projection::None` that is the object-space hit position.
    pub fn shade<R: ShadeSampler + ?Sized>(
        &self,
        ray: &Ray,
        scene: &Scene,
        hit: &Intersection<'_>,
        depth: u32,
        rng: &mut R,
    ) -> Vec3 {
        if depth == 0 {
            return Vec3::ZERO;
        }

        match &self.kind {
            MaterialKind::Emissive { color } => color.sample(hit.texture),

            MaterialKind::FastDiffuse { color } => {
                let m1 = hit.normal.dot(Vec3::Z).max(0.0);
                let m2 = hit.normal.dot(Vec3::new(2.0, 1.0, -1.0)).max(0.0);
                (m1 * 0.6 + m2 * 0.4) * color.sample(hit.texture)
            }

            MaterialKind::Lambertian { color } => {
                let from = hit.position + hit.normal * EPSILON;
                let mut direction = hit.normal + sphere_random(rng);
                // Catch degenerate scatter direction
                if direction.length_squared() < 1e-8 {
                    direction = hit.normal;
                }
                scene.shade(&Ray::new(from, direction), depth - 1, rng) * color.sample(hit.texture)
            }

            MaterialKind::Reflect { color, scatter } => {
                let from = hit.position + hit.normal * EPSILON;
                let mut direction = reflect(ray.unit_direction(), hit.normal);
                if *scatter > 0.0 {
                    direction += sphere_random(rng) * *scatter;
                }
                scene.shade(&Ray::new(from, direction), depth - 1, rng) * color.sample(hit.texture)
            }

            MaterialKind::Refract {
                color,
                ior,
                scatter,
            } => {
                let d = if *scatter > 0.0 {
                    (ray.unit_direction() + sphere_random(rng) * *scatter).normalize_or_zero()
                } else {
                    ray.unit_direction()
                };
                let ratio = if hit.inside { *ior } else { 1.0 / *ior };
                let c = hit.normal.dot(d);
                let s = 1.0 - ratio * ratio * (1.0 - c * c);

                let next = if s < EPSILON {
                    // Total internal reflection
                    Ray::new(hit.position + hit.normal * EPSILON, reflect(d, hit.normal))
                } else {
                    let refracted = (ratio * -c - s.sqrt()) * hit.normal + ratio * d;
                    Ray::new(hit.position - hit.normal * EPSILON, refracted)
                };

                // Each pass through a solid refracts twice
                let tint = color.sample(hit.texture).max(Vec3::ZERO);
                let attenuation = Vec3::new(tint.x.sqrt(), tint.y.sqrt(), tint.z.sqrt());
                scene.shade(&next, depth - 1, rng) * attenuation
            }

            MaterialKind::Schlick { high, low, r0, .. } => {
                let cos_theta = ray.unit_direction().dot(-hit.normal);
                let material = if gen_f32(rng) < schlick_reflectance(*r0, cos_theta) {
                    low
                } else {
                    high
                };
                material.shade(ray, scene, hit, depth, rng)
            }
        }
    }
}

/// Mirror `d` about `n`.
#[inline]
pub fn reflect(d: Vec3, n: Vec3) -> Vec3 {
    d - 2.0 * d.dot(n) * n
}

/// Reflectance at normal incidence for a given index of refraction.
#[inline]
pub fn schlick_r0(ior: f32) -> f32 {
    let r = (ior - 1.0) / (ior + 1.0);
    r * r
}

/// Schlick's approximation of Fresnel reflectance.
#[inline]
pub fn schlick_reflectance(r0: f32, cos_theta: f32) -> f32 {
    r0 + (1.0 - r0) * (1.0 - cos_theta).powi(5)
}
