//! Torus around the object-space Y axis.

use crate::drawable::LocalHit;
use crate::error::{RenderError, RenderResult};
use crate::quartic::solve_quartic;
use ember_math::{BoundingBox, Ray, Vec3, EPSILON};

/// Roots with a larger imaginary part are not real intersections.
const MAX_IMAGINARY: f64 = 1.0e-2;

/// A ring of radius `major_radius` swept by a tube of radius `minor_radius`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Torus {
    major_radius: f32,
    minor_radius: f32,
}

impl Torus {
    pub fn new(major_radius: f32, minor_radius: f32) -> Self {
        Self {
            major_radius,
            minor_radius,
        }
    }

    pub fn major_radius(&self) -> f32 {
        self.major_radius
    }

    pub fn minor_radius(&self) -> f32 {
        self.minor_radius
    }

    pub(crate) fn validate(&self) -> RenderResult<()> {
        let (big, small) = (self.major_radius, self.minor_radius);
        if big.is_finite() && small.is_finite() && big > 0.0 && small > 0.0 {
            Ok(())
        } else {
            Err(RenderError::InvalidShape {
                name: "torus",
                reason: format!("radii must be positive, got {big} and {small}"),
            })
        }
    }

    pub(crate) fn bounds(&self) -> BoundingBox {
        let d = 2.0 * (self.major_radius + self.minor_radius);
        BoundingBox::new(Vec3::ZERO, d, 2.0 * self.minor_radius, d)
    }

    /// Real roots of the ray/torus quartic in ascending order.
    fn roots(&self, ray: &Ray) -> Vec<f64> {
        let o = ray.origin().as_dvec3();
        let d = ray.direction().as_dvec3();
        let big = self.major_radius as f64;
        let small = self.minor_radius as f64;
        let big2 = big * big;

        let g = 4.0 * big2 * (d.x * d.x + d.z * d.z);
        let h = 8.0 * big2 * (o.x * d.x + o.z * d.z);
        let i = 4.0 * big2 * (o.x * o.x + o.z * o.z);
        let j = d.length_squared();
        let k = 2.0 * o.dot(d);
        let l = o.length_squared() + big2 - small * small;

        if j == 0.0 {
            return Vec::new();
        }

        let mut real: Vec<f64> = solve_quartic(
            j * j,
            2.0 * j * k,
            2.0 * j * l + k * k - g,
            2.0 * k * l - h,
            l * l - i,
        )
        .iter()
        .filter(|root| root.im.abs() <= MAX_IMAGINARY && root.re.is_finite())
        .map(|root| root.re)
        .collect();
        real.sort_by(|a, b| a.total_cmp(b));
        real
    }

    /// Nearest root past epsilon.
    ///
    /// Roots alternate entering and leaving the solid, so odd ranks are
    /// reached from inside the tube.
    pub(crate) fn intersect(&self, ray: &Ray) -> Option<LocalHit> {
        let roots = self.roots(ray);
        let (rank, t) = roots
            .into_iter()
            .enumerate()
            .find(|&(_, t)| t > EPSILON as f64)?;
        let t = t as f32;
        let inside = rank % 2 == 1;

        let p = ray.at(t);
        let alpha = self.major_radius / (p.x * p.x + p.z * p.z).sqrt();
        let outward = Vec3::new((1.0 - alpha) * p.x, p.y, (1.0 - alpha) * p.z).normalize_or_zero();
        Some(LocalHit {
            t,
            position: p,
            normal: if inside { -outward } else { outward },
            texture: p,
            inside,
        })
    }
}
