//! Sphere primitive for ray tracing.

use crate::drawable::LocalHit;
use crate::error::{RenderError, RenderResult};
use ember_math::{BoundingBox, Ray, Vec3, EPSILON};

/// A sphere centered at the object-space origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    radius: f32,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(radius: f32) -> Self {
        Self { radius }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub(crate) fn validate(&self) -> RenderResult<()> {
        if self.radius.is_finite() && self.radius > 0.0 {
            Ok(())
        } else {
            Err(RenderError::InvalidShape {
                name: "sphere",
                reason: format!("radius must be positive, got {}", self.radius),
            })
        }
    }

    pub(crate) fn bounds(&self) -> BoundingBox {
        let d = 2.0 * self.radius;
        BoundingBox::new(Vec3::ZERO, d, d, d)
    }

    pub(crate) fn intersect(&self, ray: &Ray) -> Option<LocalHit> {
        let o = ray.origin();
        let d = ray.direction();
        let a = d.length_squared();
        let half_b = o.dot(d);
        let c = o.length_squared() - self.radius * self.radius;

        let discriminant = half_b * half_b - a * c;
        if discriminant < 0.0 || a == 0.0 {
            return None;
        }
        let sqrtd = discriminant.sqrt();

        // Nearest root first; fall back to the far root from inside
        let near = (-half_b - sqrtd) / a;
        let (t, inside) = if near > EPSILON {
            (near, false)
        } else {
            let far = (-half_b + sqrtd) / a;
            if far <= EPSILON {
                return None;
            }
            (far, true)
        };

        let p = ray.at(t);
        let outward = p / self.radius;
        Some(LocalHit {
            t,
            position: p,
            normal: if inside { -outward } else { outward },
            texture: p,
            inside,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_hit() {
        let sphere = Sphere::new(1.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));

        let hit = sphere.intersect(&ray).expect("ray should hit");
        assert!((hit.t - 4.0).abs() < 1e-4);
        assert!((hit.position - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-4);
        assert!((hit.normal - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-4);
        assert!(!hit.inside);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = Sphere::new(1.0);
        let ray = Ray::new(Vec3::new(2.0, 2.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(sphere.intersect(&ray).is_none());

        // Pointing away
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(sphere.intersect(&ray).is_none());
    }

    #[test]
    fn test_sphere_hit_from_inside() {
        let sphere = Sphere::new(2.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        let hit = sphere.intersect(&ray).expect("ray should exit");
        assert!((hit.t - 2.0).abs() < 1e-4);
        assert!(hit.inside);
        // Normal faces back against the ray
        assert!((hit.normal - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_sphere_bounds_and_validation() {
        let b = Sphere::new(1.5).bounds();
        assert_eq!(b.size(), Vec3::splat(3.0));
        assert!(Sphere::new(0.0).validate().is_err());
        assert!(Sphere::new(1.0).validate().is_ok());
    }
}
