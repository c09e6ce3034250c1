//! Capped cylinder and truncated cone around the object-space Y axis.

use crate::drawable::LocalHit;
use crate::error::{RenderError, RenderResult};
use ember_math::{BoundingBox, Ray, Vec3, EPSILON};

/// Coefficients below this are treated as zero in the lateral quadratic.
const DEGENERATE: f32 = 1.0e-9;

/// A cylinder spanning `y` in `[-height/2, height/2]`.
///
/// `radius1` is the radius of the top cap and `radius2` of the bottom cap;
/// differing radii give a truncated cone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cylinder {
    radius1: f32,
    radius2: f32,
    height: f32,
}

impl Cylinder {
    pub fn new(radius1: f32, radius2: f32, height: f32) -> Self {
        Self {
            radius1,
            radius2,
            height,
        }
    }

    /// A straight cylinder with equal cap radii.
    pub fn uniform(radius: f32, height: f32) -> Self {
        Self::new(radius, radius, height)
    }

    pub(crate) fn validate(&self) -> RenderResult<()> {
        let finite =
            self.radius1.is_finite() && self.radius2.is_finite() && self.height.is_finite();
        let reason = if !finite {
            Some("parameters must be finite".to_string())
        } else if self.height <= 0.0 {
            Some(format!("height must be positive, got {}", self.height))
        } else if self.radius1 < 0.0 || self.radius2 < 0.0 {
            Some("radii must not be negative".to_string())
        } else if self.radius1.max(self.radius2) <= 0.0 {
            Some("at least one radius must be positive".to_string())
        } else {
            None
        };

        match reason {
            Some(reason) => Err(RenderError::InvalidShape {
                name: "cylinder",
                reason,
            }),
            None => Ok(()),
        }
    }

    pub(crate) fn bounds(&self) -> BoundingBox {
        let d = 2.0 * self.radius1.max(self.radius2);
        BoundingBox::new(Vec3::ZERO, d, self.height, d)
    }

    /// Radius change per unit of height.
    #[inline]
    fn slope(&self) -> f32 {
        (self.radius1 - self.radius2) / self.height
    }

    /// Radius of the lateral surface at height `y`.
    #[inline]
    fn radius_at(&self, y: f32) -> f32 {
        0.5 * (self.radius1 + self.radius2) + self.slope() * y
    }

    fn contains(&self, p: Vec3) -> bool {
        let r = self.radius_at(p.y);
        p.y.abs() < self.height / 2.0 && r > 0.0 && p.x * p.x + p.z * p.z < r * r
    }

    pub(crate) fn intersect(&self, ray: &Ray) -> Option<LocalHit> {
        let o = ray.origin();
        let d = ray.direction();
        let half_height = self.height / 2.0;
        let s = self.slope();
        let r_origin = self.radius_at(o.y);

        // x^2 + z^2 = r(y)^2 along the ray
        let a = d.x * d.x + d.z * d.z - s * s * d.y * d.y;
        let half_b = o.x * d.x + o.z * d.z - s * d.y * r_origin;
        let c = o.x * o.x + o.z * o.z - r_origin * r_origin;

        let mut best: Option<(f32, Vec3)> = None;
        let mut consider = |t: f32, normal: Vec3| {
            if t > EPSILON && best.map_or(true, |(bt, _)| t < bt) {
                best = Some((t, normal));
            }
        };

        let mut lateral = |t: f32| {
            let p = ray.at(t);
            if p.y.abs() <= half_height {
                let r = self.radius_at(p.y);
                let normal = Vec3::new(p.x, -s * r, p.z).normalize_or_zero();
                consider(t, normal);
            }
        };

        if a.abs() > DEGENERATE {
            let discriminant = half_b * half_b - a * c;
            if discriminant >= 0.0 {
                let sq = discriminant.sqrt();
                lateral((-half_b - sq) / a);
                lateral((-half_b + sq) / a);
            }
        } else if half_b.abs() > DEGENERATE {
            lateral(-c / (2.0 * half_b));
        }

        // Lateral roots outside the height range fall through to the caps
        if d.y.abs() > DEGENERATE {
            let caps = [
                (half_height, self.radius1, Vec3::Y),
                (-half_height, self.radius2, Vec3::NEG_Y),
            ];
            for (y, radius, normal) in caps {
                if radius <= EPSILON {
                    continue;
                }
                let t = (y - o.y) / d.y;
                let p = ray.at(t);
                if p.x * p.x + p.z * p.z <= radius * radius {
                    consider(t, normal);
                }
            }
        }

        let (t, outward) = best?;
        let inside = self.contains(o);
        let p = ray.at(t);
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
    fn test_cylinder_lateral_hit() {
        let cylinder = Cylinder::uniform(1.0, 2.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);

        let hit = cylinder.intersect(&ray).expect("ray should hit the side");
        assert!((hit.t - 4.0).abs() < 1e-4);
        assert!((hit.normal - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-4);
        assert!(!hit.inside);
    }

    #[test]
    fn test_cylinder_cap_hit_along_axis() {
        let cylinder = Cylinder::uniform(1.0, 2.0);
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y);

        let hit = cylinder.intersect(&ray).expect("ray should hit the top cap");
        assert!((hit.t - 4.0).abs() < 1e-4);
        assert_eq!(hit.normal, Vec3::Y);
    }

    #[test]
    fn test_cylinder_lateral_root_above_range_uses_cap() {
        let cylinder = Cylinder::uniform(1.0, 2.0);
        // Enters the infinite cylinder above the top, then crosses the cap
        let ray = Ray::new(Vec3::new(-2.5, 3.0, 0.0), Vec3::new(1.0, -1.0, 0.0));

        let hit = cylinder.intersect(&ray).expect("ray should hit the cap");
        assert!((hit.t - 2.0).abs() < 1e-4);
        assert!((hit.position.y - 1.0).abs() < 1e-4);
        assert_eq!(hit.normal, Vec3::Y);
    }

    #[test]
    fn test_cylinder_from_inside() {
        let cylinder = Cylinder::uniform(1.0, 2.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        let hit = cylinder.intersect(&ray).expect("ray should exit");
        assert!((hit.t - 1.0).abs() < 1e-4);
        assert!(hit.inside);
        assert!((hit.normal - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_cone_radius_varies_with_height() {
        // Top radius 0.5, bottom radius 1.5
        let cone = Cylinder::new(0.5, 1.5, 2.0);

        let low = Ray::new(Vec3::new(0.0, -0.5, -5.0), Vec3::Z);
        let high = Ray::new(Vec3::new(0.0, 0.5, -5.0), Vec3::Z);
        let low_hit = cone.intersect(&low).unwrap();
        let high_hit = cone.intersect(&high).unwrap();

        assert!((low_hit.position.z + 1.25).abs() < 1e-3);
        assert!((high_hit.position.z + 0.75).abs() < 1e-3);
        // Side normal of a cone narrowing upwards tilts up
        assert!(low_hit.normal.y > 0.0);
    }

    #[test]
    fn test_cylinder_miss() {
        let cylinder = Cylinder::uniform(1.0, 2.0);
        let ray = Ray::new(Vec3::new(0.0, 2.0, -5.0), Vec3::Z);
        assert!(cylinder.intersect(&ray).is_none());
    }

    #[test]
    fn test_cylinder_validation() {
        assert!(Cylinder::new(0.0, 0.0, 1.0).validate().is_err());
        assert!(Cylinder::new(1.0, 1.0, -1.0).validate().is_err());
        assert!(Cylinder::new(0.0, 1.0, 1.0).validate().is_ok());
    }
}
