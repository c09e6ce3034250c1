//! Axis-aligned box primitive.

use crate::drawable::LocalHit;
use crate::error::{RenderError, RenderResult};
use ember_math::{approx_eq, BoundingBox, Ray, Vec3, EPSILON};

/// A box centered at the object-space origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cuboid {
    width: f32,
    height: f32,
    depth: f32,
}

impl Cuboid {
    pub fn new(width: f32, height: f32, depth: f32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// A cube with the given edge length.
    pub fn cube(size: f32) -> Self {
        Self::new(size, size, size)
    }

    pub fn size(&self) -> Vec3 {
        Vec3::new(self.width, self.height, self.depth)
    }

    pub(crate) fn validate(&self) -> RenderResult<()> {
        let size = self.size();
        if size.is_finite() && size.min_element() > 0.0 {
            Ok(())
        } else {
            Err(RenderError::InvalidShape {
                name: "box",
                reason: format!("extents must be positive, got {size}"),
            })
        }
    }

    pub(crate) fn bounds(&self) -> BoundingBox {
        BoundingBox::new(Vec3::ZERO, self.width, self.height, self.depth)
    }

    /// Slab test over X, Y, Z in that order.
    ///
    /// Comparisons are strict so on a tie the earlier axis keeps the normal.
    pub(crate) fn intersect(&self, ray: &Ray) -> Option<LocalHit> {
        let d0 = ray.origin();
        let dir = ray.direction();
        let half = self.size() * 0.5;

        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;
        let mut n_near = Vec3::ZERO;
        let mut n_far = Vec3::ZERO;

        for axis in 0..3 {
            let c1 = -half[axis];
            let c2 = half[axis];
            if approx_eq(dir[axis], 0.0) {
                if d0[axis] < c1 || d0[axis] > c2 {
                    return None;
                }
                continue;
            }

            let mut t1 = (c1 - d0[axis]) / dir[axis];
            let mut t2 = (c2 - d0[axis]) / dir[axis];
            let mut n = -1.0;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
                n = 1.0;
            }

            if t1 > t_near {
                t_near = t1;
                n_near = axis_vector(axis, n);
            }
            if t2 < t_far {
                t_far = t2;
                n_far = axis_vector(axis, n);
            }
            if t_near > t_far || t_far < 0.0 {
                return None;
            }
        }

        let (t, normal, inside) = if t_near < EPSILON {
            (t_far, n_far, true)
        } else {
            (t_near, n_near, false)
        };
        if t <= EPSILON || !t.is_finite() {
            return None;
        }

        let p = ray.at(t);
        Some(LocalHit {
            t,
            position: p,
            normal,
            texture: p,
            inside,
        })
    }
}

#[inline]
fn axis_vector(axis: usize, value: f32) -> Vec3 {
    let mut v = Vec3::ZERO;
    v[axis] = value;
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_hit_front_face() {
        let cuboid = Cuboid::cube(2.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));

        let hit = cuboid.intersect(&ray).expect("ray should hit");
        assert!((hit.t - 4.0).abs() < 1e-4);
        assert_eq!(hit.normal, Vec3::new(0.0, 0.0, -1.0));
        assert!(!hit.inside);
    }

    #[test]
    fn test_box_hit_from_inside() {
        let cuboid = Cuboid::new(2.0, 4.0, 6.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::Y);

        let hit = cuboid.intersect(&ray).expect("ray should exit");
        assert!((hit.t - 2.0).abs() < 1e-4);
        assert!(hit.inside);
        // Normal faces back against the ray
        assert_eq!(hit.normal, Vec3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn test_box_miss() {
        let cuboid = Cuboid::cube(2.0);
        let ray = Ray::new(Vec3::new(3.0, 0.0, -5.0), Vec3::Z);
        assert!(cuboid.intersect(&ray).is_none());

        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), -Vec3::Z);
        assert!(cuboid.intersect(&ray).is_none());
    }

    #[test]
    fn test_box_corner_tie_prefers_first_axis() {
        // Diagonal ray reaching the x and y faces at the same t
        let cuboid = Cuboid::cube(2.0);
        let ray = Ray::new(Vec3::new(-3.0, -3.0, 0.0), Vec3::new(1.0, 1.0, 0.0));

        let hit = cuboid.intersect(&ray).expect("ray should hit the edge");
        assert!((hit.t - 2.0).abs() < 1e-4);
        assert_eq!(hit.normal, Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_box_validation() {
        assert!(Cuboid::new(1.0, 0.0, 1.0).validate().is_err());
        assert!(Cuboid::cube(1.0).validate().is_ok());
    }
}
