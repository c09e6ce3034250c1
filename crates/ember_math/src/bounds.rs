use crate::{Ray, Vec3};

/// Axis-aligned bounding box stored as a center point plus extents.
///
/// `BoundingBox::ZERO` is a sentinel meaning "no finite bounds"; shapes such
/// as infinite planes report it and are kept out of spatial indexing.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoundingBox {
    pub center: Vec3,
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl BoundingBox {
    /// Sentinel for unbounded shapes.
    pub const ZERO: BoundingBox = BoundingBox {
        center: Vec3::ZERO,
        width: 0.0,
        height: 0.0,
        depth: 0.0,
    };

    pub fn new(center: Vec3, width: f32, height: f32, depth: f32) -> Self {
        Self {
            center,
            width,
            height,
            depth,
        }
    }

    /// Create a box spanning two corner points.
    pub fn from_min_max(a: Vec3, b: Vec3) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        let size = max - min;
        Self::new((min + max) * 0.5, size.x, size.y, size.z)
    }

    /// True for the "no finite bounds" sentinel.
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Extents as a vector (width, height, depth).
    #[inline]
    pub fn size(&self) -> Vec3 {
        Vec3::new(self.width, self.height, self.depth)
    }

    #[inline]
    pub fn min(&self) -> Vec3 {
        self.center - self.size() * 0.5
    }

    #[inline]
    pub fn max(&self) -> Vec3 {
        self.center + self.size() * 0.5
    }

    /// Box enclosing both inputs.
    pub fn union(a: &BoundingBox, b: &BoundingBox) -> BoundingBox {
        BoundingBox::from_min_max(a.min().min(b.min()), a.max().max(b.max()))
    }

    /// The 8 corner points.
    pub fn corners(&self) -> [Vec3; 8] {
        let lo = self.min();
        let hi = self.max();
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// Split into the halves below and above `at` on the given axis (0=X, 1=Y, 2=Z).
    pub fn split(&self, axis: usize, at: f32) -> (BoundingBox, BoundingBox) {
        let lo = self.min();
        let hi = self.max();
        let at = at.clamp(lo[axis], hi[axis]);

        let mut left_hi = hi;
        left_hi[axis] = at;
        let mut right_lo = lo;
        right_lo[axis] = at;

        (
            BoundingBox::from_min_max(lo, left_hi),
            BoundingBox::from_min_max(right_lo, hi),
        )
    }

    /// Distance along the ray at which it enters the box.
    ///
    /// Exact slab method: only a zero direction component is treated as
    /// parallel. Returns the exit distance when the ray starts inside the
    /// box, and `f32::INFINITY` when the ray misses.
    pub fn intersect(&self, ray: &Ray) -> f32 {
        let d0 = ray.origin() - self.center;
        let dir = ray.direction();
        let half = self.size() * 0.5;
        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;

        for axis in 0..3 {
            let c1 = -half[axis];
            let c2 = half[axis];
            if dir[axis] == 0.0 {
                if d0[axis] < c1 || d0[axis] > c2 {
                    return f32::INFINITY;
                }
                continue;
            }

            let inv = 1.0 / dir[axis];
            let mut t1 = (c1 - d0[axis]) * inv;
            let mut t2 = (c2 - d0[axis]) * inv;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_near = t_near.max(t1);
            t_far = t_far.min(t2);
            if t_near > t_far || t_far < 0.0 {
                return f32::INFINITY;
            }
        }

        if t_near < 0.0 {
            t_far
        } else {
            t_near
        }
    }

    /// Test whether a point lies inside (or on) the box.
    pub fn contains(&self, p: Vec3) -> bool {
        let v = p - self.center;
        v.x.abs() <= self.width / 2.0
            && v.y.abs() <= self.height / 2.0
            && v.z.abs() <= self.depth / 2.0
    }

    /// Test whether two boxes overlap (touching counts).
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        let (a_lo, a_hi) = (self.min(), self.max());
        let (b_lo, b_hi) = (other.min(), other.max());
        a_lo.cmple(b_hi).all() && a_hi.cmpge(b_lo).all()
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_min_max() {
        let b = BoundingBox::from_min_max(Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 4.0, 2.0));

        assert_eq!(b.center, Vec3::new(5.0, 2.0, 1.0));
        assert_eq!(b.size(), Vec3::new(10.0, 4.0, 2.0));
        assert_eq!(b.min(), Vec3::ZERO);
        assert_eq!(b.max(), Vec3::new(10.0, 4.0, 2.0));
    }

    #[test]
    fn test_zero_sentinel() {
        assert!(BoundingBox::ZERO.is_zero());
        assert!(BoundingBox::default().is_zero());
        assert!(!BoundingBox::new(Vec3::ZERO, 1.0, 1.0, 1.0).is_zero());
    }

    #[test]
    fn test_union() {
        let a = BoundingBox::from_min_max(Vec3::ZERO, Vec3::splat(5.0));
        let b = BoundingBox::from_min_max(Vec3::splat(3.0), Vec3::splat(10.0));
        let u = BoundingBox::union(&a, &b);

        assert_eq!(u.min(), Vec3::ZERO);
        assert_eq!(u.max(), Vec3::splat(10.0));
    }

    #[test]
    fn test_intersect_from_outside_and_inside() {
        let b = BoundingBox::new(Vec3::ZERO, 2.0, 2.0, 2.0);

        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        assert!((b.intersect(&ray) - 4.0).abs() < 1e-5);

        // Starting inside reports the exit distance
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        assert!((b.intersect(&ray) - 1.0).abs() < 1e-5);

        // Pointing away
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), -Vec3::Z);
        assert_eq!(b.intersect(&ray), f32::INFINITY);

        // Parallel and outside the slab
        let ray = Ray::new(Vec3::new(3.0, 0.0, -5.0), Vec3::Z);
        assert_eq!(b.intersect(&ray), f32::INFINITY);
    }

    #[test]
    fn test_intersect_near_parallel_ray() {
        // A tiny y component still carries the ray into the box
        let b = BoundingBox::new(Vec3::ZERO, 1.0, 1.0, 1.0);
        let ray = Ray::new(Vec3::new(0.0, 0.50001, -5.0), Vec3::new(0.0, -9.0e-5, 1.0));
        let t = b.intersect(&ray);
        assert!(t.is_finite());
        assert!(b.contains(ray.at(t + 1e-3)));

        // Exactly parallel outside the slab still misses
        let ray = Ray::new(Vec3::new(0.0, 0.50001, -5.0), Vec3::Z);
        assert_eq!(b.intersect(&ray), f32::INFINITY);
    }

    #[test]
    fn test_intersect_just_outside_reports_entry() {
        let b = BoundingBox::new(Vec3::ZERO, 2.0, 2.0, 2.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, -1.00005), Vec3::Z);
        assert!(!b.contains(ray.origin()));
        let t = b.intersect(&ray);
        assert!(t < 1e-3, "expected the entry distance, got {}", t);
    }

    #[test]
    fn test_contains_and_overlaps() {
        let a = BoundingBox::new(Vec3::ZERO, 2.0, 2.0, 2.0);
        assert!(a.contains(Vec3::new(1.0, 0.5, -1.0)));
        assert!(!a.contains(Vec3::new(1.1, 0.0, 0.0)));

        let touching = BoundingBox::new(Vec3::new(2.0, 0.0, 0.0), 2.0, 2.0, 2.0);
        let apart = BoundingBox::new(Vec3::new(3.0, 0.0, 0.0), 1.0, 1.0, 1.0);
        assert!(a.overlaps(&touching));
        assert!(!a.overlaps(&apart));
    }

    #[test]
    fn test_split() {
        let b = BoundingBox::from_min_max(Vec3::ZERO, Vec3::new(10.0, 2.0, 2.0));
        let (left, right) = b.split(0, 4.0);

        assert_eq!(left.max().x, 4.0);
        assert_eq!(right.min().x, 4.0);
        assert_eq!(right.max(), b.max());
        assert_eq!(left.min(), b.min());
    }

    #[test]
    fn test_corners_span_box() {
        let b = BoundingBox::new(Vec3::ONE, 2.0, 4.0, 6.0);
        let corners = b.corners();
        let lo = corners.iter().fold(Vec3::splat(f32::MAX), |acc, c| acc.min(*c));
        let hi = corners.iter().fold(Vec3::splat(f32::MIN), |acc, c| acc.max(*c));
        assert_eq!(lo, b.min());
        assert_eq!(hi, b.max());
    }
}
