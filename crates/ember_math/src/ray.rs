use crate::Vec3;

/// A ray in 3D space with origin and direction.
///
/// The unit direction is derived once at construction. Intersection distances
/// are measured in units of `direction`, so rays built with a unit direction
/// report true distances.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    origin: Vec3,
    direction: Vec3,
    unit_direction: Vec3,
}

impl Ray {
    /// Create a new ray.
    ///
    /// A zero-length direction produces a zero unit direction rather than NaN.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            unit_direction: direction.normalize_or_zero(),
        }
    }

    /// Get the origin point of the ray.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Get the direction vector of the ray, as given at construction.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Get the normalized direction of the ray.
    #[inline]
    pub fn unit_direction(&self) -> Vec3 {
        self.unit_direction
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::Z)
    }
}
