// Affine transforms for object-space ray tracing
//
// Wraps glam::Mat4 together with its cached inverse and inverse-transpose so
// rays can be moved into object space and normals back out under
// non-uniform scale.

use glam::{Mat4, Vec3};
use thiserror::Error;

use crate::{BoundingBox, Ray};

/// Determinants smaller than this are treated as singular.
const MIN_DETERMINANT: f32 = 1.0e-12;

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum TransformError {
    #[error("transform matrix is not invertible (determinant {determinant})")]
    Singular { determinant: f32 },
}

/// An invertible affine transform with cached inverse matrices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    matrix: Mat4,
    inverse: Mat4,
    inverse_transpose: Mat4,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        matrix: Mat4::IDENTITY,
        inverse: Mat4::IDENTITY,
        inverse_transpose: Mat4::IDENTITY,
    };

    /// Build a transform, rejecting matrices that cannot be inverted.
    pub fn new(matrix: Mat4) -> Result<Self, TransformError> {
        let determinant = matrix.determinant();
        if !determinant.is_finite() || determinant.abs() < MIN_DETERMINANT {
            return Err(TransformError::Singular { determinant });
        }

        let inverse = matrix.inverse();
        if !inverse.is_finite() {
            return Err(TransformError::Singular { determinant });
        }

        Ok(Self {
            matrix,
            inverse,
            inverse_transpose: inverse.transpose(),
        })
    }

    /// Local-to-world matrix.
    #[inline]
    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    /// World-to-local matrix.
    #[inline]
    pub fn inverse(&self) -> Mat4 {
        self.inverse
    }

    /// Move a world-space ray into object space.
    ///
    /// The direction is transformed without renormalizing so the ray parameter
    /// `t` means the same thing in both spaces.
    #[inline]
    pub fn to_object_ray(&self, ray: &Ray) -> Ray {
        Ray::new(
            self.inverse.transform_point3(ray.origin()),
            self.inverse.transform_vector3(ray.direction()),
        )
    }

    #[inline]
    pub fn point_to_world(&self, p: Vec3) -> Vec3 {
        self.matrix.transform_point3(p)
    }

    #[inline]
    pub fn point_to_object(&self, p: Vec3) -> Vec3 {
        self.inverse.transform_point3(p)
    }

    /// Map an object-space normal to a world-space unit normal.
    #[inline]
    pub fn normal_to_world(&self, n: Vec3) -> Vec3 {
        self.inverse_transpose.transform_vector3(n).normalize_or_zero()
    }

    /// Transform an object-space box into a world-space box.
    ///
    /// All 8 corners are transformed since rotations and shears do not keep
    /// boxes axis aligned. The unbounded sentinel passes through unchanged.
    pub fn bounds_to_world(&self, bounds: &BoundingBox) -> BoundingBox {
        if bounds.is_zero() {
            return BoundingBox::ZERO;
        }

        let corners = bounds.corners();
        let first = self.matrix.transform_point3(corners[0]);
        let (lo, hi) = corners[1..]
            .iter()
            .map(|&corner| self.matrix.transform_point3(corner))
            .fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));

        BoundingBox::from_min_max(lo, hi)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
