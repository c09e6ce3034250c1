//! Infinite plane through the object-space origin.

use crate::drawable::LocalHit;
use crate::error::{RenderError, RenderResult};
use ember_math::{approx_cmp, BoundingBox, Ray, Vec3, EPSILON};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InfinitePlane {
    normal: Vec3,
}

impl InfinitePlane {
    /// Create a plane with the given (not necessarily unit) normal.
    pub fn new(normal: Vec3) -> Self {
        Self {
            normal: normal.normalize_or_zero(),
        }
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub(crate) fn validate(&self) -> RenderResult<()> {
        if self.normal == Vec3::ZERO || !self.normal.is_finite() {
            return Err(RenderError::InvalidShape {
                name: "infinite plane",
                reason: "normal must be a non-zero vector".to_string(),
            });
        }
        Ok(())
    }

    /// Planes have no finite extent.
    pub(crate) fn bounds(&self) -> BoundingBox {
        BoundingBox::ZERO
    }

    pub(crate) fn intersect(&self, ray: &Ray) -> Option<LocalHit> {
        let mut n = self.normal;
        let mut denom = n.dot(ray.direction());
        // Back face unless the ray runs against the normal
        let mut inside = true;
        match approx_cmp(denom, 0.0) {
            Ordering::Equal => return None,
            Ordering::Less => {
                n = -n;
                denom = -denom;
                inside = false;
            }
            Ordering::Greater => {}
        }

        let t = (-ray.origin()).dot(n) / denom;
        if t < EPSILON {
            return None;
        }

        let p = ray.at(t);
        Some(LocalHit {
            t,
            position: p,
            normal: -n,
            texture: p,
            inside,
        })
    }
}
