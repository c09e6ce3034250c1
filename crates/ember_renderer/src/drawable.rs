//! Drawables: a shape, a material and a transform, intersected in object space.

use std::cmp::Ordering;
use std::f32::consts::PI;
use std::sync::Arc;

use ember_math::{BoundingBox, Mat4, Ray, Transform, Vec3};

use crate::cuboid::Cuboid;
use crate::cylinder::Cylinder;
use crate::error::RenderResult;
use crate::material::Material;
use crate::plane::InfinitePlane;
use crate::sphere::Sphere;
use crate::torus::Torus;

/// Object-space result of a shape solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalHit {
    pub t: f32,
    pub position: Vec3,
    /// Unit normal facing against the ray
    pub normal: Vec3,
    pub texture: Vec3,
    /// Ray origin was inside the solid
    pub inside: bool,
}

/// How texture coordinates handed to samplers are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Projection {
    /// Whatever the shape solver reports (the object-space hit point)
    #[default]
    None,
    World,
    Object,
    /// Longitude and colatitude, both normalized to [0, 1]
    Sphere,
    /// Angle around Y normalized to [0, 1], plus object-space height
    Cylinder,
    /// Planar projection along the dominant normal axis
    Box,
    PlaneXy,
    PlaneYz,
    PlaneZx,
}

impl Projection {
    fn project(self, hit: &LocalHit, world_position: Vec3) -> Vec3 {
        let p = hit.position;
        match self {
            Projection::None => hit.texture,
            Projection::World => world_position,
            Projection::Object => p,
            Projection::Sphere => {
                let longitude = p.z.atan2(p.x) / (2.0 * PI) + 0.5;
                let length = p.length();
                let colatitude = if length > 0.0 {
                    (p.y / length).clamp(-1.0, 1.0).acos() / PI
                } else {
                    0.0
                };
                Vec3::new(longitude, colatitude, 0.0)
            }
            Projection::Cylinder => Vec3::new(p.z.atan2(p.x) / (2.0 * PI) + 0.5, p.y, 0.0),
            Projection::Box => {
                let n = hit.normal.abs();
                if n.x >= n.y && n.x >= n.z {
                    Vec3::new(p.y, p.z, 0.0)
                } else if n.y >= n.z {
                    Vec3::new(p.z, p.x, 0.0)
                } else {
                    Vec3::new(p.x, p.y, 0.0)
                }
            }
            Projection::PlaneXy => Vec3::new(p.x, p.y, 0.0),
            Projection::PlaneYz => Vec3::new(p.y, p.z, 0.0),
            Projection::PlaneZx => Vec3::new(p.z, p.x, 0.0),
        }
    }
}

/// The closed set of supported primitives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Cuboid(Cuboid),
    Sphere(Sphere),
    Cylinder(Cylinder),
    InfinitePlane(InfinitePlane),
    Torus(Torus),
}

impl Shape {
    pub fn validate(&self) -> RenderResult<()> {
        match self {
            Shape::Cuboid(s) => s.validate(),
            Shape::Sphere(s) => s.validate(),
            Shape::Cylinder(s) => s.validate(),
            Shape::InfinitePlane(s) => s.validate(),
            Shape::Torus(s) => s.validate(),
        }
    }

    /// Object-space bounds; `BoundingBox::ZERO` for unbounded shapes.
    pub fn bounds(&self) -> BoundingBox {
        match self {
            Shape::Cuboid(s) => s.bounds(),
            Shape::Sphere(s) => s.bounds(),
            Shape::Cylinder(s) => s.bounds(),
            Shape::InfinitePlane(s) => s.bounds(),
            Shape::Torus(s) => s.bounds(),
        }
    }

    pub fn intersect(&self, ray: &Ray) -> Option<LocalHit> {
        match self {
            Shape::Cuboid(s) => s.intersect(ray),
            Shape::Sphere(s) => s.intersect(ray),
            Shape::Cylinder(s) => s.intersect(ray),
            Shape::InfinitePlane(s) => s.intersect(ray),
            Shape::Torus(s) => s.intersect(ray),
        }
    }
}

impl From<Cuboid> for Shape {
    fn from(shape: Cuboid) -> Self {
        Shape::Cuboid(shape)
    }
}

impl From<Sphere> for Shape {
    fn from(shape: Sphere) -> Self {
        Shape::Sphere(shape)
    }
}

impl From<Cylinder> for Shape {
    fn from(shape: Cylinder) -> Self {
        Shape::Cylinder(shape)
    }
}

impl From<InfinitePlane> for Shape {
    fn from(shape: InfinitePlane) -> Self {
        Shape::InfinitePlane(shape)
    }
}

impl From<Torus> for Shape {
    fn from(shape: Torus) -> Self {
        Shape::Torus(shape)
    }
}

/// A renderable primitive placed in the world.
#[derive(Debug, Clone)]
pub struct Drawable {
    pub name: Option<String>,
    pub shape: Shape,
    pub material: Arc<Material>,
    pub projection: Projection,
    transform: Transform,
}

impl Drawable {
    pub fn new(shape: impl Into<Shape>, material: Arc<Material>) -> Self {
        Self {
            name: None,
            shape: shape.into(),
            material,
            projection: Projection::None,
            transform: Transform::IDENTITY,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Place the drawable with an object-to-world matrix.
    ///
    /// Fails if the matrix cannot be inverted.
    pub fn with_transform(mut self, matrix: Mat4) -> RenderResult<Self> {
        self.set_transform(matrix)?;
        Ok(self)
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    pub fn set_transform(&mut self, matrix: Mat4) -> RenderResult<()> {
        self.transform = Transform::new(matrix)?;
        Ok(())
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// World-space bounds of the transformed shape.
    pub fn bounds(&self) -> BoundingBox {
        self.transform.bounds_to_world(&self.shape.bounds())
    }

    pub fn intersect(&self, ray: &Ray) -> Option<Intersection<'_>> {
        let local_ray = self.transform.to_object_ray(ray);
        let hit = self.shape.intersect(&local_ray)?;

        let position = self.transform.point_to_world(hit.position);
        Some(Intersection {
            t: hit.t,
            position,
            normal: self.transform.normal_to_world(hit.normal),
            texture: self.projection.project(&hit, position),
            inside: hit.inside,
            drawable: self,
        })
    }
}

/// The nearest hit between a ray and the scene.
#[derive(Debug, Clone, Copy)]
pub struct Intersection<'a> {
    pub t: f32,
    pub position: Vec3,
    pub normal: Vec3,
    pub texture: Vec3,
    pub inside: bool,
    pub drawable: &'a Drawable,
}

impl Intersection<'_> {
    /// Order by distance along the ray.
    pub fn cmp_t(&self, other: &Intersection<'_>) -> Ordering {
        self.t.total_cmp(&other.t)
    }
}

impl PartialEq for Intersection<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.t == other.t
    }
}

impl PartialOrd for Intersection<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.t.partial_cmp(&other.t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::Sampler;

    fn gray() -> Arc<Material> {
        Arc::new(Material::lambertian("gray", Sampler::solid(Vec3::splat(0.5))))
    }

    #[test]
    fn test_translated_sphere() {
        let drawable = Drawable::new(Sphere::new(1.0), gray())
            .with_transform(Mat4::from_translation(Vec3::new(0.0, 0.0, 5.0)))
            .unwrap();
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);

        let hit = drawable.intersect(&ray).expect("ray should hit");
        assert!((hit.t - 4.0).abs() < 1e-4);
        assert!((hit.position - Vec3::new(0.0, 0.0, 4.0)).length() < 1e-4);
        assert!((hit.normal - Vec3::NEG_Z).length() < 1e-4);
        assert!(std::ptr::eq(hit.drawable, &drawable));
    }

    #[test]
    fn test_scaled_sphere_normal_is_unit() {
        let drawable = Drawable::new(Sphere::new(1.0), gray())
            .with_transform(Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0)))
            .unwrap();
        let ray = Ray::new(Vec3::new(1.0, 5.0, 0.0), Vec3::NEG_Y);

        let hit = drawable.intersect(&ray).expect("ray should hit the ellipsoid");
        assert!((hit.normal.length() - 1.0).abs() < 1e-5);
        assert!(hit.normal.y > 0.0 && hit.normal.x > 0.0);
        // Stretched in x, so the normal tilts towards y
        assert!(hit.normal.x < 0.5);
    }

    #[test]
    fn test_singular_transform_rejected() {
        let result = Drawable::new(Sphere::new(1.0), gray()).with_transform(Mat4::ZERO);
        assert!(result.is_err());
    }

    #[test]
    fn test_world_bounds() {
        let drawable = Drawable::new(Cuboid::cube(2.0), gray())
            .with_transform(Mat4::from_translation(Vec3::new(3.0, 0.0, 0.0)))
            .unwrap();
        let b = drawable.bounds();
        assert_eq!(b.center, Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(b.size(), Vec3::splat(2.0));

        let plane = Drawable::new(InfinitePlane::new(Vec3::Y), gray());
        assert!(plane.bounds().is_zero());
    }

    #[test]
    fn test_projections() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        let translated = |projection| {
            Drawable::new(Sphere::new(1.0), gray())
                .with_transform(Mat4::from_translation(Vec3::new(0.0, 0.0, 1.0)))
                .unwrap()
                .with_projection(projection)
        };

        let drawable = translated(Projection::Object);
        let object = drawable.intersect(&ray).unwrap();
        assert!((object.texture - Vec3::NEG_Z).length() < 1e-4);

        let drawable = translated(Projection::World);
        let world = drawable.intersect(&ray).unwrap();
        assert!(world.texture.length() < 1e-4);

        let drawable = translated(Projection::Sphere);
        let sphere = drawable.intersect(&ray).unwrap();
        // Equator, looking along -Z
        assert!((sphere.texture.y - 0.5).abs() < 1e-4);
        assert!((sphere.texture.x - 0.25).abs() < 1e-4);

        let drawable = translated(Projection::PlaneZx);
        let planar = drawable.intersect(&ray).unwrap();
        assert!((planar.texture - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-4);
    }
}
