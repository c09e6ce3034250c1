//! Ember renderer - CPU Monte Carlo ray tracing
//!
//! Renders an in-memory scene of analytic shapes with recursive stochastic
//! materials. Bounded drawables are indexed by a BSP tree; camera and
//! material sampling draw from Sobol sequences, with blocks of the image
//! shaded in parallel.

mod block;
mod bsp;
mod camera;
mod color;
mod cuboid;
mod cylinder;
mod drawable;
mod environment;
mod error;
mod material;
mod plane;
mod quartic;
mod renderer;
mod sampler;
mod scene;
mod sobol;
mod sphere;
mod torus;

pub use block::{generate_blocks, Block};
pub use bsp::{Bsp, BspNode, MAX_DEPTH, MIN_LEAF_SIZE};
pub use camera::{Camera, CameraKind, CoordinateSystem, ProgressFn, Resolution};
pub use color::{ClampedRgb, ColorModel, Rgb};
pub use cuboid::Cuboid;
pub use cylinder::Cylinder;
pub use drawable::{Drawable, Intersection, LocalHit, Projection, Shape};
pub use environment::Environment;
pub use error::{RenderError, RenderResult};
pub use material::{
    reflect, schlick_r0, schlick_reflectance, Color, Material, MaterialKind, ShadeSampler,
};
pub use plane::InfinitePlane;
pub use quartic::solve_quartic;
pub use renderer::{PixelBuffer, RenderConfig};
pub use sampler::{Sampler, SamplerKind, DEFAULT_SUN_FALLOFF};
pub use scene::Scene;
pub use sobol::{SobolSequence, SobolStream, SobolTable, MAX_SEQUENCE_DIMENSIONS, SOBOL_BITS};
pub use sphere::Sphere;
pub use torus::Torus;

/// Re-export math types from ember_math
pub use ember_math::{BoundingBox, Mat4, Ray, Transform, Vec2, Vec3, DEFAULT_DEPTH, EPSILON};
