// Re-export glam for convenience
pub use glam::*;

// Ember math types
mod bounds;
mod ray;
mod transform;
mod utils;

pub use bounds::BoundingBox;
pub use ray::Ray;
pub use transform::{Transform, TransformError};
pub use utils::{
    approx_cmp, approx_eq, disc_random, gen_f32, sphere_random, DEFAULT_DEPTH, EPSILON,
};
