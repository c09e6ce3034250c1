//! Background radiance for rays that escape the scene.

use std::sync::Arc;

use ember_math::{Ray, Vec3};

use crate::sampler::Sampler;

/// Evaluates a sampler at the escaping ray's unit direction.
#[derive(Debug, Clone)]
pub struct Environment {
    sampler: Arc<Sampler>,
}

impl Environment {
    pub fn new(sampler: Arc<Sampler>) -> Self {
        Self { sampler }
    }

    pub fn solid(color: Vec3) -> Self {
        Self::new(Arc::new(Sampler::solid(color)))
    }

    pub fn sampler(&self) -> &Arc<Sampler> {
        &self.sampler
    }

    #[inline]
    pub fn shade(&self, ray: &Ray) -> Vec3 {
        self.sampler.sample(ray.unit_direction())
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::solid(Vec3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uses_unit_direction() {
        let rainbow = Sampler::rainbow(
            Arc::new(Sampler::solid(Vec3::X)),
            Arc::new(Sampler::solid(Vec3::Y)),
            Arc::new(Sampler::solid(Vec3::Z)),
            Vec3::ONE,
        );
        let env = Environment::new(Arc::new(rainbow));

        // Direction length must not matter
        let short = env.shade(&Ray::new(Vec3::ZERO, Vec3::X));
        let long = env.shade(&Ray::new(Vec3::ZERO, Vec3::X * 50.0));
        assert_eq!(short, long);
        assert_eq!(short, Vec3::new(1.0, 0.5, 0.5));
    }

    #[test]
    fn test_default_is_black() {
        let env = Environment::default();
        assert_eq!(env.shade(&Ray::default()), Vec3::ZERO);
    }
}
