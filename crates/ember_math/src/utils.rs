//! Scalar constants and sampling helpers shared by geometry and shading.

use std::cmp::Ordering;

use rand::{Rng, RngCore};

use crate::{Vec2, Vec3};

/// Tolerance used by every geometric comparison.
pub const EPSILON: f32 = 1.0e-4;

/// Default recursion cap for shading.
pub const DEFAULT_DEPTH: u32 = 30;

/// Compare two scalars, treating values within `EPSILON` as equal.
#[inline]
pub fn approx_cmp(a: f32, b: f32) -> Ordering {
    if (a - b).abs() <= EPSILON {
        Ordering::Equal
    } else if a < b {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

#[inline]
pub fn approx_eq(a: f32, b: f32) -> bool {
    approx_cmp(a, b) == Ordering::Equal
}

/// Uniform sample in [0, 1).
#[inline]
pub fn gen_f32<R: RngCore + ?Sized>(rng: &mut R) -> f32 {
    rng.gen::<f32>()
}

/// Uniform point inside the unit disc (rejection sampled).
pub fn disc_random<R: RngCore + ?Sized>(rng: &mut R) -> Vec2 {
    loop {
        let p = Vec2::new(gen_f32(rng) * 2.0 - 1.0, gen_f32(rng) * 2.0 - 1.0);
        if p.length_squared() <= 1.0 {
            return p;
        }
    }
}

/// Uniform point inside the unit sphere (rejection sampled).
pub fn sphere_random<R: RngCore + ?Sized>(rng: &mut R) -> Vec3 {
    loop {
        let p = Vec3::new(
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
        );
        if p.length_squared() <= 1.0 {
            return p;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_approx_cmp() {
        assert_eq!(approx_cmp(1.0, 1.0 + EPSILON * 0.5), Ordering::Equal);
        assert_eq!(approx_cmp(1.0, 1.1), Ordering::Less);
        assert_eq!(approx_cmp(1.1, 1.0), Ordering::Greater);
        assert!(approx_eq(0.0, -EPSILON));
    }

    #[test]
    fn test_sphere_random_inside_unit_ball() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            assert!(sphere_random(&mut rng).length_squared() <= 1.0);
        }
    }

    #[test]
    fn test_disc_random_inside_unit_disc() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut sum = Vec2::ZERO;
        for _ in 0..2000 {
            let p = disc_random(&mut rng);
            assert!(p.length_squared() <= 1.0);
            sum += p;
        }
        // Roughly centred
        assert!((sum / 2000.0).length() < 0.1);
    }

    #[test]
    fn test_gen_f32_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1000 {
            let x = gen_f32(&mut rng);
            assert!((0.0..1.0).contains(&x));
        }
    }
}
