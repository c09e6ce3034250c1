//! Cameras and the parallel block renderer.
//!
//! A camera maps pixel positions to a [`CoordinateSystem`] once per render,
//! then turns each jittered pixel position into a primary ray. Rendering
//! tiles the image into [`Block`]s and shades them on the rayon pool; every
//! block owns its random state so results depend only on the camera seed.

use std::f32::consts::{FRAC_PI_2, PI};
use std::time::Instant;

use ember_math::{disc_random, EulerRot, Mat4, Ray, Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::block::{generate_blocks, Block};
use crate::error::{RenderError, RenderResult};
use crate::renderer::PixelBuffer;
use crate::scene::Scene;
use crate::sobol::{SobolSequence, SobolStream, SobolTable};

/// Sub-pixel positions used per pixel, spread evenly over the samples.
const JITTER_COUNT: u32 = 9;
/// Sobol dimensions consumed by sub-pixel jitter, placed first in the table.
const JITTER_DIMENSIONS: usize = 2;
/// Sobol dimensions consumed by camera ray generation.
const CAMERA_DIMENSIONS: usize = 3;
/// Sobol dimensions allotted to each shading bounce.
const SHADE_DIMENSIONS: usize = 10;
/// Distinct shading dimension blocks before they are reused.
const SHADE_CYCLE: u32 = 64;
/// First shading dimension, after the jitter and camera dimensions.
const SHADE_START: usize = JITTER_DIMENSIONS + CAMERA_DIMENSIONS;

/// Callback invoked on the worker thread that finished a block, with the
/// block's pixels in row-major order and the total block count.
pub type ProgressFn<'a> = &'a (dyn Fn(&Block, &[Vec3], usize) + Sync);

/// Output image size and tiling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resolution {
    pub pixel_height: u32,
    /// Width over height
    pub ratio: f32,
    pub block_width: u32,
    pub block_height: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            pixel_height: 200,
            ratio: 1.0,
            block_width: 32,
            block_height: 32,
        }
    }
}

impl Resolution {
    pub fn new(pixel_height: u32, ratio: f32) -> Self {
        Self {
            pixel_height,
            ratio,
            ..Self::default()
        }
    }

    pub fn pixel_width(&self) -> u32 {
        (self.pixel_height as f32 * self.ratio).round() as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraKind {
    /// Perspective camera looking at `target`. The image plane passes
    /// through the target, which stays in focus when `blur` is non-zero.
    Target {
        position: Vec3,
        target: Vec3,
        up: Vec3,
        /// Vertical field of view in degrees
        field_of_view: f32,
        /// Radius of the lens disc
        blur: f32,
    },
    /// Parallel projection centred on `position`.
    Orthographic {
        position: Vec3,
        direction: Vec3,
        up: Vec3,
        view_height: f32,
    },
    /// Equirectangular panorama around `position`.
    Spherical {
        position: Vec3,
        /// Yaw, pitch and roll in radians, as (pitch, yaw, roll) about (x, y, z)
        rotation: Vec3,
    },
}

/// Image plane of a camera: pixel `(col, row)` centres lie at
/// `origin + u * interval.x * col - v * interval.y * row`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateSystem {
    pub origin: Vec3,
    pub u: Vec3,
    pub v: Vec3,
    pub interval: Vec2,
}

impl CoordinateSystem {
    /// Point on the image plane for a pixel and a sub-pixel offset in `[0, 1)^2`.
    pub fn pixel_point(&self, col: u32, row: u32, offset: Vec2) -> Vec3 {
        self.origin + self.u * (self.interval.x * (col as f32 + offset.x - 0.5))
            - self.v * (self.interval.y * (row as f32 + offset.y - 0.5))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub resolution: Resolution,
    pub kind: CameraKind,
    pub seed: u64,
}

impl Camera {
    pub fn new(kind: CameraKind) -> Self {
        Self {
            resolution: Resolution::default(),
            kind,
            seed: 0,
        }
    }

    pub fn target(position: Vec3, target: Vec3, up: Vec3, field_of_view: f32) -> Self {
        Self::new(CameraKind::Target {
            position,
            target,
            up,
            field_of_view,
            blur: 0.0,
        })
    }

    pub fn orthographic(position: Vec3, direction: Vec3, up: Vec3, view_height: f32) -> Self {
        Self::new(CameraKind::Orthographic {
            position,
            direction,
            up,
            view_height,
        })
    }

    pub fn spherical(position: Vec3, rotation: Vec3) -> Self {
        Self::new(CameraKind::Spherical { position, rotation })
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the lens radius. Only target cameras have a lens.
    pub fn with_blur(mut self, radius: f32) -> Self {
        if let CameraKind::Target { blur, .. } = &mut self.kind {
            *blur = radius;
        }
        self
    }

    fn validate(&self, samples: u32) -> RenderResult<()> {
        if samples == 0 {
            return Err(RenderError::InvalidSampleCount(samples));
        }
        let res = &self.resolution;
        if res.pixel_height < 2 {
            return Err(RenderError::InvalidCamera(format!(
                "pixel height must be at least 2, got {}",
                res.pixel_height
            )));
        }
        if !(res.ratio > 0.0 && res.ratio.is_finite()) || res.pixel_width() == 0 {
            return Err(RenderError::InvalidCamera(format!(
                "invalid aspect ratio {}",
                res.ratio
            )));
        }
        if res.block_width == 0 || res.block_height == 0 {
            return Err(RenderError::InvalidCamera(
                "block size must be non-zero".to_string(),
            ));
        }

        match self.kind {
            CameraKind::Target {
                position,
                target,
                field_of_view,
                ..
            } => {
                if position == target {
                    return Err(RenderError::InvalidCamera(
                        "camera position equals its target".to_string(),
                    ));
                }
                if !(field_of_view > 0.0 && field_of_view < 180.0) {
                    return Err(RenderError::InvalidCamera(format!(
                        "field of view {} outside (0, 180)",
                        field_of_view
                    )));
                }
            }
            CameraKind::Orthographic {
                direction,
                view_height,
                ..
            } => {
                if direction.length_squared() == 0.0 {
                    return Err(RenderError::InvalidCamera(
                        "orthographic direction is zero".to_string(),
                    ));
                }
                if view_height <= 0.0 {
                    return Err(RenderError::InvalidCamera(format!(
                        "view height must be positive, got {}",
                        view_height
                    )));
                }
            }
            CameraKind::Spherical { .. } => {}
        }
        Ok(())
    }

    /// Build the image plane for the current resolution.
    pub fn coordinate_system(&self) -> CoordinateSystem {
        let width = self.resolution.pixel_width();
        let height = self.resolution.pixel_height;

        match self.kind {
            CameraKind::Target {
                position,
                target,
                up,
                field_of_view,
                ..
            } => {
                let diff = position - target;
                let n = diff.normalize_or_zero();
                let u = up.cross(n).normalize_or_zero();
                let v = n.cross(u);
                let h = 2.0 * diff.length() * (field_of_view.to_radians() / 2.0).tan();
                plane_through(target, u, v, h, width, height)
            }
            CameraKind::Orthographic {
                position,
                direction,
                up,
                view_height,
            } => {
                let n = -direction.normalize_or_zero();
                let u = up.cross(n).normalize_or_zero();
                let v = n.cross(u);
                plane_through(position, u, v, view_height, width, height)
            }
            CameraKind::Spherical { .. } => {
                // Longitude along x, latitude along y, sampled at bin centres
                let interval = Vec2::new(2.0 * PI / width as f32, PI / height as f32);
                CoordinateSystem {
                    origin: Vec3::new(-PI + interval.x / 2.0, FRAC_PI_2 - interval.y / 2.0, 1.0),
                    u: Vec3::X,
                    v: Vec3::Y,
                    interval,
                }
            }
        }
    }

    /// Primary ray through a point of the image plane.
    pub fn camera_ray<R: RngCore + ?Sized>(
        &self,
        point: Vec3,
        cs: &CoordinateSystem,
        rng: &mut R,
    ) -> Ray {
        match self.kind {
            CameraKind::Target { position, blur, .. } => {
                let origin = if blur > 0.0 {
                    let lens = disc_random(rng) * blur;
                    position + cs.u * lens.x + cs.v * lens.y
                } else {
                    position
                };
                Ray::new(origin, (point - origin).normalize_or_zero())
            }
            CameraKind::Orthographic { direction, .. } => {
                Ray::new(point, direction.normalize_or_zero())
            }
            CameraKind::Spherical { position, rotation } => {
                let (lon, lat) = (point.x, point.y);
                let local = Vec3::new(lat.cos() * lon.cos(), lat.sin(), lat.cos() * lon.sin());
                let rotate = Mat4::from_euler(EulerRot::YXZ, rotation.y, rotation.x, rotation.z);
                Ray::new(position, rotate.transform_vector3(local))
            }
        }
    }

    /// Render `scene` with `samples` rays per pixel.
    ///
    /// Prepares the scene, then shades every block in parallel. `progress`
    /// runs on worker threads and may be called concurrently.
    pub fn render(
        &self,
        scene: &mut Scene,
        samples: u32,
        progress: Option<ProgressFn<'_>>,
    ) -> RenderResult<PixelBuffer> {
        self.validate(samples)?;
        scene.prepare()?;
        let scene: &Scene = scene;

        let width = self.resolution.pixel_width();
        let height = self.resolution.pixel_height;
        let cs = self.coordinate_system();
        let blocks = generate_blocks(
            width,
            height,
            self.resolution.block_width,
            self.resolution.block_height,
        );
        let block_count = blocks.len();
        let table =
            SobolTable::new(SHADE_START + SHADE_DIMENSIONS * samples.min(SHADE_CYCLE) as usize);

        log::info!(
            "Rendering {}x{} in {} blocks, {} samples per pixel",
            width,
            height,
            block_count,
            samples
        );
        let start = Instant::now();

        let rendered: Vec<(Block, Vec<Vec3>)> = blocks
            .par_iter()
            .map(|block| {
                let pixels = self.render_block(scene, block, samples, &cs, &table);
                if let Some(progress) = progress {
                    progress(block, &pixels, block_count);
                }
                (*block, pixels)
            })
            .collect();

        let mut buffer = PixelBuffer::new(width, height);
        for (block, pixels) in rendered {
            buffer.write_block(&block, &pixels);
        }

        log::info!("Render finished in {:.2?}", start.elapsed());
        Ok(buffer)
    }

    fn render_block(
        &self,
        scene: &Scene,
        block: &Block,
        samples: u32,
        cs: &CoordinateSystem,
        table: &SobolTable,
    ) -> Vec<Vec3> {
        let mut rng = StdRng::seed_from_u64(block_seed(self.seed, block.index));
        let (jitter_start, mut counter) = sequence_starts(block, &self.resolution, samples);
        let mut jitter = SobolSequence::new(table, 0, JITTER_DIMENSIONS, jitter_start);
        let rejitter = samples.div_ceil(JITTER_COUNT);

        let mut pixels = Vec::with_capacity(block.pixel_count() as usize);
        for row in block.y..block.y + block.height {
            for col in block.x..block.x + block.width {
                let mut color = Vec3::ZERO;
                let mut offset = Vec2::splat(0.5);
                for k in 0..samples {
                    if k % rejitter == 0 {
                        offset = Vec2::new(jitter.get(0), jitter.get(1));
                    }
                    let point = cs.pixel_point(col, row, offset);

                    let ray = {
                        let camera_dims = SobolSequence::new(
                            table,
                            JITTER_DIMENSIONS,
                            CAMERA_DIMENSIONS,
                            counter,
                        );
                        let mut stream = SobolStream::new(camera_dims, &mut rng);
                        self.camera_ray(point, cs, &mut stream)
                    };

                    let first = SHADE_START + SHADE_DIMENSIONS * (k % SHADE_CYCLE) as usize;
                    let shade_dims = SobolSequence::new(table, first, SHADE_DIMENSIONS, counter);
                    let mut stream = SobolStream::new(shade_dims, &mut rng);
                    color += scene.shade(&ray, scene.max_depth, &mut stream);
                    counter = counter.wrapping_add(1);
                }
                pixels.push(color / samples as f32);
            }
        }
        pixels
    }
}

/// First Sobol indices of a block's jitter run and sample run.
///
/// Each block reserves room for a full-size block, so clipped edge blocks
/// never share indices with their neighbours. Indices wrap at `2^32`.
fn sequence_starts(block: &Block, resolution: &Resolution, samples: u32) -> (u32, u32) {
    let slot = block.index as u64 * resolution.block_width as u64 * resolution.block_height as u64;
    let jitter = slot.wrapping_mul(JITTER_COUNT as u64) as u32;
    let counter = slot.wrapping_mul(samples as u64) as u32;
    (jitter, counter)
}

/// Image plane of height `h` centred on `center`, with square pixels.
fn plane_through(
    center: Vec3,
    u: Vec3,
    v: Vec3,
    h: f32,
    width: u32,
    height: u32,
) -> CoordinateSystem {
    let step = h / height.saturating_sub(1).max(1) as f32;
    let half_width = step * width.saturating_sub(1) as f32 / 2.0;
    CoordinateSystem {
        origin: center - u * half_width + v * (h / 2.0),
        u,
        v,
        interval: Vec2::splat(step),
    }
}

fn block_seed(seed: u64, index: usize) -> u64 {
    seed ^ (index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}
