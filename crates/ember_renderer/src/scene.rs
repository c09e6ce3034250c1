//! Scene container and the top-level shading queries.
//!
//! A scene owns its drawables and a derived spatial index. The index is
//! dropped by any mutation and rebuilt by [`Scene::prepare`], which must run
//! before the scene is queried.

use ember_math::{Ray, Vec3, DEFAULT_DEPTH, EPSILON};

use crate::bsp::{Bsp, BspNode};
use crate::color::ColorModel;
use crate::drawable::{Drawable, Intersection};
use crate::environment::Environment;
use crate::error::RenderResult;
use crate::material::ShadeSampler;

/// Derived acceleration data, rebuilt wholesale by `prepare`.
#[derive(Debug, Clone)]
struct SceneIndex {
    bsp: Option<Bsp>,
    /// Drawables without finite bounds, scanned on every query
    unbounded: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct Scene {
    drawables: Vec<Drawable>,
    pub environment: Environment,
    pub max_depth: u32,
    pub color_model: ColorModel,
    index: Option<SceneIndex>,
}

impl Scene {
    pub fn new(environment: Environment) -> Self {
        Self {
            drawables: Vec::new(),
            environment,
            max_depth: DEFAULT_DEPTH,
            color_model: ColorModel::default(),
            index: None,
        }
    }

    pub fn with_color_model(mut self, color_model: ColorModel) -> Self {
        self.color_model = color_model;
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Add a drawable. Invalidates the index.
    pub fn push(&mut self, drawable: Drawable) {
        self.drawables.push(drawable);
        self.index = None;
    }

    pub fn drawables(&self) -> &[Drawable] {
        &self.drawables
    }

    /// Mutable access to the drawables. Invalidates the index.
    pub fn drawables_mut(&mut self) -> &mut Vec<Drawable> {
        self.index = None;
        &mut self.drawables
    }

    pub fn is_prepared(&self) -> bool {
        self.index.is_some()
    }

    /// Validate every shape and rebuild the spatial index.
    pub fn prepare(&mut self) -> RenderResult<()> {
        self.index = None;
        for drawable in &self.drawables {
            drawable.shape.validate()?;
        }
        if self.drawables.is_empty() {
            log::warn!("Preparing a scene with no drawables");
        }

        let mut bounded = Vec::new();
        let mut unbounded = Vec::new();
        for (i, drawable) in self.drawables.iter().enumerate() {
            let bounds = drawable.bounds();
            if bounds.is_zero() {
                unbounded.push(i);
            } else {
                bounded.push((i, bounds));
            }
        }

        let indexed = bounded.len();
        let bsp = (!bounded.is_empty()).then(|| Bsp::build(bounded));
        if let Some(bsp) = &bsp {
            log::debug!(
                "BSP built: {} nodes, {} leaves, depth {}",
                bsp.nodes().len(),
                bsp.leaf_count(),
                bsp.depth()
            );
            let duplicated: usize = bsp
                .nodes()
                .iter()
                .map(|node| match node {
                    BspNode::Leaf { members, .. } => members.len(),
                    BspNode::Internal { .. } => 0,
                })
                .sum::<usize>()
                - indexed;
            log::debug!("{} leaf entries duplicated across overlapping leaves", duplicated);
        }
        log::info!(
            "Scene prepared: {} drawables indexed, {} scanned linearly",
            indexed,
            unbounded.len()
        );

        self.index = Some(SceneIndex { bsp, unbounded });
        Ok(())
    }

    /// Nearest valid hit along the ray.
    ///
    /// Uses the BSP for bounded drawables and a linear scan for the rest.
    /// The scene must be prepared; otherwise this falls back to a full scan.
    pub fn closest_intersection(&self, ray: &Ray) -> Option<Intersection<'_>> {
        debug_assert!(self.is_prepared(), "scene queried before prepare()");
        let Some(index) = &self.index else {
            return self.closest_intersection_linear(ray);
        };

        let from_bsp = index.bsp.as_ref().and_then(|bsp| {
            bsp.intersect(ray, |i| {
                self.drawables[i]
                    .intersect(ray)
                    .filter(|hit| hit.t > EPSILON)
                    .map(|hit| (hit, hit.t))
            })
            .map(|(hit, _)| hit)
        });

        index
            .unbounded
            .iter()
            .filter_map(|&i| self.drawables[i].intersect(ray))
            .filter(|hit| hit.t > EPSILON)
            .chain(from_bsp)
            .min_by(|a, b| a.cmp_t(b))
    }

    /// Exhaustive scan over every drawable.
    pub fn closest_intersection_linear(&self, ray: &Ray) -> Option<Intersection<'_>> {
        self.drawables
            .iter()
            .filter_map(|drawable| drawable.intersect(ray))
            .filter(|hit| hit.t > EPSILON)
            .min_by(|a, b| a.cmp_t(b))
    }

    /// Radiance arriving along `ray`, following at most `depth` bounces.
    pub fn shade<R: ShadeSampler + ?Sized>(&self, ray: &Ray, depth: u32, rng: &mut R) -> Vec3 {
        if depth == 0 {
            return Vec3::ZERO;
        }
        rng.begin_bounce();

        match self.closest_intersection(ray) {
            Some(hit) => hit.drawable.material.shade(ray, self, &hit, depth, rng),
            None => {
                let background = self.environment.shade(ray);
                if depth == self.max_depth {
                    background * self.color_model.environment_background_factor
                } else {
                    background
                }
            }
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(Environment::default())
    }
}
