//! Binary space partition over world-space drawable bounds.
//!
//! Splits are chosen per axis at the mean of the member centers. Members that
//! straddle a split land in both children, so leaves may overlap and
//! traversal has to make sure each member is tested at most once per ray.

use ember_math::{approx_eq, BoundingBox, Ray};

/// Depth budget of the tree below the root.
pub const MAX_DEPTH: u32 = 7;

/// Sets this small always become leaves.
pub const MIN_LEAF_SIZE: usize = 3;

/// A node in the arena. Children are addressed by index.
#[derive(Debug, Clone, PartialEq)]
pub enum BspNode {
    Leaf {
        bounds: BoundingBox,
        members: Vec<usize>,
    },
    Internal {
        bounds: BoundingBox,
        left: usize,
        right: usize,
    },
}

impl BspNode {
    pub fn bounds(&self) -> &BoundingBox {
        match self {
            BspNode::Leaf { bounds, .. } => bounds,
            BspNode::Internal { bounds, .. } => bounds,
        }
    }
}

/// A candidate split along one axis.
struct Split {
    left: Vec<(usize, BoundingBox)>,
    right: Vec<(usize, BoundingBox)>,
    shared: usize,
    cost: usize,
}

#[derive(Debug, Clone)]
pub struct Bsp {
    nodes: Vec<BspNode>,
    root: usize,
}

impl Bsp {
    /// Build the tree from `(member id, world bounds)` pairs.
    pub fn build(items: Vec<(usize, BoundingBox)>) -> Self {
        let mut bsp = Bsp {
            nodes: Vec::new(),
            root: 0,
        };
        bsp.root = bsp.build_node(items, MAX_DEPTH);
        bsp
    }

    fn build_node(&mut self, items: Vec<(usize, BoundingBox)>, depth: u32) -> usize {
        let bounds = union_all(&items);
        if depth == 0 || items.len() <= MIN_LEAF_SIZE {
            return self.push_leaf(bounds, &items);
        }

        let best = (0..3)
            .map(|axis| split(&items, &bounds, axis))
            .min_by_key(|split| split.cost);
        let Some(best) = best else {
            return self.push_leaf(bounds, &items);
        };

        // No progress: one side got everything, or duplication dominates
        let n = items.len();
        let left_only = best.left.len() - best.shared;
        let right_only = best.right.len() - best.shared;
        if best.left.len() == n
            || best.right.len() == n
            || best.shared > left_only
            || best.shared > right_only
        {
            return self.push_leaf(bounds, &items);
        }

        let left = self.build_node(best.left, depth - 1);
        let right = self.build_node(best.right, depth - 1);
        self.nodes.push(BspNode::Internal {
            bounds,
            left,
            right,
        });
        self.nodes.len() - 1
    }

    fn push_leaf(&mut self, bounds: BoundingBox, items: &[(usize, BoundingBox)]) -> usize {
        self.nodes.push(BspNode::Leaf {
            bounds,
            members: items.iter().map(|(id, _)| *id).collect(),
        });
        self.nodes.len() - 1
    }

    pub fn root(&self) -> &BspNode {
        &self.nodes[self.root]
    }

    pub fn nodes(&self) -> &[BspNode] {
        &self.nodes
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, BspNode::Leaf { .. }))
            .count()
    }

    /// Number of internal levels on the longest root-to-leaf path.
    pub fn depth(&self) -> u32 {
        self.depth_of(self.root)
    }

    fn depth_of(&self, node: usize) -> u32 {
        match &self.nodes[node] {
            BspNode::Leaf { .. } => 0,
            BspNode::Internal { left, right, .. } => {
                1 + self.depth_of(*left).max(self.depth_of(*right))
            }
        }
    }

    /// Find the nearest hit reported by `hit_fn`.
    ///
    /// `hit_fn` receives a member id and returns a value with its distance
    /// along the ray. It is called at most once per member.
    pub fn intersect<T, F>(&self, ray: &Ray, mut hit_fn: F) -> Option<(T, f32)>
    where
        F: FnMut(usize) -> Option<(T, f32)>,
    {
        if self.root().bounds().intersect(ray).is_infinite() {
            return None;
        }
        let mut tested = Vec::with_capacity(16);
        self.visit(self.root, ray, &mut tested, &mut hit_fn)
    }

    fn visit<T, F>(
        &self,
        node: usize,
        ray: &Ray,
        tested: &mut Vec<usize>,
        hit_fn: &mut F,
    ) -> Option<(T, f32)>
    where
        F: FnMut(usize) -> Option<(T, f32)>,
    {
        match &self.nodes[node] {
            BspNode::Leaf { members, .. } => {
                let mut best: Option<(T, f32)> = None;
                for &member in members {
                    match tested.binary_search(&member) {
                        Ok(_) => continue,
                        Err(pos) => tested.insert(pos, member),
                    }
                    if let Some((value, t)) = hit_fn(member) {
                        if best.as_ref().map_or(true, |(_, best_t)| t < *best_t) {
                            best = Some((value, t));
                        }
                    }
                }
                best
            }
            BspNode::Internal { left, right, .. } => {
                let t_left = entry_distance(self.nodes[*left].bounds(), ray);
                let t_right = entry_distance(self.nodes[*right].bounds(), ray);
                if t_left.is_infinite() && t_right.is_infinite() {
                    return None;
                }

                let (near, far, t_near, t_far) = if t_left <= t_right {
                    (*left, *right, t_left, t_right)
                } else {
                    (*right, *left, t_right, t_left)
                };

                let near_hit = self.visit(near, ray, tested, hit_fn);
                if t_far.is_infinite() {
                    return near_hit;
                }

                let visit_far = match &near_hit {
                    None => true,
                    Some((_, t)) => {
                        approx_eq(t_near, t_far)
                            || *t >= t_far
                            || !self.nodes[near].bounds().contains(ray.at(*t))
                    }
                };
                if !visit_far {
                    return near_hit;
                }

                let far_hit = self.visit(far, ray, tested, hit_fn);
                match (near_hit, far_hit) {
                    (Some(a), Some(b)) => Some(if b.1 < a.1 { b } else { a }),
                    (a, b) => a.or(b),
                }
            }
        }
    }
}

/// Distance at which the ray enters a box; zero when it starts inside.
fn entry_distance(bounds: &BoundingBox, ray: &Ray) -> f32 {
    if bounds.contains(ray.origin()) {
        0.0
    } else {
        bounds.intersect(ray)
    }
}

fn union_all(items: &[(usize, BoundingBox)]) -> BoundingBox {
    match items.split_first() {
        Some(((_, first), rest)) => rest
            .iter()
            .fold(*first, |acc, (_, b)| BoundingBox::union(&acc, b)),
        None => BoundingBox::ZERO,
    }
}

fn split(items: &[(usize, BoundingBox)], bounds: &BoundingBox, axis: usize) -> Split {
    let mean = items.iter().map(|(_, b)| b.center[axis]).sum::<f32>() / items.len() as f32;
    let (left_box, right_box) = bounds.split(axis, mean);

    let mut left = Vec::new();
    let mut right = Vec::new();
    let mut shared = 0;
    for item in items {
        let in_left = item.1.overlaps(&left_box);
        let in_right = item.1.overlaps(&right_box);
        if in_left {
            left.push(*item);
        }
        if in_right {
            right.push(*item);
        }
        if in_left && in_right {
            shared += 1;
        }
    }

    let cost = left.len().abs_diff(right.len()) + shared;
    Split {
        left,
        right,
        shared,
        cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_math::Vec3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn unit_box(x: f32, y: f32, z: f32) -> BoundingBox {
        BoundingBox::new(Vec3::new(x, y, z), 1.0, 1.0, 1.0)
    }

    /// Two clusters bridged by one long box.
    fn bridged() -> Vec<BoundingBox> {
        vec![
            unit_box(-10.0, 0.0, 0.0),
            unit_box(-8.0, 0.0, 0.0),
            unit_box(-6.0, 0.0, 0.0),
            unit_box(6.0, 0.0, 0.0),
            unit_box(8.0, 0.0, 0.0),
            unit_box(10.0, 0.0, 0.0),
            BoundingBox::new(Vec3::ZERO, 20.0, 1.0, 1.0),
        ]
    }

    fn build(boxes: &[BoundingBox]) -> Bsp {
        Bsp::build(boxes.iter().copied().enumerate().collect())
    }

    fn hit_box(boxes: &[BoundingBox], id: usize, ray: &Ray) -> Option<(usize, f32)> {
        let t = boxes[id].intersect(ray);
        t.is_finite().then_some((id, t))
    }

    #[test]
    fn test_small_set_is_single_leaf() {
        let bsp = build(&[unit_box(0.0, 0.0, 0.0), unit_box(3.0, 0.0, 0.0)]);
        assert_eq!(bsp.nodes().len(), 1);
        assert!(matches!(bsp.root(), BspNode::Leaf { members, .. } if members.len() == 2));
    }

    #[test]
    fn test_straddling_member_lands_in_both_leaves() {
        let bsp = build(&bridged());
        assert_eq!(bsp.leaf_count(), 2);

        for node in bsp.nodes() {
            if let BspNode::Leaf { members, .. } = node {
                assert_eq!(members.len(), 4);
                assert!(members.contains(&6));
            }
        }
    }

    #[test]
    fn test_shared_member_tested_once() {
        let boxes = bridged();
        let bsp = build(&boxes);
        // Straight down through the middle of the long box, grazing both leaves
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y);

        let mut calls = vec![0; boxes.len()];
        let hit = bsp.intersect(&ray, |id| {
            calls[id] += 1;
            hit_box(&boxes, id, &ray)
        });

        assert_eq!(hit.map(|(id, _)| id), Some(6));
        assert_eq!(calls[6], 1);
        assert!(calls.iter().all(|&c| c <= 1));
    }

    #[test]
    fn test_identical_boxes_do_not_split() {
        let boxes = vec![unit_box(1.0, 1.0, 1.0); 10];
        let bsp = build(&boxes);
        assert_eq!(bsp.leaf_count(), 1);
    }

    #[test]
    fn test_depth_and_leaf_limits() {
        let mut rng = StdRng::seed_from_u64(5);
        let boxes: Vec<BoundingBox> = (0..500)
            .map(|_| {
                let c = Vec3::new(rng.gen(), rng.gen(), rng.gen()) * 100.0;
                BoundingBox::new(c, 0.5, 0.5, 0.5)
            })
            .collect();
        let bsp = build(&boxes);

        assert!(bsp.depth() <= MAX_DEPTH);
        assert!(bsp.leaf_count() > 1);
        // Every member reachable from some leaf
        let mut seen = vec![false; boxes.len()];
        for node in bsp.nodes() {
            if let BspNode::Leaf { members, .. } = node {
                for &m in members {
                    seen[m] = true;
                }
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_matches_linear_scan() {
        let mut rng = StdRng::seed_from_u64(9);
        let boxes: Vec<BoundingBox> = (0..200)
            .map(|_| {
                let c = Vec3::new(rng.gen(), rng.gen(), rng.gen()) * 20.0 - 10.0;
                let s = Vec3::new(rng.gen(), rng.gen(), rng.gen()) * 3.0 + 0.1;
                BoundingBox::new(c, s.x, s.y, s.z)
            })
            .collect();
        let bsp = build(&boxes);

        for _ in 0..500 {
            let origin = Vec3::new(rng.gen(), rng.gen(), rng.gen()) * 40.0 - 20.0;
            let direction = Vec3::new(rng.gen(), rng.gen(), rng.gen()) * 2.0 - 1.0;
            let ray = Ray::new(origin, direction);

            let linear = (0..boxes.len())
                .filter_map(|id| hit_box(&boxes, id, &ray))
                .min_by(|a, b| a.1.total_cmp(&b.1));
            let indexed = bsp.intersect(&ray, |id| hit_box(&boxes, id, &ray));

            match (linear, indexed) {
                (Some((_, a)), Some((_, b))) => assert!((a - b).abs() < 1e-4),
                (None, None) => {}
                other => panic!("bsp and linear scan disagree: {other:?}"),
            }
        }
    }
}
