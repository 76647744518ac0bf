//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Binary tree over primitive bounding boxes, split with a binned
//! surface-area heuristic. The tree only stores indices; the primitives stay
//! in the slice owned by the collection and are passed back in on every query.

use crate::{HitRecord, Hittable, PrimitiveId, Ray};
use cdrt_math::{Aabb, Interval, Vec3};
use serde::{Deserialize, Serialize};

/// BVH build parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BvhConfig {
    /// Maximum primitives per leaf node before splitting.
    pub leaf_capacity: usize,
    /// Number of centroid bins evaluated per axis.
    pub bin_count: usize,
}

impl Default for BvhConfig {
    fn default() -> Self {
        Self {
            leaf_capacity: 32,
            bin_count: 12,
        }
    }
}

/// BVH node - either a branch with two children or a leaf with primitives.
#[derive(Debug)]
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// Leaf node holding indices into the primitive slice.
    Leaf { objects: Vec<usize>, bbox: Aabb },
    /// Tree built over zero primitives.
    Empty,
}

impl BvhNode {
    pub fn bounding_box(&self) -> Aabb {
        match self {
            BvhNode::Empty => Aabb::EMPTY,
            BvhNode::Leaf { bbox, .. } => *bbox,
            BvhNode::Branch { bbox, .. } => *bbox,
        }
    }

    fn hit<T: Hittable>(&self, objects: &[T], ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        match self {
            BvhNode::Empty => None,

            BvhNode::Leaf { objects: ids, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }

                let mut closest: Option<HitRecord> = None;
                let mut closest_so_far = ray_t.max;

                for &i in ids {
                    if let Some(rec) = objects[i].hit(ray, ray_t.with_max(closest_so_far)) {
                        closest_so_far = rec.t;
                        closest = Some(rec.with_object(PrimitiveId(i)));
                    }
                }
                closest
            }

            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }

                let hit_left = left.hit(objects, ray, ray_t);

                // Only check right up to closest hit
                let right_max = hit_left.map_or(ray_t.max, |rec| rec.t);
                let hit_right = right.hit(objects, ray, ray_t.with_max(right_max));

                match (hit_left, hit_right) {
                    (Some(l), Some(r)) if r.t < l.t => Some(r),
                    (Some(l), _) => Some(l),
                    (None, r) => r,
                }
            }
        }
    }

    fn hit_all<T: Hittable>(
        &self,
        objects: &[T],
        ray: &Ray,
        ray_t: Interval,
        hits: &mut Vec<HitRecord>,
    ) {
        match self {
            BvhNode::Empty => {}

            BvhNode::Leaf { objects: ids, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return;
                }
                for &i in ids {
                    let start = hits.len();
                    objects[i].hit_all(ray, ray_t, hits);
                    for rec in &mut hits[start..] {
                        rec.object = Some(PrimitiveId(i));
                    }
                }
            }

            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return;
                }
                left.hit_all(objects, ray, ray_t, hits);
                right.hit_all(objects, ray, ray_t, hits);
            }
        }
    }
}

/// Build-time view of one primitive.
#[derive(Debug, Clone, Copy)]
struct BuildItem {
    index: usize,
    bbox: Aabb,
    centroid: Vec3,
}

/// Chosen split: items whose centroid bin is below `bin` go left.
#[derive(Debug, Clone, Copy)]
struct SplitPlane {
    axis: usize,
    bin: usize,
    origin: f32,
    extent: f32,
}

#[derive(Debug, Default)]
struct BuildStats {
    branches: usize,
    leaves: usize,
    max_depth: usize,
}

/// Accelerator over a slice of hittables.
#[derive(Debug)]
pub struct Bvh {
    root: BvhNode,
    primitive_count: usize,
}

impl Bvh {
    /// Build a BVH over `objects`.
    ///
    /// Deterministic for a fixed object order.
    pub fn build<T: Hittable>(objects: &[T], config: &BvhConfig) -> Self {
        if objects.is_empty() {
            return Self {
                root: BvhNode::Empty,
                primitive_count: 0,
            };
        }

        let items: Vec<BuildItem> = objects
            .iter()
            .enumerate()
            .map(|(index, object)| {
                let bbox = object.bounding_box();
                // Unloaded meshes report an empty box
                let centroid = if bbox.is_empty() {
                    Vec3::ZERO
                } else {
                    bbox.centroid()
                };
                BuildItem {
                    index,
                    bbox,
                    centroid,
                }
            })
            .collect();

        let mut stats = BuildStats::default();
        let root = build_node(items, config, &mut stats, 0);

        log::debug!(
            "Built BVH over {} primitives: {} branches, {} leaves, depth {}",
            objects.len(),
            stats.branches,
            stats.leaves,
            stats.max_depth
        );

        Self {
            root,
            primitive_count: objects.len(),
        }
    }

    /// True only when built over zero primitives.
    pub fn is_empty(&self) -> bool {
        matches!(self.root, BvhNode::Empty)
    }

    pub fn primitive_count(&self) -> usize {
        self.primitive_count
    }

    pub fn root(&self) -> &BvhNode {
        &self.root
    }

    pub fn bounding_box(&self) -> Aabb {
        self.root.bounding_box()
    }

    /// Nearest hit among `objects`, which must be the slice the tree was built from.
    ///
    /// On equal `t` the hit found first in traversal order wins.
    pub fn hit<T: Hittable>(&self, objects: &[T], ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        self.root.hit(objects, ray, ray_t)
    }

    /// Every hit from every leaf the ray reaches, in no particular order.
    pub fn hit_all<T: Hittable>(
        &self,
        objects: &[T],
        ray: &Ray,
        ray_t: Interval,
        hits: &mut Vec<HitRecord>,
    ) {
        self.root.hit_all(objects, ray, ray_t, hits);
    }
}

fn build_node(
    items: Vec<BuildItem>,
    config: &BvhConfig,
    stats: &mut BuildStats,
    depth: usize,
) -> BvhNode {
    stats.max_depth = stats.max_depth.max(depth);

    let bbox = items
        .iter()
        .fold(Aabb::EMPTY, |acc, item| Aabb::surrounding(&acc, &item.bbox));

    if items.len() <= config.leaf_capacity.max(1) {
        stats.leaves += 1;
        return BvhNode::Leaf {
            objects: items.iter().map(|item| item.index).collect(),
            bbox,
        };
    }

    let bin_count = config.bin_count.max(2);
    let (left_items, right_items): (Vec<BuildItem>, Vec<BuildItem>) =
        match find_sah_split(&items, bin_count) {
            Some(plane) => items
                .into_iter()
                .partition(|item| bin_of(item.centroid[plane.axis], &plane, bin_count) < plane.bin),
            None => {
                // All centroids coincide: halve in insertion order
                let mut left = items;
                let right = left.split_off(left.len() / 2);
                (left, right)
            }
        };

    stats.branches += 1;
    let left = build_node(left_items, config, stats, depth + 1);
    let right = build_node(right_items, config, stats, depth + 1);

    BvhNode::Branch {
        left: Box::new(left),
        right: Box::new(right),
        bbox,
    }
}

#[inline]
fn bin_of(value: f32, plane: &SplitPlane, bin_count: usize) -> usize {
    let relative = (value - plane.origin) / plane.extent;
    ((relative * bin_count as f32) as usize).min(bin_count - 1)
}

/// Pick the axis and bin boundary minimising
/// `left_count * left_area + right_count * right_area`.
///
/// Returns `None` when no boundary leaves items on both sides.
fn find_sah_split(items: &[BuildItem], bin_count: usize) -> Option<SplitPlane> {
    let mut centroid_bounds = Aabb::EMPTY;
    for item in items {
        centroid_bounds.grow(item.centroid);
    }

    let mut best: Option<(f32, SplitPlane)> = None;

    for axis in 0..3 {
        let span = centroid_bounds.axis_interval(axis);
        let extent = span.size();
        if extent <= 0.0 {
            continue;
        }

        let mut counts = vec![0usize; bin_count];
        let mut bounds = vec![Aabb::EMPTY; bin_count];
        let probe = SplitPlane {
            axis,
            bin: 0,
            origin: span.min,
            extent,
        };
        for item in items {
            let b = bin_of(item.centroid[axis], &probe, bin_count);
            counts[b] += 1;
            bounds[b].merge(&item.bbox);
        }

        // Suffix sweep: right side of each boundary
        let mut right_count = vec![0usize; bin_count];
        let mut right_area = vec![0.0f32; bin_count];
        let mut acc_count = 0;
        let mut acc_box = Aabb::EMPTY;
        for b in (1..bin_count).rev() {
            acc_count += counts[b];
            acc_box.merge(&bounds[b]);
            right_count[b] = acc_count;
            right_area[b] = acc_box.surface_area();
        }

        let mut left_count = 0;
        let mut left_box = Aabb::EMPTY;
        for boundary in 1..bin_count {
            left_count += counts[boundary - 1];
            left_box.merge(&bounds[boundary - 1]);
            if left_count == 0 || right_count[boundary] == 0 {
                continue;
            }

            let cost = left_count as f32 * left_box.surface_area()
                + right_count[boundary] as f32 * right_area[boundary];
            if best.map_or(true, |(best_cost, _)| cost < best_cost) {
                best = Some((
                    cost,
                    SplitPlane {
                        bin: boundary,
                        ..probe
                    },
                ));
            }
        }
    }

    best.map(|(_, plane)| plane)
}
