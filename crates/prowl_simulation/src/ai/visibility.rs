//! Line-of-Sight (LOS) — raycast проверки видимости цели.
//!
//! Контракт `VisibilityProbe::has_line_of_sight(from, to, mask, target)`:
//! - луч от `from` к `to`, длина ограничена расстоянием между точками
//! - первый hit по блокирующим слоям — не цель (и не её части) → не видно
//! - нет hit'ов → видно
//! - чистый query, без side effects
//!
//! Два backend'а:
//! - `ObstacleField` — in-process окружение (AABB + сферы), headless/тесты
//! - `RapierLineOfSight` — raycast через `bevy_rapier3d` query pipeline

use bevy::prelude::*;
use bevy_rapier3d::prelude::{CollisionGroups, Group, QueryFilter, RapierContext};
use serde::{Deserialize, Serialize};

/// Набор слоёв, блокирующих видимость (bitmask).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockingMask(pub u32);

impl BlockingMask {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(u32::MAX);

    /// Single layer (0..32). Out-of-range index: debug panic, empty mask in release.
    pub const fn layer(index: u32) -> Self {
        debug_assert!(index < 32, "blocking layer index out of range");
        match Self::try_layer(index) {
            Some(mask) => mask,
            None => Self::NONE,
        }
    }

    /// `None` for an index outside 0..32.
    pub const fn try_layer(index: u32) -> Option<Self> {
        if index < 32 {
            Some(Self(1 << index))
        } else {
            None
        }
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl Default for BlockingMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Environment query used by perception.
pub trait VisibilityProbe {
    /// `target` — identity цели; поверхности, принадлежащие ей, не блокируют.
    fn has_line_of_sight(&self, from: Vec3, to: Vec3, mask: BlockingMask, target: Option<Entity>) -> bool;
}

/// Probe для случая "окружение недоступно": никого не видно.
///
/// Transient query failure трактуется как "не видно", не как ошибка.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blindfold;

impl VisibilityProbe for Blindfold {
    fn has_line_of_sight(&self, _from: Vec3, _to: Vec3, _mask: BlockingMask, _target: Option<Entity>) -> bool {
        false
    }
}

// ============================================================================
// ObstacleField (in-process environment)
// ============================================================================

/// Shape of a blocking surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceShape {
    /// Axis-aligned box
    Aabb { min: Vec3, max: Vec3 },
    Sphere { center: Vec3, radius: f32 },
}

impl SurfaceShape {
    /// Entry distance along a unit `dir` from `origin`, within `[0, max_t]`.
    ///
    /// Solid: если origin внутри формы, hit на t = 0.
    fn ray_entry(&self, origin: Vec3, dir: Vec3, max_t: f32) -> Option<f32> {
        match *self {
            SurfaceShape::Aabb { min, max } => {
                let mut t_near = 0.0_f32;
                let mut t_far = max_t;

                for axis in 0..3 {
                    let o = origin[axis];
                    let d = dir[axis];

                    if d.abs() < 1e-8 {
                        // Луч параллелен slab'у: либо всегда внутри, либо мимо
                        if o < min[axis] || o > max[axis] {
                            return None;
                        }
                        continue;
                    }

                    let inv = 1.0 / d;
                    let mut t0 = (min[axis] - o) * inv;
                    let mut t1 = (max[axis] - o) * inv;
                    if t0 > t1 {
                        std::mem::swap(&mut t0, &mut t1);
                    }

                    t_near = t_near.max(t0);
                    t_far = t_far.min(t1);
                    if t_near > t_far {
                        return None;
                    }
                }

                Some(t_near)
            }
            SurfaceShape::Sphere { center, radius } => {
                let m = origin - center;
                let c = m.length_squared() - radius * radius;
                if c <= 0.0 {
                    return Some(0.0);
                }

                let b = m.dot(dir);
                if b > 0.0 {
                    // Origin снаружи и луч направлен от сферы
                    return None;
                }

                let disc = b * b - c;
                if disc < 0.0 {
                    return None;
                }

                let t = -b - disc.sqrt();
                (t <= max_t).then_some(t.max(0.0))
            }
        }
    }
}

/// A blocking surface registered in the field.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub shape: SurfaceShape,
    pub layers: BlockingMask,
    /// Root entity this surface belongs to (target body + attached parts
    /// share the owner).
    pub owner: Option<Entity>,
}

/// Nearest hit of a segment query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub distance: f32,
    pub owner: Option<Entity>,
}

/// In-process environment of blocking surfaces.
#[derive(Resource, Debug, Clone, Default)]
pub struct ObstacleField {
    surfaces: Vec<Surface>,
}

impl ObstacleField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, surface: Surface) -> &mut Self {
        self.surfaces.push(surface);
        self
    }

    /// Static wall / crate (no owner).
    pub fn add_box(&mut self, min: Vec3, max: Vec3, layers: BlockingMask) -> &mut Self {
        self.add(Surface {
            shape: SurfaceShape::Aabb {
                min: min.min(max),
                max: min.max(max),
            },
            layers,
            owner: None,
        })
    }

    pub fn add_sphere(&mut self, center: Vec3, radius: f32, layers: BlockingMask) -> &mut Self {
        self.add(Surface {
            shape: SurfaceShape::Sphere {
                center,
                radius: radius.abs(),
            },
            layers,
            owner: None,
        })
    }

    /// Body part of an entity (e.g. the target's capsule or a carried shield).
    pub fn add_owned(&mut self, owner: Entity, shape: SurfaceShape, layers: BlockingMask) -> &mut Self {
        self.add(Surface {
            shape,
            layers,
            owner: Some(owner),
        })
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    pub fn clear(&mut self) {
        self.surfaces.clear();
    }

    /// Nearest surface on the segment `from → to` matching `mask`.
    pub fn cast_segment(&self, from: Vec3, to: Vec3, mask: BlockingMask) -> Option<SurfaceHit> {
        self.cast_segment_excluding(from, to, mask, None)
    }

    /// Same as `cast_segment`, surfaces owned by `excluded` are skipped.
    pub fn cast_segment_excluding(
        &self,
        from: Vec3,
        to: Vec3,
        mask: BlockingMask,
        excluded: Option<Entity>,
    ) -> Option<SurfaceHit> {
        let delta = to - from;
        let length = delta.length();
        if length < 1e-4 {
            return None;
        }
        let dir = delta / length;

        self.surfaces
            .iter()
            .filter(|surface| surface.layers.intersects(mask))
            .filter(|surface| excluded.is_none() || surface.owner != excluded)
            .filter_map(|surface| {
                surface.shape.ray_entry(from, dir, length).map(|distance| SurfaceHit {
                    distance,
                    owner: surface.owner,
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

impl ObstacleField {
    /// The field as seen by `observer`: its own body never blocks its view.
    pub fn seen_by(&self, observer: Entity) -> ObserverView<'_> {
        ObserverView {
            field: self,
            observer: Some(observer),
        }
    }

    fn line_of_sight(
        &self,
        from: Vec3,
        to: Vec3,
        mask: BlockingMask,
        target: Option<Entity>,
        observer: Option<Entity>,
    ) -> bool {
        match self.cast_segment_excluding(from, to, mask, observer) {
            None => true,
            // Попали в саму цель (или её часть) → видно
            Some(hit) => hit.owner.is_some() && hit.owner == target,
        }
    }
}

impl VisibilityProbe for ObstacleField {
    fn has_line_of_sight(&self, from: Vec3, to: Vec3, mask: BlockingMask, target: Option<Entity>) -> bool {
        self.line_of_sight(from, to, mask, target, None)
    }
}

/// `ObstacleField` with the observer's own surfaces excluded.
#[derive(Debug, Clone, Copy)]
pub struct ObserverView<'a> {
    field: &'a ObstacleField,
    observer: Option<Entity>,
}

impl VisibilityProbe for ObserverView<'_> {
    fn has_line_of_sight(&self, from: Vec3, to: Vec3, mask: BlockingMask, target: Option<Entity>) -> bool {
        self.field.line_of_sight(from, to, mask, target, self.observer)
    }
}

// ============================================================================
// Rapier backend
// ============================================================================

/// Максимальная глубина обхода иерархии (защита от циклов).
const MAX_HIERARCHY_DEPTH: usize = 32;

/// Parent lookup for hierarchy walks (обычно `ChildOf` query).
pub type ParentLookup<'a> = &'a dyn Fn(Entity) -> Option<Entity>;

/// LOS через Rapier query pipeline.
///
/// Hit по collider'у цели или любого её потомка (`ChildOf`) — видимость есть.
pub struct RapierLineOfSight<'a> {
    context: &'a RapierContext<'a>,
    parent_of: ParentLookup<'a>,
    observer: Option<Entity>,
}

impl<'a> RapierLineOfSight<'a> {
    pub fn new(context: &'a RapierContext<'a>, parent_of: ParentLookup<'a>) -> Self {
        Self {
            context,
            parent_of,
            observer: None,
        }
    }

    /// Exclude the observer's own body (eye may sit inside its collider).
    pub fn with_observer(mut self, observer: Entity) -> Self {
        self.observer = Some(observer);
        self
    }

    fn belongs_to(&self, hit: Entity, target: Entity) -> bool {
        let mut current = hit;
        for _ in 0..MAX_HIERARCHY_DEPTH {
            if current == target {
                return true;
            }
            match (self.parent_of)(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
        false
    }
}

impl VisibilityProbe for RapierLineOfSight<'_> {
    fn has_line_of_sight(&self, from: Vec3, to: Vec3, mask: BlockingMask, target: Option<Entity>) -> bool {
        let delta = to - from;
        let distance = delta.length();
        if distance < 1e-4 {
            return true;
        }
        let direction = delta / distance;

        let filter = QueryFilter::default()
            .groups(CollisionGroups::new(
                Group::ALL,
                Group::from_bits_truncate(mask.bits()),
            ))
            .exclude_sensors();

        // Тело наблюдателя (collider, rigid body, дочерние части) не блокирует
        let hit = match self.observer {
            Some(observer) => {
                let foreign = |entity: Entity| !self.belongs_to(entity, observer);
                let filter = filter
                    .exclude_collider(observer)
                    .exclude_rigid_body(observer)
                    .predicate(&foreign);
                self.context.cast_ray(from, direction, distance, true, filter)
            }
            None => self.context.cast_ray(from, direction, distance, true, filter),
        };

        match hit {
            None => true,
            Some((hit, _toi)) => target.is_some_and(|target| self.belongs_to(hit, target)),
        }
    }
}
