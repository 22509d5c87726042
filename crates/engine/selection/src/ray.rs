//! Picking the first voxel of a selection from the viewer's ray
//!
//! [`select_start`] turns whatever the cursor is on into a starting voxel,
//! the face that was hit and a look vector anchored on that face. The hit
//! itself comes from the host or from [`trace_voxel_ray`].

use crate::facing::Facing;
use crate::geometry::snap_look_to_face;
use crate::world::{classify, ChunkPos, OccupantKind, VoxelWorld, WORLD_MAX_Y, WORLD_MIN_Y};
use glam::{IVec3, Vec3};

/// Minimum axis-aligned distance from the eyes to a voxel picked in mid air
const MINIMUM_HIT_DISTANCE: f32 = 0.5;

/// Nudge along the look vector to land inside the voxel past a boundary
const BOUNDARY_NUDGE: f32 = 0.001;

/// How a tool picks its starting voxel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionBehaviour {
    /// Use the cursor hit at all; when false every pick takes the mid-air path
    pub perform_collision_test: bool,
    /// Pick a voxel in front of the viewer when nothing was hit
    pub select_air_if_no_collision: bool,
    /// Fluids stop the ray instead of being looked through
    pub collide_with_fluid: bool,
    /// Step back out of a fluid hit
    pub fluid_pullback: bool,
    /// Step back out of a passable hit (grass, flowers)
    pub non_solid_pullback: bool,
    /// Step back out of a solid hit
    pub solid_pullback: bool,
}

impl SelectionBehaviour {
    pub const WAND: Self = Self::new(true, false, false, false, false, true);
    pub const ORB: Self = Self::new(true, false, true, false, false, false);
    pub const SCEPTRE_ADD: Self = Self::new(true, false, true, true, false, true);
    pub const SCEPTRE_REPLACE: Self = Self::new(true, false, true, false, false, false);
    pub const BOUNDARY: Self = Self::new(false, true, false, false, false, false);

    pub const fn new(
        perform_collision_test: bool,
        select_air_if_no_collision: bool,
        collide_with_fluid: bool,
        fluid_pullback: bool,
        non_solid_pullback: bool,
        solid_pullback: bool,
    ) -> Self {
        Self {
            perform_collision_test,
            select_air_if_no_collision,
            collide_with_fluid,
            fluid_pullback,
            non_solid_pullback,
            solid_pullback,
        }
    }

    /// Whether a hit on this kind of occupant pulls back to the open neighbour
    pub fn pulls_back(&self, kind: OccupantKind) -> bool {
        match kind {
            OccupantKind::Empty => false,
            OccupantKind::Fluid => self.fluid_pullback,
            OccupantKind::Passable => self.non_solid_pullback,
            OccupantKind::Solid => self.solid_pullback,
        }
    }
}

/// What the cursor is pointing at
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RayTarget {
    /// Nothing within reach
    Miss,
    /// A voxel, entered through `face`
    Voxel { pos: IVec3, face: Facing },
    /// A creature or other entity; never selectable
    Entity,
}

/// Position and extent of whoever is selecting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewer {
    pub eye: Vec3,
    /// Look direction; need not be normalised
    pub look: Vec3,
    /// Body bounding box, lowest corner
    pub body_min: Vec3,
    /// Body bounding box, highest corner
    pub body_max: Vec3,
}

impl Viewer {
    /// Viewer whose body is just the eye point
    pub fn at_eye(eye: Vec3, look: Vec3) -> Self {
        Self {
            eye,
            look,
            body_min: eye,
            body_max: eye,
        }
    }
}

/// The chosen starting voxel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StartSelection {
    pub voxel: IVec3,
    pub face: Facing,
    /// Look vector to extend a line along
    pub direction: Vec3,
}

/// Choose the starting voxel for a selection
///
/// * nothing hit (or collision testing off): pick the voxel just outside a
///   box around the viewer, if the profile selects air
/// * a voxel hit: keep it, or step out through the hit face when the profile
///   pulls back from that occupant kind, reversing the face
/// * an entity hit: no selection
pub fn select_start<W: VoxelWorld + ?Sized>(
    world: &W,
    target: RayTarget,
    behaviour: SelectionBehaviour,
    viewer: &Viewer,
) -> Option<StartSelection> {
    let target = if behaviour.perform_collision_test {
        target
    } else {
        RayTarget::Miss
    };

    match target {
        RayTarget::Miss if behaviour.select_air_if_no_collision => select_in_air(viewer),
        RayTarget::Miss | RayTarget::Entity => None,
        RayTarget::Voxel { pos, face } => {
            let kind = classify(world, pos).kind;
            let (voxel, face) = if behaviour.pulls_back(kind) {
                (pos + face.offset(), face.opposite())
            } else {
                (pos, face)
            };
            Some(StartSelection {
                voxel,
                face,
                direction: snap_look_to_face(voxel, face, viewer.eye),
            })
        }
    }
}

/// The voxel just beyond a whole-voxel box around the viewer
fn select_in_air(viewer: &Viewer) -> Option<StartSelection> {
    let look = viewer.look.normalize_or_zero();
    if look == Vec3::ZERO || !look.is_finite() {
        return None;
    }

    let reach = Vec3::splat(MINIMUM_HIT_DISTANCE);
    let min = viewer.body_min.min(viewer.eye - reach).floor();
    let max = viewer.body_max.max(viewer.eye + reach).ceil();

    // the eye is inside the box, so the ray leaves through exactly one face
    let mut exit: Option<(f32, Facing)> = None;
    for (axis, (neg, pos)) in [
        (Facing::West, Facing::East),
        (Facing::Down, Facing::Up),
        (Facing::North, Facing::South),
    ]
    .into_iter()
    .enumerate()
    {
        let d = look[axis];
        let (t, face) = if d > 0.0 {
            ((max[axis] - viewer.eye[axis]) / d, pos)
        } else if d < 0.0 {
            ((min[axis] - viewer.eye[axis]) / d, neg)
        } else {
            continue;
        };
        if exit.is_none_or(|(best, _)| t < best) {
            exit = Some((t, face));
        }
    }

    let (t, exit_face) = exit?;
    let hit = viewer.eye + look * t;
    let voxel = (hit + look * BOUNDARY_NUDGE).floor().as_ivec3();
    Some(StartSelection {
        voxel,
        face: exit_face.opposite(),
        direction: viewer.look,
    })
}

/// Walk the voxel grid along a ray and report the first thing it stops on
///
/// Amanatides & Woo traversal. The eye's own voxel is skipped. Empty voxels
/// are transparent and so are fluids unless `collide_with_fluid`. Leaving the
/// valid Y range, reaching a non-resident chunk or running out of `reach`
/// ends the trace as a [`RayTarget::Miss`].
pub fn trace_voxel_ray<W: VoxelWorld + ?Sized>(
    world: &W,
    eye: Vec3,
    look: Vec3,
    reach: f32,
    collide_with_fluid: bool,
) -> RayTarget {
    let dir = look.normalize_or_zero();
    if dir == Vec3::ZERO || !dir.is_finite() {
        return RayTarget::Miss;
    }

    let mut voxel = eye.floor().as_ivec3();
    let mut step = IVec3::ZERO;
    let mut t_max = Vec3::INFINITY;
    let mut t_delta = Vec3::INFINITY;
    for axis in 0..3 {
        if dir[axis] > 0.0 {
            step[axis] = 1;
            t_delta[axis] = 1.0 / dir[axis];
            t_max[axis] = ((voxel[axis] as f32 + 1.0) - eye[axis]) / dir[axis];
        } else if dir[axis] < 0.0 {
            step[axis] = -1;
            t_delta[axis] = 1.0 / -dir[axis];
            t_max[axis] = (eye[axis] - voxel[axis] as f32) / -dir[axis];
        }
    }

    loop {
        let axis = if t_max.x <= t_max.y && t_max.x <= t_max.z {
            0
        } else if t_max.y <= t_max.z {
            1
        } else {
            2
        };
        if t_max[axis] > reach {
            return RayTarget::Miss;
        }
        voxel[axis] += step[axis];
        t_max[axis] += t_delta[axis];

        if !(WORLD_MIN_Y..=WORLD_MAX_Y).contains(&voxel.y)
            || !world.is_chunk_resident(ChunkPos::containing(voxel))
        {
            return RayTarget::Miss;
        }

        let stops = match classify(world, voxel).kind {
            OccupantKind::Empty => false,
            OccupantKind::Fluid => collide_with_fluid,
            OccupantKind::Passable | OccupantKind::Solid => true,
        };
        if stops {
            let mut entered = IVec3::ZERO;
            entered[axis] = -step[axis];
            let face = match (axis, entered[axis]) {
                (0, -1) => Facing::West,
                (0, _) => Facing::East,
                (1, -1) => Facing::Down,
                (1, _) => Facing::Up,
                (_, -1) => Facing::North,
                _ => Facing::South,
            };
            return RayTarget::Voxel { pos: voxel, face };
        }
    }
}

/// Trace from the viewer's eye and choose the starting voxel in one go
pub fn select_start_traced<W: VoxelWorld + ?Sized>(
    world: &W,
    behaviour: SelectionBehaviour,
    viewer: &Viewer,
    reach: f32,
) -> Option<StartSelection> {
    let target = if behaviour.perform_collision_test {
        trace_voxel_ray(world, viewer.eye, viewer.look, reach, behaviour.collide_with_fluid)
    } else {
        RayTarget::Miss
    };
    select_start(world, target, behaviour, viewer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{MemoryWorld, Occupant};

    fn floor_world() -> MemoryWorld {
        let mut world = MemoryWorld::new();
        for x in -4..=4 {
            for z in -4..=4 {
                world.set(IVec3::new(x, 63, z), Occupant::solid(1));
            }
        }
        world.set(IVec3::new(2, 64, 0), Occupant::fluid(9, 0));
        world
    }

    #[test]
    fn test_wand_pulls_back_from_solid() {
        let world = floor_world();
        let viewer = Viewer::at_eye(Vec3::new(0.5, 65.5, 0.5), Vec3::NEG_Y);
        let hit = RayTarget::Voxel {
            pos: IVec3::new(0, 63, 0),
            face: Facing::Up,
        };
        let start = select_start(&world, hit, SelectionBehaviour::WAND, &viewer).unwrap();
        assert_eq!(start.voxel, IVec3::new(0, 64, 0));
        assert_eq!(start.face, Facing::Down);
        assert_eq!(start.direction, Vec3::new(0.0, -1.5, 0.0));
    }

    #[test]
    fn test_orb_keeps_hit_voxel() {
        let world = floor_world();
        let viewer = Viewer::at_eye(Vec3::new(0.5, 65.5, 0.5), Vec3::NEG_Y);
        let hit = RayTarget::Voxel {
            pos: IVec3::new(0, 63, 0),
            face: Facing::Up,
        };
        let start = select_start(&world, hit, SelectionBehaviour::ORB, &viewer).unwrap();
        assert_eq!(start.voxel, IVec3::new(0, 63, 0));
        assert_eq!(start.face, Facing::Up);
    }

    #[test]
    fn test_sceptre_add_pulls_back_from_fluid() {
        let world = floor_world();
        let viewer = Viewer::at_eye(Vec3::new(0.5, 65.5, 0.5), Vec3::X);
        let hit = RayTarget::Voxel {
            pos: IVec3::new(2, 64, 0),
            face: Facing::West,
        };
        let add = select_start(&world, hit, SelectionBehaviour::SCEPTRE_ADD, &viewer).unwrap();
        assert_eq!(add.voxel, IVec3::new(1, 64, 0));
        assert_eq!(add.face, Facing::East);

        let replace = select_start(&world, hit, SelectionBehaviour::SCEPTRE_REPLACE, &viewer).unwrap();
        assert_eq!(replace.voxel, IVec3::new(2, 64, 0));
    }

    #[test]
    fn test_miss_and_entity() {
        let world = floor_world();
        let viewer = Viewer::at_eye(Vec3::new(0.5, 65.5, 0.5), Vec3::X);
        assert_eq!(select_start(&world, RayTarget::Miss, SelectionBehaviour::WAND, &viewer), None);
        assert_eq!(select_start(&world, RayTarget::Entity, SelectionBehaviour::ORB, &viewer), None);
        assert_eq!(
            select_start(&world, RayTarget::Entity, SelectionBehaviour::BOUNDARY, &viewer).map(|s| s.voxel),
            Some(IVec3::new(1, 65, 0))
        );
    }

    #[test]
    fn test_air_selection_clears_body() {
        let world = MemoryWorld::new();
        let viewer = Viewer {
            eye: Vec3::new(0.5, 65.6, 0.5),
            look: Vec3::X,
            body_min: Vec3::new(0.2, 64.0, 0.2),
            body_max: Vec3::new(0.8, 65.8, 0.8),
        };
        let start = select_start(&world, RayTarget::Miss, SelectionBehaviour::BOUNDARY, &viewer).unwrap();
        assert_eq!(start.voxel, IVec3::new(1, 65, 0));
        assert_eq!(start.face, Facing::West);
        assert_eq!(start.direction, Vec3::X);

        let down = Viewer { look: Vec3::NEG_Y, ..viewer };
        let start = select_start(&world, RayTarget::Miss, SelectionBehaviour::BOUNDARY, &down).unwrap();
        // body reaches down to y = 64, so the first free voxel is below it
        assert_eq!(start.voxel, IVec3::new(0, 63, 0));
        assert_eq!(start.face, Facing::Up);
    }

    #[test]
    fn test_trace_hits_floor() {
        let world = floor_world();
        let hit = trace_voxel_ray(&world, Vec3::new(0.5, 65.5, 0.5), Vec3::new(0.0, -1.0, 0.0), 8.0, false);
        assert_eq!(
            hit,
            RayTarget::Voxel {
                pos: IVec3::new(0, 63, 0),
                face: Facing::Up
            }
        );
    }

    #[test]
    fn test_trace_fluid_collision() {
        let world = floor_world();
        let eye = Vec3::new(0.5, 64.5, 0.5);
        assert_eq!(
            trace_voxel_ray(&world, eye, Vec3::X, 8.0, true),
            RayTarget::Voxel {
                pos: IVec3::new(2, 64, 0),
                face: Facing::West
            }
        );
        assert_eq!(trace_voxel_ray(&world, eye, Vec3::X, 8.0, false), RayTarget::Miss);
        assert_eq!(trace_voxel_ray(&world, eye, Vec3::X, 1.0, true), RayTarget::Miss);
    }

    #[test]
    fn test_traced_start() {
        let world = floor_world();
        let viewer = Viewer::at_eye(Vec3::new(0.5, 65.5, 0.5), Vec3::NEG_Y);
        let start = select_start_traced(&world, SelectionBehaviour::WAND, &viewer, 8.0).unwrap();
        assert_eq!(start.voxel, IVec3::new(0, 64, 0));
        assert_eq!(start.face, Facing::Down);
    }
}
