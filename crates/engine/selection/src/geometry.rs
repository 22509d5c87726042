//! Direction snapping and face geometry
//!
//! Pure functions over `glam` vectors. Nothing here touches the world
//! directly; obstacle tests are passed in as closures.

use crate::facing::Facing;
use glam::{IVec3, Vec3};

const R2: f32 = 0.707_107; // 1 / sqrt(2)
const R3: f32 = 0.577_350; // 1 / sqrt(3)

/// Positive axis directions, tried first
const AXES: [Vec3; 3] = [Vec3::X, Vec3::Y, Vec3::Z];

/// One representative of each face- and corner-diagonal pair
const DIAGONALS: [Vec3; 10] = [
    Vec3::new(R2, R2, 0.0),
    Vec3::new(-R2, R2, 0.0),
    Vec3::new(R2, 0.0, R2),
    Vec3::new(R2, 0.0, -R2),
    Vec3::new(0.0, R2, R2),
    Vec3::new(0.0, R2, -R2),
    Vec3::new(R3, R3, R3),
    Vec3::new(R3, -R3, R3),
    Vec3::new(R3, R3, -R3),
    Vec3::new(R3, -R3, -R3),
];

/// Components smaller than this do not count toward an integer step
const DELTA_EPSILON: f32 = 0.1;

/// Snap a vector to the nearest canonical unit direction
///
/// Compares `v` against the three axes and, when `allow_diagonal` is set,
/// the ten diagonal representatives, keeping the candidate with the largest
/// absolute dot product. The winner is negated when that dot product is
/// negative, so all 6 (or 26) directions are reachable. Returns `None` for a
/// zero or non-finite vector.
pub fn snap_to_canonical_direction(v: Vec3, allow_diagonal: bool) -> Option<Vec3> {
    let candidates: &[Vec3] = if allow_diagonal { &DIAGONALS } else { &[] };
    let mut best: Option<(Vec3, f32)> = None;
    for &candidate in AXES.iter().chain(candidates) {
        let dot = candidate.dot(v);
        let best_abs = best.map_or(0.0, |(_, d)| d.abs());
        if dot.abs() > best_abs {
            best = Some((candidate, dot));
        }
    }
    best.map(|(dir, dot)| if dot < 0.0 { -dir } else { dir })
}

/// Integer step for a snapped direction: each component becomes -1, 0 or 1
pub fn to_delta(v: Vec3) -> IVec3 {
    let axis = |c: f32| {
        if c > DELTA_EPSILON {
            1
        } else if c < -DELTA_EPSILON {
            -1
        } else {
            0
        }
    };
    IVec3::new(axis(v.x), axis(v.y), axis(v.z))
}

/// Turn a blocked step into one that slides along the obstacle
///
/// `blocked` is the step from `start` that ran into an obstacle. A diagonal
/// step is first re-snapped to a pure axis; if that step is open it is used.
/// Otherwise the blocked axis is removed from `direction` and the remainder
/// re-snapped to an axis. When nothing yields an open step the original
/// `blocked` delta comes back unchanged.
pub fn deflect<F>(start: IVec3, direction: Vec3, blocked: IVec3, is_obstacle: F) -> IVec3
where
    F: Fn(IVec3) -> bool,
{
    let non_zero = blocked.abs().element_sum();
    let axis_delta = if non_zero >= 2 {
        let Some(axis) = snap_to_canonical_direction(direction, false) else {
            return blocked;
        };
        let delta = to_delta(axis);
        if !is_obstacle(start + delta) {
            return delta;
        }
        delta
    } else {
        blocked
    };

    let mut slide = direction.normalize_or_zero();
    if axis_delta.x != 0 {
        slide.x = 0.0;
    } else if axis_delta.y != 0 {
        slide.y = 0.0;
    } else {
        slide.z = 0.0;
    }
    let Some(slide) = snap_to_canonical_direction(slide.normalize_or_zero(), false) else {
        return blocked;
    };
    let delta = to_delta(slide);
    if is_obstacle(start + delta) {
        blocked
    } else {
        delta
    }
}

/// World-space centre of one face of a unit voxel
pub fn face_midpoint(voxel: IVec3, face: Facing) -> Vec3 {
    let offset = match face {
        Facing::Down => Vec3::new(0.5, 0.0, 0.5),
        Facing::Up => Vec3::new(0.5, 1.0, 0.5),
        Facing::North => Vec3::new(0.5, 0.5, 0.0),
        Facing::South => Vec3::new(0.5, 0.5, 1.0),
        Facing::West => Vec3::new(0.0, 0.5, 0.5),
        Facing::East => Vec3::new(1.0, 0.5, 0.5),
    };
    voxel.as_vec3() + offset
}

/// Vector from `eye` to the midpoint of a voxel face
pub fn snap_look_to_face(voxel: IVec3, face: Facing, eye: Vec3) -> Vec3 {
    face_midpoint(voxel, face) - eye
}
