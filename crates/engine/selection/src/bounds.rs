// Inclusive integer boxes in world space

use glam::{I64Vec3, IVec3};

/// Axis-aligned box of voxels with inclusive `min` and `max` corners
///
/// Both corners are part of the box, so a box with `min == max` holds
/// exactly one voxel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoxelBox {
    /// Smallest corner (inclusive)
    pub min: IVec3,
    /// Largest corner (inclusive)
    pub max: IVec3,
}

impl VoxelBox {
    /// Box spanning everything, used by the unbounded searches
    pub const UNBOUNDED: VoxelBox = VoxelBox {
        min: IVec3::MIN,
        max: IVec3::MAX,
    };

    /// Create a box from two opposite corners in any order
    pub fn from_corners(a: IVec3, b: IVec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Number of voxels along each axis, without overflow
    pub fn extent(&self) -> I64Vec3 {
        self.max.as_i64vec3() - self.min.as_i64vec3() + I64Vec3::ONE
    }

    /// Number of voxels along each axis
    ///
    /// Saturates at `i32::MAX` for boxes wider than that, so the unbounded
    /// box reports `i32::MAX` on every axis.
    pub fn size(&self) -> IVec3 {
        self.extent()
            .clamp(I64Vec3::ZERO, I64Vec3::splat(i32::MAX as i64))
            .as_ivec3()
    }

    /// Total number of voxels in the box, saturating at `u64::MAX`
    pub fn volume(&self) -> u64 {
        let e = self.extent().max(I64Vec3::ZERO);
        (e.x as u64).saturating_mul(e.y as u64).saturating_mul(e.z as u64)
    }

    /// Check whether the box contains a voxel
    #[inline]
    pub fn contains(&self, pos: IVec3) -> bool {
        pos.cmpge(self.min).all() && pos.cmple(self.max).all()
    }

    /// Overlap of two boxes, or `None` when they are disjoint
    pub fn intersection(&self, other: &VoxelBox) -> Option<VoxelBox> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        if min.cmple(max).all() {
            Some(VoxelBox { min, max })
        } else {
            None
        }
    }

    /// Copy of this box with the Y range clamped to `[min_y, max_y]`
    pub fn clamp_y(&self, min_y: i32, max_y: i32) -> VoxelBox {
        VoxelBox {
            min: IVec3::new(self.min.x, self.min.y.max(min_y), self.min.z),
            max: IVec3::new(self.max.x, self.max.y.min(max_y), self.max.z),
        }
    }
}
