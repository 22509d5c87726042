use glam::{IVec3, Vec3};

/// One of the six faces of a voxel, in wire-index order
///
/// The discriminant is the face index used by the binary formats:
/// `Down=0, Up=1, North=2 (-Z), South=3 (+Z), West=4 (-X), East=5 (+X)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facing {
    Down = 0,
    Up = 1,
    North = 2,
    South = 3,
    West = 4,
    East = 5,
}

impl Facing {
    /// All six faces in index order
    pub const ALL: [Facing; 6] = [
        Facing::Down,
        Facing::Up,
        Facing::North,
        Facing::South,
        Facing::West,
        Facing::East,
    ];

    /// Wire index of this face
    #[inline]
    pub fn index(self) -> i32 {
        self as i32
    }

    /// Face for a wire index, or `None` outside `0..6`
    pub fn from_index(index: i32) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// Unit step from a voxel through this face
    #[inline]
    pub fn offset(self) -> IVec3 {
        match self {
            Facing::Down => IVec3::NEG_Y,
            Facing::Up => IVec3::Y,
            Facing::North => IVec3::NEG_Z,
            Facing::South => IVec3::Z,
            Facing::West => IVec3::NEG_X,
            Facing::East => IVec3::X,
        }
    }

    /// Outward normal as a float vector
    pub fn as_vec3(self) -> Vec3 {
        self.offset().as_vec3()
    }

    /// Get the opposite face
    pub fn opposite(self) -> Self {
        match self {
            Facing::Down => Facing::Up,
            Facing::Up => Facing::Down,
            Facing::North => Facing::South,
            Facing::South => Facing::North,
            Facing::West => Facing::East,
            Facing::East => Facing::West,
        }
    }

    /// Try to create from a Vec3 (must be dominated by one axis)
    pub fn from_vec3(v: Vec3) -> Option<Self> {
        let abs = v.abs();
        if abs.x > abs.y && abs.x > abs.z {
            return Some(if v.x > 0.0 { Facing::East } else { Facing::West });
        }
        if abs.y > abs.x && abs.y > abs.z {
            return Some(if v.y > 0.0 { Facing::Up } else { Facing::Down });
        }
        if abs.z > abs.x && abs.z > abs.y {
            return Some(if v.z > 0.0 { Facing::South } else { Facing::North });
        }
        None
    }
}
