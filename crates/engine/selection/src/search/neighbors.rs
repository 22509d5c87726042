//! Neighbour offset tables for the breadth searches

use crate::facing::Facing;
use glam::IVec3;

const fn v(x: i32, y: i32, z: i32) -> IVec3 {
    IVec3::new(x, y, z)
}

/// 6 face neighbours, then 12 edge and 8 corner diagonals
const FLOOD_DIRECTIONS: [IVec3; 26] = [
    v(0, -1, 0),
    v(0, 1, 0),
    v(0, 0, -1),
    v(0, 0, 1),
    v(-1, 0, 0),
    v(1, 0, 0),
    // top edges
    v(1, 1, 0),
    v(0, 1, -1),
    v(-1, 1, 0),
    v(0, 1, 1),
    // middle edges
    v(1, 0, 1),
    v(1, 0, -1),
    v(-1, 0, -1),
    v(-1, 0, 1),
    // bottom edges
    v(1, -1, 0),
    v(0, -1, -1),
    v(-1, -1, 0),
    v(0, -1, 1),
    // top corners
    v(1, 1, 1),
    v(1, 1, -1),
    v(-1, 1, -1),
    v(-1, 1, 1),
    // bottom corners
    v(1, -1, 1),
    v(1, -1, -1),
    v(-1, -1, -1),
    v(-1, -1, 1),
];

const FACE_NEIGHBOURS: usize = 6;

/// 8 in-plane directions per plane; even indices are cardinal, odd diagonal
const CONTOUR_DIRECTIONS: [[IVec3; 8]; 3] = [
    // XZ
    [
        v(0, 0, 1),
        v(-1, 0, 1),
        v(-1, 0, 0),
        v(-1, 0, -1),
        v(0, 0, -1),
        v(1, 0, -1),
        v(1, 0, 0),
        v(1, 0, 1),
    ],
    // XY
    [
        v(0, 1, 0),
        v(-1, 1, 0),
        v(-1, 0, 0),
        v(-1, -1, 0),
        v(0, -1, 0),
        v(1, -1, 0),
        v(1, 0, 0),
        v(1, 1, 0),
    ],
    // YZ
    [
        v(0, 1, 0),
        v(0, 1, -1),
        v(0, 0, -1),
        v(0, -1, -1),
        v(0, -1, 0),
        v(0, -1, 1),
        v(0, 0, 1),
        v(0, 1, 1),
    ],
];

/// World-aligned plane a contour is confined to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchPlane {
    XZ = 0,
    XY = 1,
    YZ = 2,
}

impl SearchPlane {
    /// Plane perpendicular to a face normal
    pub fn from_normal(normal: Facing) -> Self {
        match normal {
            Facing::Down | Facing::Up => SearchPlane::XZ,
            Facing::West | Facing::East => SearchPlane::XY,
            Facing::North | Facing::South => SearchPlane::YZ,
        }
    }

    /// Axis index (0 = X, 1 = Y, 2 = Z) that stays fixed within the plane
    pub fn fixed_axis(self) -> usize {
        match self {
            SearchPlane::XZ => 1,
            SearchPlane::XY => 2,
            SearchPlane::YZ => 0,
        }
    }
}

/// The offsets a breadth search tries from each position, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborTable {
    offsets: &'static [IVec3],
    stride: usize,
}

impl NeighborTable {
    /// 3D table: 6 face neighbours, or all 26 with `diagonal`
    pub fn flood(diagonal: bool) -> Self {
        let count = if diagonal { FLOOD_DIRECTIONS.len() } else { FACE_NEIGHBOURS };
        Self {
            offsets: &FLOOD_DIRECTIONS[..count],
            stride: 1,
        }
    }

    /// In-plane table; without `diagonal` only every second entry is used
    pub fn contour(plane: SearchPlane, diagonal: bool) -> Self {
        Self {
            offsets: &CONTOUR_DIRECTIONS[plane as usize],
            stride: if diagonal { 1 } else { 2 },
        }
    }

    /// Offset at a direction index, `None` once the table is exhausted
    #[inline]
    pub fn offset(&self, index: usize) -> Option<IVec3> {
        self.offsets.get(index).copied()
    }

    /// Index following `index`
    #[inline]
    pub fn next_index(&self, index: usize) -> usize {
        index + self.stride
    }

    /// Offsets actually visited, in order
    pub fn iter(&self) -> impl Iterator<Item = IVec3> + '_ {
        self.offsets.iter().copied().step_by(self.stride)
    }

    pub fn len(&self) -> usize {
        self.offsets.len().div_ceil(self.stride)
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_flood_tables_are_distinct_neighbours() {
        let all: HashSet<IVec3> = NeighborTable::flood(true).iter().collect();
        assert_eq!(all.len(), 26);
        assert!(all.iter().all(|d| *d != IVec3::ZERO && d.abs().max_element() == 1));

        let faces: Vec<IVec3> = NeighborTable::flood(false).iter().collect();
        assert_eq!(faces.len(), 6);
        assert!(faces.iter().all(|d| d.abs().element_sum() == 1));
    }

    #[test]
    fn test_contour_tables_stay_in_plane() {
        for normal in Facing::ALL {
            let plane = SearchPlane::from_normal(normal);
            let table = NeighborTable::contour(plane, true);
            assert_eq!(table.len(), 8);
            for d in table.iter() {
                assert_eq!(d[plane.fixed_axis()], 0);
                assert_eq!(d.dot(normal.offset()), 0);
            }
            let cardinal = NeighborTable::contour(plane, false);
            assert_eq!(cardinal.len(), 4);
            assert!(cardinal.iter().all(|d| d.abs().element_sum() == 1));
        }
    }

    #[test]
    fn test_stride() {
        let table = NeighborTable::contour(SearchPlane::XZ, false);
        assert_eq!(table.next_index(0), 2);
        assert_eq!(table.offset(6), Some(IVec3::X));
        assert_eq!(table.offset(8), None);
    }
}
