//! Scene files: a RON description of a small world
//!
//! ```ron
//! (
//!     boxes: [
//!         (min: (0, 60, 0), max: (31, 63, 31), material: (id: 1, kind: Solid)),
//!     ],
//!     voxels: [
//!         (pos: (3, 64, 7), material: (id: 9, variant: 2, kind: Fluid)),
//!     ],
//!     unresident: [(1, 0)],
//! )
//! ```
//!
//! Boxes are applied first, in order, then single voxels; later entries
//! overwrite earlier ones. `Empty` carves holes.

use anyhow::{Context, Result};
use selection::glam::IVec3;
use selection::{ChunkPos, MemoryWorld, Occupant, OccupantKind, VoxelBox, WORLD_MAX_Y, WORLD_MIN_Y};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Kind {
    Empty,
    Fluid,
    Passable,
    Solid,
}

impl From<Kind> for OccupantKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Empty => OccupantKind::Empty,
            Kind::Fluid => OccupantKind::Fluid,
            Kind::Passable => OccupantKind::Passable,
            Kind::Solid => OccupantKind::Solid,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Material {
    pub id: i32,
    #[serde(default)]
    pub variant: i32,
    pub kind: Kind,
}

impl Material {
    fn occupant(&self) -> Occupant {
        match self.kind {
            Kind::Empty => Occupant::EMPTY,
            kind => Occupant::new(self.id, self.variant, kind.into()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoxEntry {
    pub min: (i32, i32, i32),
    pub max: (i32, i32, i32),
    pub material: Material,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoxelEntry {
    pub pos: (i32, i32, i32),
    pub material: Material,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Scene {
    pub boxes: Vec<BoxEntry>,
    pub voxels: Vec<VoxelEntry>,
    /// Chunk columns (x, z) to treat as not loaded
    pub unresident: Vec<(i32, i32)>,
}

fn ivec3((x, y, z): (i32, i32, i32)) -> IVec3 {
    IVec3::new(x, y, z)
}

impl Scene {
    pub fn from_ron_str(text: &str) -> Result<Self> {
        ron::from_str(text).context("failed to parse scene")
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read scene {}", path.display()))?;
        Self::from_ron_str(&text).with_context(|| format!("in scene {}", path.display()))
    }

    /// Build the in-memory world this scene describes
    pub fn build_world(&self) -> MemoryWorld {
        let mut world = MemoryWorld::new();
        let valid_y = WORLD_MIN_Y..=WORLD_MAX_Y;
        for entry in &self.boxes {
            let region = VoxelBox::from_corners(ivec3(entry.min), ivec3(entry.max));
            let clamped = region.clamp_y(WORLD_MIN_Y, WORLD_MAX_Y);
            if clamped.min.y > clamped.max.y {
                warn!(min = %region.min, max = %region.max, "scene box outside the world, ignored");
                continue;
            }
            world.fill_box(clamped, entry.material.occupant());
        }
        for entry in &self.voxels {
            let pos = ivec3(entry.pos);
            if !valid_y.contains(&pos.y) {
                warn!(%pos, "scene voxel outside the world, ignored");
                continue;
            }
            world.set(pos, entry.material.occupant());
        }
        for &(x, z) in &self.unresident {
            world.set_chunk_resident(ChunkPos::new(x, z), false);
        }
        debug!(voxels = world.len(), unresident = self.unresident.len(), "scene built");
        world
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use selection::VoxelWorld;
    use std::io::Write;

    const SCENE: &str = r#"
(
    boxes: [
        (min: (0, 60, 0), max: (3, 61, 3), material: (id: 1, kind: Solid)),
        (min: (1, 61, 1), max: (1, 61, 1), material: (id: 0, kind: Empty)),
        (min: (0, 300, 0), max: (1, 301, 1), material: (id: 1, kind: Solid)),
    ],
    voxels: [
        (pos: (2, 62, 2), material: (id: 9, variant: 3, kind: Fluid)),
        (pos: (0, -4, 0), material: (id: 1, kind: Solid)),
    ],
    unresident: [(1, 0)],
)
"#;

    #[test]
    fn test_build_world() {
        let world = Scene::from_ron_str(SCENE).unwrap().build_world();
        assert_eq!(world.len(), 4 * 2 * 4 - 1 + 1);
        assert_eq!(world.occupant(IVec3::new(0, 60, 0)), Occupant::solid(1));
        assert!(world.occupant(IVec3::new(1, 61, 1)).is_empty());
        assert_eq!(world.occupant(IVec3::new(2, 62, 2)), Occupant::fluid(9, 3));
        assert!(!world.is_chunk_resident(ChunkPos::new(1, 0)));
        assert!(world.is_chunk_resident(ChunkPos::new(0, 0)));
    }

    #[test]
    fn test_missing_sections_default() {
        let scene = Scene::from_ron_str("(voxels: [(pos: (0, 1, 0), material: (id: 2, kind: Passable))])").unwrap();
        assert!(scene.boxes.is_empty());
        assert_eq!(scene.build_world().occupant(IVec3::new(0, 1, 0)), Occupant::passable(2));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SCENE.as_bytes()).unwrap();
        let scene = Scene::load(file.path()).unwrap();
        assert_eq!(scene.boxes.len(), 3);
        assert_eq!(scene.unresident, vec![(1, 0)]);
    }

    #[test]
    fn test_bad_scene() {
        assert!(Scene::from_ron_str("(boxes: [(min: (0, 0))])").is_err());
        assert!(Scene::load("/nonexistent/scene.ron").is_err());
    }
}
