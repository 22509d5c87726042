mod bounds;
mod config;
mod facing;
mod geometry;
mod line;
mod matcher;
mod ray;
mod settings;
mod world;

pub mod driver;
pub mod io;
pub mod search;
pub mod set;

pub use bounds::VoxelBox;
pub use config::{ConfigError, SelectionConfig};
pub use driver::{
    unbound_fill_region, DriverError, DriverState, Progress, SelectionDriver, SelectionResult,
};
pub use facing::Facing;
pub use geometry::{deflect, face_midpoint, snap_look_to_face, snap_to_canonical_direction, to_delta};
pub use io::CodecError;
pub use line::{is_obstacle, select_line, CollisionPolicy};
pub use matcher::{FillMatcher, MatchResult};
pub use ray::{
    select_start, select_start_traced, trace_voxel_ray, RayTarget, SelectionBehaviour,
    StartSelection, Viewer,
};
pub use search::{
    select_contour_bounded, select_contour_unbounded, select_fill_bounded, select_fill_unbounded,
    SearchOutcome, SearchPlane,
};
pub use set::{DenseVoxelSet, OriginVoxelSet, VoxelSetError, MAX_DIMENSION};
pub use settings::{FillSettings, Propagation};
pub use world::{
    classify, ChunkPos, ChunkView, MemoryWorld, Occupant, OccupantKind, VoxelWorld, CHUNK_SIZE,
    WORLD_MAX_Y, WORLD_MIN_Y,
};

// Re-export glam for convenience
pub use glam;
