mod scene;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use scene::Scene;
use selection::glam::{IVec3, Vec3};
use selection::{
    select_contour_unbounded, select_fill_unbounded, select_line, select_start_traced,
    CollisionPolicy, Facing, FillMatcher, FillSettings, MemoryWorld, OriginVoxelSet, Progress,
    Propagation, SelectionBehaviour, SelectionConfig, SelectionDriver, Viewer, VoxelBox,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "voxsel")]
#[command(about = "Voxel selection over RON scene files", long_about = None)]
struct Cli {
    /// Scene to select from (RON)
    #[arg(short, long, global = true)]
    scene: Option<PathBuf>,

    /// Selection limits (TOML). Without it VOXSEL_* environment variables apply
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pick a start voxel from a viewer and extend a line along the look vector
    Line {
        /// Eye position, e.g. 0.5,65.6,0.5
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        eye: Vec3,

        /// Look direction
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        look: Vec3,

        /// How the start voxel is picked
        #[arg(long, value_enum, default_value_t = Profile::Wand)]
        profile: Profile,

        /// Ray reach in voxels
        #[arg(long, default_value_t = 8.0)]
        reach: f32,

        /// Allow diagonal line directions
        #[arg(long)]
        diagonal: bool,

        /// Keep going through solid voxels
        #[arg(long)]
        through: bool,

        /// Write the selection to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Select a contour in the plane perpendicular to a normal
    Contour {
        #[arg(long, value_parser = parse_ivec3, allow_hyphen_values = true)]
        seed: IVec3,

        #[arg(long, value_enum, default_value_t = Face::Up)]
        normal: Face,

        #[arg(long, value_enum, default_value_t = MatcherKind::Surface)]
        matcher: MatcherKind,

        #[arg(long)]
        diagonal: bool,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Flood fill from a seed voxel
    Fill {
        #[arg(long, value_parser = parse_ivec3, allow_hyphen_values = true)]
        seed: IVec3,

        #[arg(long, value_enum, default_value_t = MatcherKind::Start)]
        matcher: MatcherKind,

        #[arg(long)]
        diagonal: bool,

        /// Let the region extend below the seed
        #[arg(long)]
        explicit_lower_bound: bool,

        /// Run the capped direct search instead of the time-sliced driver
        #[arg(long)]
        direct: bool,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Select every matching voxel between two corners
    Box {
        #[arg(long, value_parser = parse_ivec3, allow_hyphen_values = true)]
        from: IVec3,

        #[arg(long, value_parser = parse_ivec3, allow_hyphen_values = true)]
        to: IVec3,

        #[arg(long, value_enum, default_value_t = MatcherKind::NonEmpty)]
        matcher: MatcherKind,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Decode a selection file and summarise it
    Inspect {
        file: PathBuf,

        /// Also print every selected voxel
        #[arg(long)]
        list: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Profile {
    Wand,
    Orb,
    SceptreAdd,
    SceptreReplace,
    Boundary,
}

impl From<Profile> for SelectionBehaviour {
    fn from(profile: Profile) -> Self {
        match profile {
            Profile::Wand => SelectionBehaviour::WAND,
            Profile::Orb => SelectionBehaviour::ORB,
            Profile::SceptreAdd => SelectionBehaviour::SCEPTRE_ADD,
            Profile::SceptreReplace => SelectionBehaviour::SCEPTRE_REPLACE,
            Profile::Boundary => SelectionBehaviour::BOUNDARY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Face {
    Down,
    Up,
    North,
    South,
    West,
    East,
}

impl From<Face> for Facing {
    fn from(face: Face) -> Self {
        match face {
            Face::Down => Facing::Down,
            Face::Up => Facing::Up,
            Face::North => Facing::North,
            Face::South => Facing::South,
            Face::West => Facing::West,
            Face::East => Facing::East,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum MatcherKind {
    /// Anything but air
    NonEmpty,
    /// Solids and fluids
    Solid,
    /// Same occupant as the seed
    Start,
    /// Open voxels resting on a surface
    Surface,
}

impl MatcherKind {
    /// Matcher for a search seeded at `seed`; `normal` points away from the surface
    fn build(self, world: &MemoryWorld, seed: IVec3, normal: Facing) -> FillMatcher {
        match self {
            MatcherKind::NonEmpty => FillMatcher::AnyNonEmpty,
            MatcherKind::Solid => FillMatcher::AnySolid,
            MatcherKind::Start => FillMatcher::starting_occupant(world, seed),
            MatcherKind::Surface => FillMatcher::ContourFollower {
                normal: normal.opposite(),
            },
        }
    }
}

fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [x, y, z] => {
            let parse = |p: &str| p.parse::<f32>().map_err(|_| format!("not a number: {p:?}"));
            Ok(Vec3::new(parse(x)?, parse(y)?, parse(z)?))
        }
        _ => Err(format!("expected x,y,z numbers, got {s:?}")),
    }
}

fn parse_ivec3(s: &str) -> Result<IVec3, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [x, y, z] => {
            let parse = |p: &str| p.parse::<i32>().map_err(|_| format!("not an integer: {p:?}"));
            Ok(IVec3::new(parse(x)?, parse(y)?, parse(z)?))
        }
        _ => Err(format!("expected x,y,z integers, got {s:?}")),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Inspect { file, list } => inspect(&file, list),
        Commands::Line {
            eye,
            look,
            profile,
            reach,
            diagonal,
            through,
            output,
        } => {
            let world = load_world(cli.scene.as_deref())?;
            let viewer = Viewer::at_eye(eye, look);
            let Some(start) = select_start_traced(&world, profile.into(), &viewer, reach) else {
                println!("Nothing to select");
                return Ok(());
            };
            info!(voxel = %start.voxel, face = ?start.face, "start voxel picked");
            let policy = if through {
                CollisionPolicy::ContinueThroughSolid
            } else {
                CollisionPolicy::StopAtSolid
            };
            let line = select_line(
                &world,
                start.voxel,
                start.direction,
                config.max_line_length,
                diagonal,
                policy,
            );
            print_positions("Line", &line);
            write_positions(output.as_deref(), &line)
        }
        Commands::Contour {
            seed,
            normal,
            matcher,
            diagonal,
            output,
        } => {
            let world = load_world(cli.scene.as_deref())?;
            let normal = Facing::from(normal);
            let matcher = matcher.build(&world, seed, normal);
            let outcome =
                select_contour_unbounded(&world, seed, config.max_contour_count, diagonal, &matcher, normal);
            report_unavailable(outcome.unavailable.len());
            print_positions("Contour", &outcome.selected);
            write_positions(output.as_deref(), &outcome.selected)
        }
        Commands::Fill {
            seed,
            matcher,
            diagonal,
            explicit_lower_bound,
            direct,
            output,
        } => {
            let world = load_world(cli.scene.as_deref())?;
            let matcher = matcher.build(&world, seed, Facing::Up);
            if direct {
                let outcome = select_fill_unbounded(&world, seed, config.max_fill_count, diagonal, &matcher);
                report_unavailable(outcome.unavailable.len());
                print_positions("Fill", &outcome.selected);
                return write_positions(output.as_deref(), &outcome.selected);
            }

            let mut settings = FillSettings::new(Propagation::FloodFill, seed, matcher);
            settings.set_diagonal(diagonal);
            settings.set_automatic_lower_bound(!explicit_lower_bound);
            let mut driver = SelectionDriver::new();
            driver.start_unbound_fill(&settings, config.border_allowance)?;
            finish_driver(driver, &world, config.time_budget(), output.as_deref())
        }
        Commands::Box {
            from,
            to,
            matcher,
            output,
        } => {
            let world = load_world(cli.scene.as_deref())?;
            let matcher = matcher.build(&world, from, Facing::Up);
            let mut driver = SelectionDriver::new();
            driver.start_box(from, to, matcher)?;
            finish_driver(driver, &world, config.time_budget(), output.as_deref())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<SelectionConfig> {
    let config = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            SelectionConfig::from_toml_str(&text)
                .with_context(|| format!("in config {}", path.display()))?
        }
        None => SelectionConfig::from_env()?,
    };
    Ok(config)
}

fn load_world(scene: Option<&Path>) -> Result<MemoryWorld> {
    let Some(path) = scene else {
        bail!("this command needs a --scene");
    };
    let world = Scene::load(path)?.build_world();
    info!(voxels = world.len(), scene = %path.display(), "scene loaded");
    Ok(world)
}

/// Resume the driver one budget at a time until it completes
fn finish_driver(
    mut driver: SelectionDriver,
    world: &MemoryWorld,
    budget: Duration,
    output: Option<&Path>,
) -> Result<()> {
    let mut slices = 0u32;
    loop {
        slices += 1;
        match driver.resume(world, budget)? {
            Progress::Complete => break,
            Progress::InProgress(fraction) => debug!(slices, fraction, "selection in progress"),
        }
    }
    info!(slices, "selection finished");

    let result = driver.into_result();
    report_unavailable(result.unavailable.count());
    print_set("Selection", &result.selection);
    if let Some(path) = output {
        write_file(path, &result.selection.to_bytes())?;
    }
    Ok(())
}

fn report_unavailable(count: usize) {
    if count > 0 {
        warn!(count, "some voxels lie in chunks that are not loaded");
    }
}

fn print_positions(label: &str, positions: &[IVec3]) {
    println!("{label}: {} voxels", positions.len());
    for pos in positions {
        println!("  {} {} {}", pos.x, pos.y, pos.z);
    }
}

fn print_set(label: &str, set: &OriginVoxelSet) {
    let bounds = set.bounds();
    println!(
        "{label}: {} voxels, origin {} {} {}, size {}x{}x{}",
        set.count(),
        bounds.min.x,
        bounds.min.y,
        bounds.min.z,
        set.size().x,
        set.size().y,
        set.size().z,
    );
    if let Some(occupied) = set.occupied_bounds() {
        println!("  occupied {} .. {}", occupied.min, occupied.max);
    }
}

/// Pack positions into the smallest set that holds them all
fn positions_to_set(positions: &[IVec3]) -> Result<OriginVoxelSet> {
    let Some(&first) = positions.first() else {
        bail!("nothing was selected");
    };
    let region = positions.iter().fold(
        VoxelBox {
            min: first,
            max: first,
        },
        |b, p| VoxelBox {
            min: b.min.min(*p),
            max: b.max.max(*p),
        },
    );
    let mut set = OriginVoxelSet::covering(region).context("selection too large to encode")?;
    for &pos in positions {
        set.set(pos);
    }
    Ok(set)
}

fn write_positions(output: Option<&Path>, positions: &[IVec3]) -> Result<()> {
    let Some(path) = output else {
        return Ok(());
    };
    let set = positions_to_set(positions)?;
    write_file(path, &set.to_bytes())
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    info!(bytes = bytes.len(), path = %path.display(), "selection written");
    Ok(())
}

fn inspect(file: &Path, list: bool) -> Result<()> {
    let bytes = fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    let set = OriginVoxelSet::from_bytes(&bytes)
        .with_context(|| format!("{} is not a selection file", file.display()))?;
    print_set("Selection", &set);
    if list {
        for pos in set.iter() {
            println!("  {} {} {}", pos.x, pos.y, pos.z);
        }
    }
    Ok(())
}
