use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use universe_catalog::{
    CatalogConfig, CatalogLoader, FrameRole, LoadReport, ReferenceFrame, Selection, Universe,
    MAX_FRAME_DEPTH_LIMIT,
};
use universe_core::{format_jd, parse_epoch};

#[derive(Parser)]
#[command(name = "universe")]
#[command(about = "Solar system catalog loader")]
struct Cli {
    /// Stars catalog objects can be attached to
    #[arg(long = "star", default_values_t = vec!["Sol".to_string()], global = true)]
    stars: Vec<String>,

    /// Catalog config file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the frame nesting limit
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(..=MAX_FRAME_DEPTH_LIMIT as i64))]
    max_frame_depth: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load catalogs and list the resulting bodies
    Load {
        catalogs: Vec<PathBuf>,
    },

    /// Show the timeline phases of one object
    Timeline {
        catalogs: Vec<PathBuf>,
        /// Object path, e.g. "Sol/Earth/Moon"
        #[arg(short, long)]
        object: String,
    },

    /// Show body positions relative to their orbit frame centers
    Positions {
        catalogs: Vec<PathBuf>,
        /// Epoch (calendar date or Julian date)
        #[arg(short, long, default_value = "2000-01-01T12:00:00 TDB")]
        epoch: String,
    },

    /// Report the frame nesting depth of every body
    CheckFrames {
        catalogs: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => CatalogConfig::load(path)?,
        None => CatalogConfig::default(),
    };
    if let Some(depth) = cli.max_frame_depth {
        config.max_frame_depth = depth;
    }

    match cli.command {
        Commands::Load { catalogs } => {
            let universe = load_universe(&cli.stars, &config, &catalogs)?;
            println!("{:<32} {:<16} {:>7} {:>28} {:>28}", "Body", "Class", "Phases", "Start", "End");
            for (id, body) in universe.bodies() {
                let timeline = body.timeline();
                println!("{:<32} {:<16} {:>7} {:>28} {:>28}",
                    universe.path_of(Selection::Body(id)),
                    body.classification.name(),
                    timeline.phase_count(),
                    format_jd(timeline.start_time()),
                    format_jd(timeline.end_time()));
            }
        }

        Commands::Timeline { catalogs, object } => {
            let universe = load_universe(&cli.stars, &config, &catalogs)?;
            let id = match universe.find_path(&object) {
                Some(Selection::Body(id)) => id,
                Some(Selection::Star(_)) => anyhow::bail!("{} is a star and has no timeline", object),
                None => anyhow::bail!("Object '{}' not found", object),
            };
            let Some(body) = universe.body(id) else {
                anyhow::bail!("Object '{}' not found", object);
            };

            println!("{} ({} phases)", universe.path_of(Selection::Body(id)), body.timeline().phase_count());
            for (i, phase) in body.timeline().phases().iter().enumerate() {
                println!("Phase {}: {} .. {}", i + 1, format_jd(phase.start_time()), format_jd(phase.end_time()));
                println!("  Orbit frame:    {}", describe_frame(&universe, phase.orbit_frame()));
                println!("  Body frame:     {}", describe_frame(&universe, phase.body_frame()));
                println!("  Orbit period:   {:.6} d", phase.orbit().period());
                println!("  Bounding radius: {:.3} km", phase.orbit().bounding_radius());
                let rotation = phase.rotation_model();
                if rotation.is_periodic() {
                    println!("  Rotation:       period {:.6} d", rotation.period());
                } else {
                    println!("  Rotation:       fixed");
                }
            }
        }

        Commands::Positions { catalogs, epoch } => {
            let jd = match epoch.trim().parse::<f64>() {
                Ok(jd) => jd,
                Err(_) => parse_epoch(&epoch).with_context(|| format!("Invalid epoch: {}", epoch))?,
            };
            let universe = load_universe(&cli.stars, &config, &catalogs)?;

            println!("Epoch: {}", format_jd(jd));
            println!("{:<32} {:<24} {:>16} {:>16} {:>16} {:>16}", "Body", "Center", "X (km)", "Y (km)", "Z (km)", "Dist (km)");
            for (id, body) in universe.bodies() {
                let (Some(p), Some(frame)) = (body.position_at(jd), body.orbit_frame(jd)) else {
                    continue;
                };
                println!("{:<32} {:<24} {:>16.3} {:>16.3} {:>16.3} {:>16.3}",
                    universe.path_of(Selection::Body(id)),
                    universe.path_of(frame.center()),
                    p.x, p.y, p.z, p.norm());
            }
        }

        Commands::CheckFrames { catalogs } => {
            let universe = load_universe(&cli.stars, &config, &catalogs)?;
            let max = config.max_frame_depth;
            let mut circular = 0;

            println!("{:<32} {:>12} {:>12}", "Body", "Orbit depth", "Body depth");
            for (id, body) in universe.bodies() {
                let depth = |role: FrameRole| {
                    body.timeline()
                        .frames(role.frame_type())
                        .iter()
                        .map(|f| f.nesting_depth(&universe, max, role.frame_type()))
                        .max()
                        .unwrap_or(0)
                };
                let (orbit, rotation) = (depth(FrameRole::Orbit), depth(FrameRole::Body));
                let show = |d: u32| if d > max { "circular".to_string() } else { d.to_string() };
                if orbit > max || rotation > max {
                    circular += 1;
                }
                println!("{:<32} {:>12} {:>12}", universe.path_of(Selection::Body(id)), show(orbit), show(rotation));
            }
            if circular > 0 {
                anyhow::bail!("{} bodies have circular frames", circular);
            }
        }
    }

    Ok(())
}

fn load_universe(stars: &[String], config: &CatalogConfig, catalogs: &[PathBuf]) -> Result<Universe> {
    let mut universe = Universe::new();
    for star in stars {
        universe.add_star(star.as_str());
    }

    let mut total = LoadReport::default();
    let mut loader = CatalogLoader::new(&mut universe, config.clone());
    for path in catalogs {
        let report = loader
            .load_file(path)
            .with_context(|| format!("Failed to load catalog: {}", path.display()))?;
        total.merge(report);
    }

    info!("{} objects loaded, {} failed, {} skipped", total.loaded, total.failed, total.skipped);
    Ok(universe)
}

fn describe_frame(universe: &Universe, frame: &ReferenceFrame) -> String {
    format!("{} centered on {}", frame.kind_name(), universe.path_of(frame.center()))
}
