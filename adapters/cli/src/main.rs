#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Gridforge factory builder.

mod config;
mod scene;
mod session;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use gridforge_catalog::{
    decode_share_code, encode_share_code, load_blueprint, load_blueprints, load_catalog,
    save_blueprint, slug, BLUEPRINTS_DIR,
};
use gridforge_core::{Blueprint, Placeable, PlayMode};
use gridforge_rendering::{
    Color, HudLayout, Presentation, RenderingBackend, Scene, WindowSize, BACKGROUND,
};
use gridforge_rendering_macroquad::MacroquadBackend;
use gridforge_system_camera::Viewport;
use gridforge_system_controller::GridController;
use gridforge_world::{query, World};
use tracing_subscriber::EnvFilter;

use crate::{config::AppConfig, session::Session};

#[derive(Debug, Parser)]
#[command(name = "gridforge")]
#[command(about = "Tile-grid factory builder with reusable blueprints")]
#[command(version)]
struct Cli {
    /// Directory holding components.json, buildings.json and blueprints/
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Synchronise presentation with the display refresh rate
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    vsync: bool,

    /// Print the frame rate once per second
    #[arg(long)]
    show_fps: bool,

    /// Log filter directive, overriding RUST_LOG
    #[arg(long)]
    log_filter: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the share code of a saved blueprint
    Share {
        /// Blueprint file, or the name of a blueprint in the data directory
        blueprint: String,
    },
    /// Save a blueprint received as a share code
    Import {
        /// Share code starting with `blueprint:v1:`
        code: String,
    },
}

/// Entry point for the Gridforge command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_filter.as_deref());

    match &cli.command {
        None => run(&cli),
        Some(Commands::Share { blueprint }) => share(&cli.data_dir, blueprint),
        Some(Commands::Import { code }) => import(&cli.data_dir, code),
    }
}

fn init_tracing(directive: Option<&str>) {
    let filter = directive
        .map(EnvFilter::new)
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?,
        None => AppConfig::default(),
    };

    let catalog = Arc::new(
        load_catalog(&cli.data_dir)
            .with_context(|| format!("failed to load catalog from {}", cli.data_dir.display()))?,
    );
    let blueprint_dir = cli.data_dir.join(BLUEPRINTS_DIR);
    let world_palette: Vec<Placeable> = load_blueprints(&blueprint_dir, &catalog)
        .into_iter()
        .map(Placeable::Blueprint)
        .collect();
    let build_palette: Vec<Placeable> = catalog
        .components()
        .cloned()
        .map(Placeable::Component)
        .collect();

    let window_size = WindowSize::new(config.window.width, config.window.height)
        .context("invalid window size")?;
    let hud = HudLayout::for_debug_lines(scene::DEBUG_LINE_COUNT);
    let viewport = Viewport::new(window_size.width() as f32, window_size.height() as f32)
        .with_offsets(hud.top_height(), hud.bottom_height());
    let controller = GridController::new(
        config.camera.clone(),
        config.grid,
        viewport,
        world_palette,
        build_palette,
    );

    let world = World::new(&config.world_config(), Arc::clone(&catalog));
    tracing::info!(
        columns = config.grid.columns,
        rows = config.grid.rows,
        "{}",
        query::welcome_banner(&world)
    );

    let mut session = Session::new(world, controller, hud, blueprint_dir);
    let presentation = Presentation::new(
        config.window.title.clone(),
        window_size,
        Color::from(BACKGROUND),
        Scene::new(PlayMode::World, hud),
    );

    MacroquadBackend::new()
        .with_vsync(cli.vsync)
        .with_show_fps(cli.show_fps)
        .run(presentation, move |dt, input, scene| {
            session.frame(dt, input, scene);
        })
}

/// Resolves `target` as a file path first, then as a saved blueprint name.
fn find_blueprint(data_dir: &Path, target: &str) -> Result<Blueprint> {
    let path = Path::new(target);
    if path.is_file() {
        return load_blueprint(path).map_err(Into::into);
    }

    let catalog = load_catalog(data_dir).unwrap_or_default();
    let wanted = slug(target);
    load_blueprints(&data_dir.join(BLUEPRINTS_DIR), &catalog)
        .into_iter()
        .find(|blueprint| blueprint.name() == target || slug(blueprint.name()) == wanted)
        .with_context(|| format!("no blueprint named '{target}' in {}", data_dir.display()))
}

fn share(data_dir: &Path, target: &str) -> Result<()> {
    let blueprint = find_blueprint(data_dir, target)?;
    let code = encode_share_code(&blueprint)
        .with_context(|| format!("failed to encode blueprint '{}'", blueprint.name()))?;
    println!("{code}");
    Ok(())
}

fn import(data_dir: &Path, code: &str) -> Result<()> {
    let blueprint = decode_share_code(code).context("failed to decode share code")?;
    if blueprint.name().trim().is_empty() {
        bail!("shared blueprint has no name");
    }
    let path = save_blueprint(&data_dir.join(BLUEPRINTS_DIR), &blueprint)?;
    println!("{}", path.display());
    Ok(())
}
