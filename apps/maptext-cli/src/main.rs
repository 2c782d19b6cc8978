use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use maptext_map::Scene;
use maptext_render::{TextRenderer, visibility};
use maptext_render_canvas::{CanvasRenderer, DrawCommand, RecordingSurface};
use maptext_render_svg::SvgRenderer;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "maptext-cli", about = "CLI tool for maptext scenes")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Backend {
    Svg,
    Canvas,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Render a scene file (YAML or JSON)
    Render {
        scene: PathBuf,
        /// Drawing backend
        #[arg(short, long, value_enum, default_value = "svg")]
        backend: Backend,
        /// Write output here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print each label's projected box and visibility
    Inspect {
        scene: PathBuf,
        #[arg(short, long, value_enum, default_value = "svg")]
        backend: Backend,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info => {
            println!("maptext-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", maptext_common::crate_info());
            println!("overlay: {}", maptext_overlay::crate_info());
            println!("render: {}", maptext_render::crate_info());
            println!("render-canvas: {}", maptext_render_canvas::crate_info());
            println!("render-svg: {}", maptext_render_svg::crate_info());
            println!("map: {}", maptext_map::crate_info());
        }
        Commands::Render {
            scene,
            backend,
            output,
        } => {
            let scene = load(&scene)?;
            let rendered = match backend {
                Backend::Svg => {
                    let map = scene.build_map(SvgRenderer::new(scene.renderer.clone()))?;
                    map.renderer().to_svg_string()
                }
                Backend::Canvas => serde_json::to_string_pretty(&canvas_pass(&scene)?)?,
            };
            match output {
                Some(path) => std::fs::write(&path, rendered)
                    .with_context(|| format!("writing {}", path.display()))?,
                None => println!("{rendered}"),
            }
        }
        Commands::Inspect { scene, backend } => {
            let scene = load(&scene)?;
            match backend {
                Backend::Svg => inspect(&scene, SvgRenderer::new(scene.renderer.clone()))?,
                Backend::Canvas => inspect(
                    &scene,
                    CanvasRenderer::new(RecordingSurface::new(), scene.renderer.clone()),
                )?,
            }
        }
    }

    Ok(())
}

fn load(path: &Path) -> anyhow::Result<Scene> {
    Scene::load(path).with_context(|| format!("loading scene {}", path.display()))
}

/// Draw the scene on a canvas and return the commands of one final pass.
fn canvas_pass(scene: &Scene) -> anyhow::Result<Vec<DrawCommand>> {
    let renderer = CanvasRenderer::new(RecordingSurface::new(), scene.renderer.clone());
    let mut map = scene.build_map(renderer)?;
    // drop the refresh passes run after each add
    map.renderer_mut().surface_mut().take_commands();
    let stats = map.redraw();
    tracing::info!(visible = stats.visible, hidden = stats.hidden, "canvas drawn");
    Ok(map.renderer_mut().surface_mut().take_commands())
}

fn inspect<R: TextRenderer>(scene: &Scene, renderer: R) -> anyhow::Result<()> {
    let map = scene.build_map(renderer)?;
    println!(
        "view: center={} zoom={} visible={}",
        map.view().center(),
        map.view().zoom(),
        map.renderer().visible_bounds()
    );
    for overlay in map.overlays() {
        let vis = visibility(overlay, map.renderer());
        match overlay.bounds() {
            Some(b) => println!("{} {:?}: {b} {vis:?}", overlay.id(), overlay.text()),
            None => println!("{} {:?}: unprojected", overlay.id(), overlay.text()),
        }
    }
    Ok(())
}
